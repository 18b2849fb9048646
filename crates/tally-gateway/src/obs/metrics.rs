//! Minimal metrics registry for the gateway.
//!
//! Counter and histogram types with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic
//! ordering. Histogram buckets are fixed in microseconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (microsecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_str(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

#[derive(Default)]
pub struct TallyMetrics {
    pub http_requests: CounterVec,
    pub store_ops: CounterVec,
    pub store_op_duration: HistogramVec, // In Microseconds
    draining: AtomicBool,
}

impl TallyMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.http_requests.render("tally_http_requests_total", &mut out);
        self.store_ops.render("tally_store_ops_total", &mut out);
        self.store_op_duration
            .render("tally_store_op_duration_micros", &mut out);
        let _ = writeln!(
            out,
            "# TYPE tally_draining gauge\ntally_draining {}",
            u8::from(self.is_draining())
        );
        out
    }
}
