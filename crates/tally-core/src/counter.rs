//! The fixed counter set and the snapshot returned to clients.
//!
//! Counters are named page sections. The set is closed: `Counter::ALL` is the
//! only source of store keys that `read_all` touches, and `Snapshot` always
//! carries exactly these five fields in this order.

use std::str::FromStr;

use serde::Serialize;

use crate::error::TallyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Header,
    Left,
    Article,
    Right,
    Footer,
}

impl Counter {
    /// Every counter, in snapshot order.
    pub const ALL: [Counter; 5] = [
        Counter::Header,
        Counter::Left,
        Counter::Article,
        Counter::Right,
        Counter::Footer,
    ];

    /// Store key for this counter.
    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Header => "header",
            Counter::Left => "left",
            Counter::Article => "article",
            Counter::Right => "right",
            Counter::Footer => "footer",
        }
    }

    /// Store keys for every counter, in snapshot order.
    pub fn keys() -> [&'static str; 5] {
        Self::ALL.map(Counter::as_str)
    }
}

impl FromStr for Counter {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Counter::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TallyError::BadRequest(format!("unknown counter: {s}")))
    }
}

/// Values of all fixed counters at one point in time.
///
/// Serializes as `{"header":..,"left":..,"article":..,"right":..,"footer":..}`.
/// The five reads behind a snapshot are one batch, not a transaction: a
/// concurrent increment may land between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub header: i64,
    pub left: i64,
    pub article: i64,
    pub right: i64,
    pub footer: i64,
}

impl Snapshot {
    /// Build from values positioned like `Counter::ALL`. Missing or absent
    /// entries read as `0`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        let mut snap = Snapshot::default();
        for (counter, value) in Counter::ALL.into_iter().zip(values) {
            snap.set(counter, value.unwrap_or(0));
        }
        snap
    }

    pub fn get(&self, counter: Counter) -> i64 {
        match counter {
            Counter::Header => self.header,
            Counter::Left => self.left,
            Counter::Article => self.article,
            Counter::Right => self.right,
            Counter::Footer => self.footer,
        }
    }

    pub fn set(&mut self, counter: Counter, value: i64) {
        let slot = match counter {
            Counter::Header => &mut self.header,
            Counter::Left => &mut self.left,
            Counter::Article => &mut self.article,
            Counter::Right => &mut self.right,
            Counter::Footer => &mut self.footer,
        };
        *slot = value;
    }
}
