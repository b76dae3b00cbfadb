// src/model.rs
//! The published document and everything that flows into it.
//!
//! `Snapshot` is both the output of a run and (read back from disk) the
//! carry-forward input of the next one, so every type here round-trips through
//! serde.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::consts::SCHEMA_VERSION;
use crate::error::FetchFailure;
use crate::registry::Province;

/// Fuel grade. Declaration order is the key order in the JSON `prices` object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "92")]
    G92,
    #[serde(rename = "95")]
    G95,
    #[serde(rename = "98")]
    G98,
    #[serde(rename = "diesel0")]
    Diesel0,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::G92, Grade::G95, Grade::G98, Grade::Diesel0];

    pub fn key(self) -> &'static str {
        match self {
            Grade::G92 => "92",
            Grade::G95 => "95",
            Grade::G98 => "98",
            Grade::Diesel0 => "diesel0",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    Municipality,
    Province,
    AutonomousRegion,
    SpecialAdministrativeRegion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Every value in the record was obtained this run.
    Fresh,
    /// At least one value was carried forward from the previous snapshot.
    Stale,
    /// No value has ever been obtained.
    Missing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Fresh => "fresh",
            Status::Stale => "stale",
            Status::Missing => "missing",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Upstream forecast for the next price adjustment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// CNY per liter.
    pub amount: Decimal,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    pub province_id: String,
    pub province_name: String,
    pub province_name_zh: String,
    pub region_type: RegionType,
    pub prices: BTreeMap<Grade, Decimal>,
    pub status: Status,
    /// When the current price values were first obtained. A run that fetches
    /// the same values again keeps the earlier timestamp, so a `fresh` record
    /// can carry a time older than `generated_at`; a run that fetches nothing
    /// valid carries the previous timestamp. `None` until a value is obtained.
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_adjustment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl ProvinceRecord {
    /// Registry identity, no values: the starting point for every run.
    pub fn blank(province: &Province) -> Self {
        Self {
            province_id: s!(province.id),
            province_name: s!(province.name),
            province_name_zh: s!(province.name_zh),
            region_type: province.region_type,
            prices: BTreeMap::new(),
            status: Status::Missing,
            last_updated: None,
            next_adjustment: None,
            trend: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
    pub missing: usize,
}

impl Statistics {
    pub fn tally(records: &[ProvinceRecord]) -> Self {
        let mut stats = Statistics { total: records.len(), ..Default::default() };
        for r in records {
            match r.status {
                Status::Fresh => stats.fresh += 1,
                Status::Stale => stats.stale += 1,
                Status::Missing => stats.missing += 1,
            }
        }
        stats
    }
}

/// The published document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub schema_version: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub statistics: Statistics,
    pub provinces: Vec<ProvinceRecord>,
}

impl Snapshot {
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }

    pub fn record(&self, province_id: &str) -> Option<&ProvinceRecord> {
        self.provinces.iter().find(|r| r.province_id == province_id)
    }
}

/// What a source hands back for one province before normalization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPayload {
    /// Upstream `(label, value)` pairs in document order,
    /// e.g. `("北京92#汽油", "7.65")` or `("92", "7.65")`.
    pub fields: Vec<(String, String)>,
    pub next_adjustment: Option<String>,
    pub trend: Option<Trend>,
}

impl RawPayload {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Default::default()
        }
    }
}

pub type FetchResult = Result<RawPayload, FetchFailure>;
