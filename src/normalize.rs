// src/normalize.rs
//! Raw payload → canonical `ProvinceRecord`, with per-grade carry-forward.
//!
//! Everything here is pure: the previous record and the run timestamp come in
//! as arguments.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;

use crate::config::consts::PRICE_CEILING_CNY;
use crate::core::sanitize::fold_fullwidth;
use crate::model::{FetchResult, Grade, ProvinceRecord, RawPayload, Status};
use crate::registry::Province;

/// How upstream labels name one grade. Labels are compared after full-width
/// folding and lowercasing.
pub struct GradeAliases {
    pub grade: Grade,
    /// Whole-label matches (feed keys).
    pub exact: &'static [&'static str],
    /// Substring matches (page labels such as `北京92#汽油`).
    pub markers: &'static [&'static str],
}

pub static GRADE_ALIASES: &[GradeAliases] = &[
    GradeAliases {
        grade: Grade::G92,
        exact: &["92", "gasoline_92", "p92"],
        markers: &["92#", "92号"],
    },
    GradeAliases {
        grade: Grade::G95,
        exact: &["95", "gasoline_95", "p95"],
        markers: &["95#", "95号"],
    },
    GradeAliases {
        grade: Grade::G98,
        exact: &["98", "gasoline_98", "p98"],
        markers: &["98#", "98号"],
    },
    GradeAliases {
        grade: Grade::Diesel0,
        exact: &["0", "diesel0", "diesel_0"],
        markers: &["0#", "0号", "柴油"],
    },
];

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("static regex"));

/// The grade an upstream label refers to, if any.
pub fn grade_for_key(label: &str) -> Option<Grade> {
    let label = fold_fullwidth(label).trim().to_lowercase();

    if let Some(a) = GRADE_ALIASES.iter().find(|a| a.exact.contains(&label.as_str())) {
        return Some(a.grade);
    }
    GRADE_ALIASES
        .iter()
        .find(|a| a.markers.iter().any(|m| contains_marker(&label, m)))
        .map(|a| a.grade)
}

/// Substring match, except that a marker starting with a digit must not
/// continue a longer number (`0#` is not found in `-10#柴油`).
fn contains_marker(label: &str, marker: &str) -> bool {
    let numeric = marker.starts_with(|c: char| c.is_ascii_digit());
    label.match_indices(marker).any(|(at, _)| {
        !numeric
            || !label[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.')
    })
}

/// First number in `raw`, kept only if it is a plausible CNY/liter price
/// (strictly between zero and the ceiling).
pub fn coerce_price(raw: &str) -> Option<Decimal> {
    let folded = fold_fullwidth(raw);
    let m = NUMBER.find(&folded)?;
    let value = Decimal::from_str(m.as_str()).ok()?;
    (value > Decimal::ZERO && value < Decimal::from(PRICE_CEILING_CNY)).then_some(value)
}

/// Valid prices in `payload`, one per grade. The first valid value for a grade
/// wins; an invalid earlier value does not block a valid later one.
pub fn extract_prices(payload: &RawPayload) -> BTreeMap<Grade, Decimal> {
    let mut prices = BTreeMap::new();
    for (label, raw) in &payload.fields {
        let Some(grade) = grade_for_key(label) else { continue };
        if prices.contains_key(&grade) {
            continue;
        }
        match coerce_price(raw) {
            Some(value) => {
                prices.insert(grade, value);
            }
            None => tracing::debug!(%label, %raw, %grade, "Dropping implausible price"),
        }
    }
    prices
}

/// Build this run's record for `province`.
pub fn normalize(
    province: &Province,
    result: &FetchResult,
    previous: Option<&ProvinceRecord>,
    run_at: DateTime<Utc>,
) -> ProvinceRecord {
    let mut record = ProvinceRecord::blank(province);

    let payload = match result {
        Ok(payload) => payload,
        Err(_) => {
            if let Some(prev) = previous {
                record.prices = prev.prices.clone();
                record.last_updated = prev.last_updated;
                record.next_adjustment = prev.next_adjustment.clone();
                record.trend = prev.trend.clone();
            }
            record.status = if record.prices.is_empty() { Status::Missing } else { Status::Stale };
            return record;
        }
    };

    let obtained = extract_prices(payload);
    let mut prices = obtained.clone();
    let mut carried = false;
    if let Some(prev) = previous {
        for (grade, value) in &prev.prices {
            if !prices.contains_key(grade) {
                prices.insert(*grade, *value);
                carried = true;
            }
        }
    }

    record.status = if prices.is_empty() {
        Status::Missing
    } else if carried {
        Status::Stale
    } else {
        Status::Fresh
    };

    let prev_updated = previous.and_then(|p| p.last_updated);
    record.last_updated = if obtained.is_empty() {
        prev_updated
    } else {
        match previous {
            // Same values as last time: keep the original timestamp.
            Some(prev) if prev.prices == prices && prev_updated.is_some() => prev_updated,
            _ => Some(run_at),
        }
    };

    record.next_adjustment = payload
        .next_adjustment
        .clone()
        .or_else(|| previous.and_then(|p| p.next_adjustment.clone()));
    record.trend = payload.trend.clone().or_else(|| previous.and_then(|p| p.trend.clone()));
    record.prices = prices;
    record
}
