// src/specs/price_page.rs
//! One province's page on the price site (`/<slug>.shtml`).
//!
//! Ground truth lives in two blocks:
//! - `#youjia`: one `<dl>` per grade, `<dt>` holds the label (`北京92#汽油`),
//!   `<dd>` holds the price (`7.65`).
//! - `#youjiaCont`: free-text notice with the next adjustment window and the
//!   forecast direction/amount.
//!
//! Labels and values are handed over raw; grade matching and numeric coercion
//! belong to the normalizer.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::core::html::{child_blocks, element_by_id, first_block, text};
use crate::error::FetchFailure;
use crate::model::{RawPayload, Trend, TrendDirection};

static NEXT_ADJUSTMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"下次油价(\d+月\d+日\d+时调整)").expect("static regex"));

static FORECAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"目前预计(上调|下调)油价.*?[(（]([\d.]+)元/升").expect("static regex")
});

pub fn parse(html: &str) -> Result<RawPayload, FetchFailure> {
    let block = element_by_id(html, "youjia")
        .ok_or_else(|| FetchFailure::Parse(s!("price block #youjia not found")))?;

    let mut fields = Vec::new();
    for dl in child_blocks(block, "dl") {
        let (Some(dt), Some(dd)) = (first_block(dl, "dt"), first_block(dl, "dd")) else {
            continue;
        };
        let label = text(dt);
        if label.is_empty() {
            continue;
        }
        fields.push((label, text(dd)));
    }

    if fields.is_empty() {
        return Err(FetchFailure::Parse(s!("price block has no entries")));
    }

    let (next_adjustment, trend) = match element_by_id(html, "youjiaCont") {
        Some(notice) => parse_notice(&text(notice)),
        None => (None, None),
    };

    Ok(RawPayload { fields, next_adjustment, trend })
}

/// Adjustment window and forecast from the notice text. A notice without a
/// forecast reads as "stable".
pub fn parse_notice(notice: &str) -> (Option<String>, Option<Trend>) {
    let next = NEXT_ADJUSTMENT.find(notice).map(|m| s!(m.as_str()));

    let trend = FORECAST
        .captures(notice)
        .and_then(|caps| {
            let up = &caps[1] == "上调";
            let amount = Decimal::from_str(&caps[2]).ok()?;
            Some(Trend {
                direction: if up { TrendDirection::Up } else { TrendDirection::Down },
                amount,
                description: format!("预计{}{}元/升", &caps[1], amount),
            })
        })
        .unwrap_or_else(|| Trend {
            direction: TrendDirection::Stable,
            amount: Decimal::ZERO,
            description: s!("价格稳定"),
        });

    (next, Some(trend))
}
