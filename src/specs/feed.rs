// src/specs/feed.rs
//! Combined JSON feed: every province in one document.
//!
//! Accepted shape (the layout the legacy fetch script published):
//! ```text
//! { "data": { "北京": { "status": "success",
//!                      "prices": { "92": 7.65, "95": 8.14, "98": 9.64, "0": 7.33 },
//!                      "next_adjustment": "...", "trend": { ... } }, ... } }
//! ```
//! Sub-records may be keyed by Chinese name or by province id, and `data` may be
//! omitted (records at the top level). A bad sub-record only fails its own
//! province.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::FetchFailure;
use crate::model::{RawPayload, Trend};
use crate::registry::Province;

#[derive(Debug, Clone, Default)]
pub struct Feed {
    records: HashMap<String, Value>,
}

impl Feed {
    pub fn parse(body: &str) -> Result<Self, FetchFailure> {
        let root: Value = serde_json::from_str(body)
            .map_err(|e| FetchFailure::Parse(format!("feed is not JSON: {e}")))?;

        let records = match root.get("data").unwrap_or(&root) {
            Value::Object(map) => map.clone().into_iter().collect(),
            _ => return Err(FetchFailure::Parse(s!("feed has no record object"))),
        };
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_for(&self, province: &Province) -> Result<RawPayload, FetchFailure> {
        let record = self
            .records
            .get(province.id)
            .or_else(|| self.records.get(province.name_zh))
            .ok_or(FetchFailure::NotFound)?;
        parse_record(record)
    }
}

fn parse_record(record: &Value) -> Result<RawPayload, FetchFailure> {
    let obj = record
        .as_object()
        .ok_or_else(|| FetchFailure::Parse(s!("record is not an object")))?;

    if obj.get("status").and_then(Value::as_str) == Some("error") {
        let msg = obj.get("error").and_then(Value::as_str).unwrap_or("unspecified");
        return Err(FetchFailure::Parse(format!("upstream reported error: {msg}")));
    }

    let prices = obj
        .get("prices")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchFailure::Parse(s!("record has no prices object")))?;

    let fields = prices
        .iter()
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => return None,
            };
            Some((key.clone(), raw))
        })
        .collect();

    let next_adjustment = obj.get("next_adjustment").and_then(Value::as_str).map(String::from);
    let trend = obj
        .get("trend")
        .and_then(|t| serde_json::from_value::<Trend>(t.clone()).ok());

    Ok(RawPayload { fields, next_adjustment, trend })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find;

    const FEED: &str = r#"{
        "status": "success",
        "data": {
            "北京": { "status": "success", "prices": { "92": 7.65, "95": "8.14", "98": 9.64, "0": 7.33 },
                      "next_adjustment": "下次油价10月24日24时调整",
                      "trend": { "direction": "up", "amount": 0.05, "description": "预计上调0.05元/升" } },
            "SH": { "prices": { "92": 7.61 } },
            "天津": { "status": "error", "error": "请求超时" },
            "河北": { "status": "success", "prices": [7.6] }
        }
    }"#;

    fn bj() -> &'static Province { find("BJ").unwrap() }

    #[test]
    fn record_by_chinese_name() {
        let feed = Feed::parse(FEED).unwrap();
        assert_eq!(feed.len(), 4);

        let payload = feed.record_for(bj()).unwrap();
        assert!(payload.fields.contains(&(s!("92"), s!("7.65"))));
        assert!(payload.fields.contains(&(s!("95"), s!("8.14"))));
        assert_eq!(payload.next_adjustment.as_deref(), Some("下次油价10月24日24时调整"));
        assert!(payload.trend.is_some());
    }

    #[test]
    fn record_by_province_id() {
        let feed = Feed::parse(FEED).unwrap();
        let payload = feed.record_for(find("SH").unwrap()).unwrap();
        assert_eq!(payload.fields, vec![(s!("92"), s!("7.61"))]);
        assert!(payload.trend.is_none());
    }

    #[test]
    fn bad_sub_records_fail_alone() {
        let feed = Feed::parse(FEED).unwrap();
        assert!(matches!(feed.record_for(find("TJ").unwrap()), Err(FetchFailure::Parse(_))));
        assert!(matches!(feed.record_for(find("HE").unwrap()), Err(FetchFailure::Parse(_))));
        assert_eq!(feed.record_for(find("XZ").unwrap()), Err(FetchFailure::NotFound));
        assert!(feed.record_for(bj()).is_ok());
    }

    #[test]
    fn top_level_records_without_data_key() {
        let feed = Feed::parse(r#"{ "BJ": { "prices": { "92#": "7.65" } } }"#).unwrap();
        assert!(feed.record_for(bj()).is_ok());
    }

    #[test]
    fn non_json_feed_is_parse_error() {
        assert!(matches!(Feed::parse("<html>"), Err(FetchFailure::Parse(_))));
        assert!(matches!(Feed::parse("[1,2]"), Err(FetchFailure::Parse(_))));
    }
}
