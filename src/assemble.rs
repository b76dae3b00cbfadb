// src/assemble.rs
use chrono::{DateTime, SubsecRound, Utc};

use crate::config::consts::{MAX_MISSING_RATIO, SCHEMA_VERSION};
use crate::error::{AssembleError, SuppressReason};
use crate::model::{ProvinceRecord, Snapshot, Statistics};
use crate::registry::{list_provinces, position};

/// Puts normalized records into registry order and decides whether the result
/// may be published.
#[derive(Clone, Debug)]
pub struct Assembler {
    pub source: String,
    pub max_missing_ratio: f64,
}

impl Default for Assembler {
    fn default() -> Self {
        Self { source: String::new(), max_missing_ratio: MAX_MISSING_RATIO }
    }
}

impl Assembler {
    pub fn new(source: &str, max_missing_ratio: f64) -> Self {
        Self { source: s!(source), max_missing_ratio }
    }

    pub fn assemble(
        &self,
        run_at: DateTime<Utc>,
        records: Vec<ProvinceRecord>,
    ) -> Result<Snapshot, AssembleError> {
        let expected = list_provinces().len();
        let mut slots: Vec<Option<ProvinceRecord>> = vec![None; expected];

        for record in records {
            match position(&record.province_id) {
                Some(i) if slots[i].is_none() => slots[i] = Some(record),
                Some(_) => tracing::warn!(province = %record.province_id, "Duplicate record dropped"),
                None => tracing::warn!(province = %record.province_id, "Unknown province dropped"),
            }
        }

        let provinces: Vec<ProvinceRecord> = slots.into_iter().flatten().collect();
        if provinces.len() != expected {
            return Err(AssembleError::IncompleteSnapshot { expected, found: provinces.len() });
        }

        let statistics = Statistics::tally(&provinces);
        let too_many = statistics.missing as f64 / statistics.total as f64 > self.max_missing_ratio;
        if too_many || statistics.missing == statistics.total {
            return Err(AssembleError::PublicationSuppressed(SuppressReason::TooManyMissing {
                missing: statistics.missing,
                total: statistics.total,
            }));
        }

        Ok(Snapshot {
            generated_at: run_at.trunc_subsecs(0),
            schema_version: SCHEMA_VERSION,
            source: self.source.clone(),
            statistics,
            provinces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::registry::find;

    fn records(missing: usize) -> Vec<ProvinceRecord> {
        list_provinces()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut r = ProvinceRecord::blank(p);
                if i >= missing {
                    r.prices = prices! { G92 => "7.50" };
                    r.status = Status::Fresh;
                }
                r
            })
            .collect()
    }

    #[test]
    fn registry_order_regardless_of_input_order() {
        let mut input = records(0);
        input.reverse();
        let snap = Assembler::new("test", 0.5).assemble(Utc::now(), input).unwrap();

        let ids: Vec<&str> = snap.provinces.iter().map(|r| r.province_id.as_str()).collect();
        let expected: Vec<&str> = list_provinces().iter().map(|p| p.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(snap.schema_version, SCHEMA_VERSION);
        assert_eq!(snap.source, "test");
        assert_eq!(snap.statistics, Statistics { total: 34, fresh: 34, stale: 0, missing: 0 });
    }

    #[test]
    fn short_list_is_incomplete() {
        let mut input = records(0);
        input.pop();
        let err = Assembler::default().assemble(Utc::now(), input).unwrap_err();
        assert_eq!(err, AssembleError::IncompleteSnapshot { expected: 34, found: 33 });
    }

    #[test]
    fn duplicate_and_unknown_ids_fail_the_count() {
        let mut input = records(0);
        input.pop(); // drop MO
        input.push(ProvinceRecord::blank(find("BJ").unwrap()));
        let mut alien = ProvinceRecord::blank(find("SH").unwrap());
        alien.province_id = s!("ZZ");
        input.push(alien);

        let err = Assembler::default().assemble(Utc::now(), input).unwrap_err();
        assert_eq!(err, AssembleError::IncompleteSnapshot { expected: 34, found: 33 });
    }

    #[test]
    fn missing_ratio_gate() {
        // 17 of 34 is exactly half: publishes
        assert!(Assembler::default().assemble(Utc::now(), records(17)).is_ok());

        let err = Assembler::default().assemble(Utc::now(), records(18)).unwrap_err();
        assert_eq!(
            err,
            AssembleError::PublicationSuppressed(SuppressReason::TooManyMissing { missing: 18, total: 34 })
        );
    }

    #[test]
    fn all_missing_never_publishes() {
        let err = Assembler::new("x", 1.0).assemble(Utc::now(), records(34)).unwrap_err();
        assert!(matches!(err, AssembleError::PublicationSuppressed(_)));
    }

    #[test]
    fn generated_at_has_whole_seconds() {
        let snap = Assembler::default().assemble(Utc::now(), records(0)).unwrap();
        assert_eq!(snap.generated_at.timestamp_subsec_nanos(), 0);
    }
}
