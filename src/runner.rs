// src/runner.rs
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::{
    assemble::Assembler,
    config::options::{AppOptions, PublishOptions},
    error::{AssembleError, FetchFailure, PipelineError, SuppressReason},
    model::{FetchResult, Snapshot, Statistics},
    normalize::normalize,
    progress::Progress,
    registry::list_provinces,
    scrape::{self, FetchResults},
    source::PriceSource,
    store,
};

/// What a published (or dry-run) snapshot looked like.
#[derive(Debug)]
pub struct RunReport {
    /// `None` on a dry run.
    pub path: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
    pub statistics: Statistics,
    pub snapshot: Snapshot,
}

#[derive(Debug)]
pub enum RunOutcome {
    Published(RunReport),
    /// Nothing written; the previous artifact stays current.
    Suppressed(SuppressReason),
    Failed(PipelineError),
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// One full run: load history, fetch everything, normalize, assemble, publish.
/// Never panics into the caller; every ending is a `RunOutcome`.
pub fn run(
    opts: &AppOptions,
    source: Arc<dyn PriceSource>,
    progress: Option<&mut dyn Progress>,
) -> RunOutcome {
    if let Err(e) = opts.validate() {
        return RunOutcome::Failed(e);
    }

    let run_at = Utc::now().trunc_subsecs(0);
    let out_path = &opts.publish.out_path;
    let previous = store::load_previous(out_path);
    let source_name = s!(source.name());

    let results = scrape::fetch_all(list_provinces(), source, &opts.fetch, progress);

    let snapshot = match build_snapshot(run_at, &results, previous.as_ref(), &source_name, &opts.publish) {
        Ok(s) => s,
        Err(AssembleError::PublicationSuppressed(reason)) => {
            tracing::warn!(%reason, "Publication suppressed; previous snapshot left in place");
            return RunOutcome::Suppressed(reason);
        }
        Err(e) => {
            tracing::error!(error = %e, "Snapshot failed validation");
            return RunOutcome::Failed(e.into());
        }
    };

    let stats = snapshot.statistics.clone();
    tracing::info!(
        total = stats.total,
        fresh = stats.fresh,
        stale = stats.stale,
        missing = stats.missing,
        "Snapshot assembled"
    );

    let path = if opts.publish.dry_run {
        tracing::info!("Dry run; not writing");
        None
    } else {
        if let Err(e) = store::publish(&snapshot, out_path) {
            return RunOutcome::Failed(e);
        }
        Some(out_path.clone())
    };

    RunOutcome::Published(RunReport {
        path,
        generated_at: snapshot.generated_at,
        statistics: stats,
        snapshot,
    })
}

/// Normalize every registry province against its fetch result and previous
/// record, then assemble. A run in which more than `max_missing_ratio` of the
/// fetches failed is suppressed even if carry-forward could fill the document.
pub fn build_snapshot(
    run_at: DateTime<Utc>,
    results: &FetchResults,
    previous: Option<&Snapshot>,
    source_name: &str,
    publish: &PublishOptions,
) -> Result<Snapshot, AssembleError> {
    let provinces = list_provinces();

    let failed = provinces
        .iter()
        .filter(|p| !matches!(results.get(p.id), Some(Ok(_))))
        .count();
    let total = provinces.len();
    if failed == total {
        return Err(AssembleError::PublicationSuppressed(SuppressReason::FetchCollapse { total }));
    }
    // Carry-forward hides failures from the missing count; gate on them directly.
    if failed as f64 / total as f64 > publish.max_missing_ratio {
        return Err(AssembleError::PublicationSuppressed(SuppressReason::TooManyFailed { failed, total }));
    }

    let unresolved: FetchResult = Err(FetchFailure::Timeout);
    let records = provinces
        .iter()
        .map(|p| {
            let result = results.get(p.id).unwrap_or(&unresolved);
            let prev = previous.and_then(|s| s.record(p.id));
            normalize(p, result, prev, run_at)
        })
        .collect();

    Assembler::new(source_name, publish.max_missing_ratio).assemble(run_at, records)
}

/// `(id, english name, chinese name)` for every tracked region, registry order.
pub fn list_provinces_table() -> Vec<(&'static str, &'static str, &'static str)> {
    list_provinces().iter().map(|p| (p.id, p.name, p.name_zh)).collect()
}
