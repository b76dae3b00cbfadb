// src/progress.rs
/// Lightweight progress reporting for a run.
/// Frontends implement this to surface status to users; the pipeline only
/// ever calls it from the collecting thread.
pub trait Progress {
    /// Called at the start with the number of provinces to fetch.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called once per province as its fetch resolves.
    fn item_done(&mut self, _province_id: &str, _ok: bool) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Forwards progress to `tracing`, counting as it goes.
#[derive(Default)]
pub struct LogProgress {
    total: usize,
    done: usize,
    failed: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        tracing::info!(total, "Fetching provinces");
    }

    fn log(&mut self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn item_done(&mut self, province_id: &str, ok: bool) {
        self.done += 1;
        if !ok {
            self.failed += 1;
        }
        tracing::debug!(province = province_id, ok, done = self.done, total = self.total);
    }

    fn finish(&mut self) {
        tracing::info!(done = self.done, failed = self.failed, "Fetch phase finished");
    }
}
