// src/scrape.rs
//! Concurrent fetch phase: one result per registry province, no matter what.

use std::{
    collections::HashMap,
    sync::{ mpsc, Arc, atomic::{ AtomicUsize, Ordering } },
    thread,
    time::{ Duration, Instant },
};

use crate::{
    config::{consts::MAX_DURATION_SECS, options::FetchOptions},
    error::FetchFailure,
    model::FetchResult,
    progress::Progress,
    registry::Province,
    source::PriceSource,
};

pub type FetchResults = HashMap<&'static str, FetchResult>;

/// Fetch every province in `provinces` through `source` with a bounded worker
/// pool. Transient failures are retried with exponential backoff. Provinces
/// still unresolved when the run deadline passes come back as
/// `FetchFailure::Timeout`; their workers are abandoned, not joined.
pub fn fetch_all(
    provinces: &[Province],
    source: Arc<dyn PriceSource>,
    opts: &FetchOptions,
    mut progress: Option<&mut dyn Progress>,
) -> FetchResults {
    let run_timeout = opts.run_timeout().min(Duration::from_secs(MAX_DURATION_SECS));
    let deadline = Instant::now() + run_timeout;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(provinces.len());
        p.log(&format!("Fetching {} provinces from {}…", provinces.len(), source.name()));
    }

    let list = Arc::new(provinces.to_vec());
    let counter = Arc::new(AtomicUsize::new(0));
    let (res_tx, res_rx) = mpsc::channel::<(&'static str, FetchResult)>();

    let workers = opts.workers.min(list.len()).max(1);

    for _ in 0..workers {
        let list = Arc::clone(&list);
        let idx = Arc::clone(&counter);
        let source = Arc::clone(&source);
        let tx = res_tx.clone();
        let opts = opts.clone();

        thread::spawn(move || {
            loop {
                let i = idx.fetch_add(1, Ordering::Relaxed);
                if i >= list.len() || Instant::now() >= deadline {
                    break;
                }
                let province = &list[i];
                let result = fetch_with_retry(source.as_ref(), province, &opts, deadline);
                if tx.send((province.id, result)).is_err() {
                    break; // collector gave up
                }
                thread::sleep(opts.request_pause()); // be polite
            }
        });
    }
    drop(res_tx); // main thread is sole receiver now

    let mut results: FetchResults = HashMap::with_capacity(list.len());

    while results.len() < list.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match res_rx.recv_timeout(remaining) {
            Ok((id, result)) => {
                if let Err(e) = &result {
                    tracing::warn!(province = id, reason = e.reason(), error = %e, "Fetch failed");
                }
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(id, result.is_ok());
                }
                results.entry(id).or_insert(result);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    resolved = results.len(),
                    total = list.len(),
                    "Run deadline reached; remaining provinces time out"
                );
                break;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break, // workers ended early
        }
    }

    for province in list.iter() {
        results.entry(province.id).or_insert_with(|| {
            if let Some(p) = progress.as_deref_mut() {
                p.item_done(province.id, false);
            }
            Err(FetchFailure::Timeout)
        });
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    results
}

/// One province, up to `max_attempts` tries. Only network and timeout
/// failures are retried, and never past the run deadline.
pub fn fetch_with_retry(
    source: &dyn PriceSource,
    province: &Province,
    opts: &FetchOptions,
    deadline: Instant,
) -> FetchResult {
    let mut delay = opts.backoff();
    let mut attempt = 1;

    loop {
        match source.fetch(province) {
            Ok(payload) => return Ok(payload),
            Err(e) if e.is_transient() && attempt < opts.max_attempts => {
                match Instant::now().checked_add(delay) {
                    Some(resume) if resume < deadline => {}
                    _ => return Err(e),
                }
                tracing::debug!(
                    province = province.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure; retrying"
                );
                thread::sleep(delay);
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawPayload;
    use crate::progress::NullProgress;
    use crate::registry::{find, list_provinces};
    use std::sync::Mutex;

    fn quick() -> FetchOptions {
        FetchOptions {
            workers: 4,
            request_pause_ms: 0,
            backoff_ms: 1,
            run_timeout_secs: 5,
            ..FetchOptions::default()
        }
    }

    /// Answers by province id; counts calls.
    struct Scripted {
        fail: HashMap<&'static str, FetchFailure>,
        calls: Mutex<HashMap<&'static str, u32>>,
        /// Transient failures returned before succeeding.
        flaky_until: u32,
        stall: Option<&'static str>,
    }

    impl Scripted {
        fn new() -> Self {
            Self { fail: HashMap::new(), calls: Mutex::new(HashMap::new()), flaky_until: 0, stall: None }
        }
        fn calls(&self, id: &str) -> u32 {
            self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    impl PriceSource for Scripted {
        fn name(&self) -> &str { "scripted" }

        fn fetch(&self, province: &Province) -> FetchResult {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(province.id).or_insert(0);
                *n += 1;
                *n
            };
            if self.stall == Some(province.id) {
                thread::sleep(Duration::from_secs(30));
            }
            if let Some(e) = self.fail.get(province.id) {
                return Err(e.clone());
            }
            if n <= self.flaky_until {
                return Err(FetchFailure::Network(s!("connection reset")));
            }
            Ok(RawPayload::from_pairs([("92", "7.50")]))
        }
    }

    #[test]
    fn one_result_per_province_and_failures_isolated() {
        let mut src = Scripted::new();
        src.fail.insert("XZ", FetchFailure::NotFound);
        src.fail.insert("BJ", FetchFailure::Parse(s!("layout changed")));
        let src = Arc::new(src);

        let results = fetch_all(list_provinces(), src.clone(), &quick(), None);

        assert_eq!(results.len(), 34);
        assert_eq!(results["XZ"], Err(FetchFailure::NotFound));
        assert!(matches!(results["BJ"], Err(FetchFailure::Parse(_))));
        assert_eq!(results.values().filter(|r| r.is_ok()).count(), 32);
        // permanent failures are not retried
        assert_eq!(src.calls("XZ"), 1);
        assert_eq!(src.calls("BJ"), 1);
    }

    #[test]
    fn transient_failures_are_retried() {
        let mut src = Scripted::new();
        src.flaky_until = 2;
        let bj = find("BJ").unwrap();

        let result = fetch_with_retry(&src, bj, &quick(), Instant::now() + Duration::from_secs(5));
        assert!(result.is_ok());
        assert_eq!(src.calls("BJ"), 3);
    }

    #[test]
    fn retries_stop_at_max_attempts() {
        let mut src = Scripted::new();
        src.flaky_until = 10;
        let opts = FetchOptions { max_attempts: 2, ..quick() };

        let result = fetch_with_retry(&src, find("SH").unwrap(), &opts, Instant::now() + Duration::from_secs(5));
        assert!(matches!(result, Err(FetchFailure::Network(_))));
        assert_eq!(src.calls("SH"), 2);
    }

    #[test]
    fn stalled_province_times_out_at_run_deadline() {
        let mut src = Scripted::new();
        src.stall = Some("GD");
        let opts = FetchOptions { run_timeout_secs: 1, ..quick() };

        let started = Instant::now();
        let results = fetch_all(list_provinces(), Arc::new(src), &opts, None);

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(results.len(), 34);
        assert_eq!(results["GD"], Err(FetchFailure::Timeout));
        assert!(results["BJ"].is_ok());
    }

    #[derive(Default)]
    struct Counting {
        total: usize,
        ok: usize,
        failed: usize,
        finished: bool,
    }

    impl Progress for Counting {
        fn begin(&mut self, total: usize) { self.total = total; }
        fn item_done(&mut self, _id: &str, ok: bool) {
            if ok { self.ok += 1 } else { self.failed += 1 }
        }
        fn finish(&mut self) { self.finished = true; }
    }

    #[test]
    fn progress_sees_every_province() {
        let mut src = Scripted::new();
        src.fail.insert("HK", FetchFailure::NotFound);
        let mut progress = Counting::default();

        fetch_all(list_provinces(), Arc::new(src), &quick(), Some(&mut progress));

        assert_eq!(progress.total, 34);
        assert_eq!(progress.ok, 33);
        assert_eq!(progress.failed, 1);
        assert!(progress.finished);
    }

    #[test]
    fn unbounded_timeouts_do_not_overflow() {
        let mut src = Scripted::new();
        src.flaky_until = 1;
        let opts = FetchOptions {
            run_timeout_secs: u64::MAX,
            backoff_ms: u64::MAX,
            ..quick()
        };

        // the huge backoff cannot fit before any deadline: give up instead of sleeping
        let far = Instant::now() + Duration::from_secs(60);
        let result = fetch_with_retry(&src, find("BJ").unwrap(), &opts, far);
        assert!(matches!(result, Err(FetchFailure::Network(_))));

        let results = fetch_all(list_provinces(), Arc::new(Scripted::new()), &opts, Some(&mut NullProgress));
        assert_eq!(results.len(), 34);
        assert!(results.values().all(|r| r.is_ok()));
    }
}
