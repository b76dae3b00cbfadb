// src/config/consts.rs

// Upstream
pub const SITE_BASE_URL: &str = "http://www.qiyoujiage.com";
pub const SITE_NAME: &str = "www.qiyoujiage.com";
pub const PAGE_EXT: &str = "shtml";
pub const USER_AGENT: &str = concat!("oil_scrape/", env!("CARGO_PKG_VERSION"));

// Snapshot
pub const SCHEMA_VERSION: u32 = 1;
pub const PRICE_CEILING_CNY: u32 = 20; // exclusive, per liter
pub const MAX_MISSING_RATIO: f64 = 0.5;

// Publish
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "oil_prices.json";

// Concurrency
pub const WORKERS: usize = 5;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MAX_ATTEMPTS: u32 = 3;
pub const BACKOFF_MS: u64 = 500; // doubles per retry
pub const RUN_TIMEOUT_SECS: u64 = 90;
pub const MAX_DURATION_SECS: u64 = 86_400; // upper bound for any configured wait
