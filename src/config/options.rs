// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::error::PipelineError;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub fetch: FetchOptions,
    pub source: SourceOptions,
    pub publish: PublishOptions,
}

impl AppOptions {
    /// Read a TOML config file. Missing keys fall back to the compiled defaults.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let opts: AppOptions = toml::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.fetch.max_attempts == 0 {
            return Err(PipelineError::Config(s!("fetch.max_attempts must be at least 1")));
        }
        if !(0.0..=1.0).contains(&self.publish.max_missing_ratio) {
            return Err(PipelineError::Config(s!("publish.max_missing_ratio must be within 0..=1")));
        }
        let f = &self.fetch;
        let too_long = [
            ("fetch.run_timeout_secs", f.run_timeout()),
            ("fetch.request_timeout_secs", f.request_timeout()),
            ("fetch.backoff_ms", f.backoff()),
            ("fetch.request_pause_ms", f.request_pause()),
        ]
        .into_iter()
        .find(|(_, d)| d.as_secs() > MAX_DURATION_SECS);
        if let Some((key, _)) = too_long {
            return Err(PipelineError::Config(format!("{key} must not exceed {MAX_DURATION_SECS} seconds")));
        }
        if self.source.order.is_empty() {
            return Err(PipelineError::Config(s!("source.order must name at least one source")));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub workers: usize,
    pub request_pause_ms: u64,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub run_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            workers: WORKERS,
            request_pause_ms: REQUEST_PAUSE_MS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            max_attempts: MAX_ATTEMPTS,
            backoff_ms: BACKOFF_MS,
            run_timeout_secs: RUN_TIMEOUT_SECS,
            user_agent: s!(USER_AGENT),
        }
    }
}

impl FetchOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
    pub fn request_pause(&self) -> Duration {
        Duration::from_millis(self.request_pause_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SourceKind {
    /// One HTML page per province on the price site.
    Site,
    /// A single combined JSON feed.
    Feed,
    /// Saved HTML pages in a local directory.
    Fixtures,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    /// Precedence order; the first source with data for a province wins.
    pub order: Vec<SourceKind>,
    pub base_url: String,
    pub feed_url: Option<String>,
    pub fixtures_dir: Option<PathBuf>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            order: vec![SourceKind::Site],
            base_url: s!(SITE_BASE_URL),
            feed_url: None,
            fixtures_dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PublishOptions {
    pub out_path: PathBuf,
    pub max_missing_ratio: f64,
    /// Assemble and report, but leave the artifact alone.
    pub dry_run: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            out_path: PathBuf::from(DEFAULT_OUT_DIR).join(DEFAULT_FILE),
            max_missing_ratio: MAX_MISSING_RATIO,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let opts = AppOptions::from_toml_str("").unwrap();
        assert_eq!(opts, AppOptions::default());
        assert_eq!(opts.publish.out_path, PathBuf::from("out").join("oil_prices.json"));
        assert_eq!(opts.source.order, vec![SourceKind::Site]);
    }

    #[test]
    fn partial_config_overrides_only_named_keys() {
        let text = r#"
            [fetch]
            workers = 2
            run_timeout_secs = 30

            [source]
            order = ["feed", "site"]
            feed_url = "https://example.org/oil_prices.json"

            [publish]
            out_path = "public/oil.json"
        "#;
        let opts = AppOptions::from_toml_str(text).unwrap();
        assert_eq!(opts.fetch.workers, 2);
        assert_eq!(opts.fetch.run_timeout(), Duration::from_secs(30));
        assert_eq!(opts.fetch.max_attempts, MAX_ATTEMPTS);
        assert_eq!(opts.source.order, vec![SourceKind::Feed, SourceKind::Site]);
        assert_eq!(opts.source.base_url, SITE_BASE_URL);
        assert_eq!(opts.publish.out_path, PathBuf::from("public/oil.json"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = AppOptions::from_toml_str("[publish]\nmax_missing_ratio = 1.5").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let err = AppOptions::from_toml_str("[source]\norder = [\"carrier-pigeon\"]").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let err = AppOptions::from_toml_str("[fetch]\nrun_timeout_secs = 9223372036854775807").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        let err = AppOptions::from_toml_str("[fetch]\nbackoff_ms = 90000000000").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
