// src/source/mod.rs
//! Where raw per-province payloads come from.
//!
//! A `PriceSource` answers for one province at a time and must be shareable
//! across fetch workers. Retry and concurrency are the fetcher's business, not
//! the source's.

use std::sync::Arc;

use crate::config::options::{AppOptions, SourceKind};
use crate::error::{FetchFailure, PipelineError};
use crate::model::FetchResult;
use crate::registry::Province;

mod feed;
mod fixture;
mod site;

pub use feed::FeedSource;
pub use fixture::FixtureSource;
pub use site::SiteSource;

pub trait PriceSource: Send + Sync {
    /// Short identifier recorded in the snapshot's `source` field.
    fn name(&self) -> &str;

    fn fetch(&self, province: &Province) -> FetchResult;
}

/// Several sources in precedence order. The first `Ok` wins; if every source
/// fails, the last failure is reported.
pub struct SourceChain {
    name: String,
    sources: Vec<Box<dyn PriceSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn PriceSource>>) -> Self {
        let name = sources.iter().map(|s| s.name()).collect::<Vec<_>>().join("+");
        Self { name, sources }
    }
}

impl PriceSource for SourceChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, province: &Province) -> FetchResult {
        let mut last = Err(FetchFailure::NotFound);
        for source in &self.sources {
            match source.fetch(province) {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    tracing::debug!(province = province.id, source = source.name(), error = %e, "Source failed; trying next");
                    last = Err(e);
                }
            }
        }
        last
    }
}

/// Build the configured source (or chain of sources).
pub fn from_options(opts: &AppOptions) -> Result<Arc<dyn PriceSource>, PipelineError> {
    let mut built: Vec<Box<dyn PriceSource>> = Vec::with_capacity(opts.source.order.len());

    for kind in &opts.source.order {
        let source: Box<dyn PriceSource> = match kind {
            SourceKind::Site => Box::new(SiteSource::new(&opts.source.base_url, &opts.fetch)),
            SourceKind::Feed => {
                let url = opts.source.feed_url.as_deref().ok_or_else(|| {
                    PipelineError::Config(s!("source `feed` needs source.feed_url"))
                })?;
                Box::new(FeedSource::new(url, &opts.fetch))
            }
            SourceKind::Fixtures => {
                let dir = opts.source.fixtures_dir.as_deref().ok_or_else(|| {
                    PipelineError::Config(s!("source `fixtures` needs source.fixtures_dir"))
                })?;
                Box::new(FixtureSource::new(dir))
            }
        };
        built.push(source);
    }

    match built.len() {
        0 => Err(PipelineError::Config(s!("no source configured"))),
        1 => Ok(Arc::from(built.remove(0))),
        _ => Ok(Arc::new(SourceChain::new(built))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawPayload;
    use crate::registry::find;

    struct Fixed(&'static str, FetchResult);

    impl PriceSource for Fixed {
        fn name(&self) -> &str { self.0 }
        fn fetch(&self, _province: &Province) -> FetchResult { self.1.clone() }
    }

    #[test]
    fn chain_takes_first_success() {
        let ok = RawPayload::from_pairs([("92", "7.60")]);
        let chain = SourceChain::new(vec![
            Box::new(Fixed("a", Err(FetchFailure::Timeout))),
            Box::new(Fixed("b", Ok(ok.clone()))),
            Box::new(Fixed("c", Ok(RawPayload::default()))),
        ]);
        assert_eq!(chain.name(), "a+b+c");
        assert_eq!(chain.fetch(find("BJ").unwrap()), Ok(ok));
    }

    #[test]
    fn chain_reports_last_failure() {
        let chain = SourceChain::new(vec![
            Box::new(Fixed("a", Err(FetchFailure::Timeout))),
            Box::new(Fixed("b", Err(FetchFailure::NotFound))),
        ]);
        assert_eq!(chain.fetch(find("BJ").unwrap()), Err(FetchFailure::NotFound));
    }

    #[test]
    fn feed_without_url_is_config_error() {
        let mut opts = AppOptions::default();
        opts.source.order = vec![SourceKind::Feed];
        assert!(matches!(from_options(&opts), Err(PipelineError::Config(_))));
    }

    #[test]
    fn multiple_kinds_build_a_chain() {
        let mut opts = AppOptions::default();
        opts.source.order = vec![SourceKind::Fixtures, SourceKind::Site];
        opts.source.fixtures_dir = Some("tests/fixtures".into());
        let source = from_options(&opts).unwrap();
        assert_eq!(source.name(), "fixtures+www.qiyoujiage.com");
    }
}
