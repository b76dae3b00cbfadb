// src/source/site.rs
use ureq::Agent;

use super::PriceSource;
use crate::config::consts::{PAGE_EXT, SITE_BASE_URL, SITE_NAME};
use crate::config::options::FetchOptions;
use crate::core::net;
use crate::error::FetchFailure;
use crate::model::FetchResult;
use crate::registry::Province;
use crate::specs::price_page;

/// One HTML page per province: `<base_url>/<slug>.shtml`.
pub struct SiteSource {
    base_url: String,
    name: String,
    agent: Agent,
}

impl SiteSource {
    pub fn new(base_url: &str, fetch: &FetchOptions) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let name = if base_url == SITE_BASE_URL {
            s!(SITE_NAME)
        } else {
            base_url.clone()
        };
        Self {
            base_url,
            name,
            agent: net::agent(fetch.request_timeout(), &fetch.user_agent),
        }
    }

    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/{}.{}", self.base_url, slug, PAGE_EXT)
    }
}

impl PriceSource for SiteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, province: &Province) -> FetchResult {
        let slug = province.slug.ok_or(FetchFailure::NotFound)?;
        let url = self.page_url(slug);
        tracing::debug!(province = province.id, %url, "GET");
        let html = net::http_get(&self.agent, &url)?;
        price_page::parse(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find;

    #[test]
    fn page_url_from_slug() {
        let site = SiteSource::new("http://www.qiyoujiage.com/", &FetchOptions::default());
        assert_eq!(site.page_url("xizang"), "http://www.qiyoujiage.com/xizang.shtml");
        assert_eq!(site.name(), SITE_NAME);
    }

    #[test]
    fn region_without_page_is_not_found_without_network() {
        // Unroutable base: any real request would fail with a network error.
        let site = SiteSource::new("http://127.0.0.1:9", &FetchOptions::default());
        assert_eq!(site.fetch(find("HK").unwrap()), Err(FetchFailure::NotFound));
    }
}
