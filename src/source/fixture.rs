// src/source/fixture.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::PriceSource;
use crate::config::consts::PAGE_EXT;
use crate::error::FetchFailure;
use crate::model::FetchResult;
use crate::registry::Province;
use crate::specs::price_page;

/// Saved province pages in a directory (`<dir>/<slug>.shtml`), parsed exactly
/// like live ones. For offline runs and tests.
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }
}

impl PriceSource for FixtureSource {
    fn name(&self) -> &str {
        "fixtures"
    }

    fn fetch(&self, province: &Province) -> FetchResult {
        let slug = province.slug.ok_or(FetchFailure::NotFound)?;
        let path = self.dir.join(format!("{slug}.{PAGE_EXT}"));
        let html = match fs::read_to_string(&path) {
            Ok(html) => html,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FetchFailure::NotFound),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(FetchFailure::Parse(format!("{}: {e}", path.display())));
            }
            Err(e) => return Err(FetchFailure::Network(format!("{}: {e}", path.display()))),
        };
        price_page::parse(&html)
    }
}
