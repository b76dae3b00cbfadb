// src/cli.rs
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use crate::config::options::{AppOptions, SourceKind};
use crate::progress::LogProgress;
use crate::runner::{self, RunOutcome};
use crate::{log, source, store};

/// Scrape retail fuel prices for China's 34 provincial-level regions and
/// publish them as one JSON snapshot.
#[derive(Debug, Parser)]
#[command(name = "oil_scrape", version, about)]
pub struct Args {
    /// TOML config file; flags below override it.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file, or a directory to hold oil_prices.json.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<String>,

    /// Source to use; repeat for a fallback chain (first success wins).
    #[arg(short, long = "source", value_enum, value_name = "KIND")]
    pub sources: Vec<SourceKind>,

    /// Combined JSON feed (URL or file path).
    #[arg(long, value_name = "URL")]
    pub feed_url: Option<String>,

    /// Directory of saved <slug>.shtml pages.
    #[arg(long, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Whole-run deadline in seconds.
    #[arg(long, value_name = "SECS")]
    pub run_timeout: Option<u64>,

    /// Assemble and report without writing the snapshot.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the province registry and exit.
    #[arg(long)]
    pub list_provinces: bool,

    /// -v debug, -vv trace. RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Layer flags over file/compiled defaults.
    pub fn apply(&self, opts: &mut AppOptions) {
        if let Some(out) = &self.out {
            opts.publish.out_path = store::resolve_out_path(out);
        }
        if let Some(url) = &self.feed_url {
            opts.source.feed_url = Some(url.clone());
        }
        if let Some(dir) = &self.fixtures {
            opts.source.fixtures_dir = Some(dir.clone());
        }

        if !self.sources.is_empty() {
            opts.source.order = self.sources.clone();
        } else if self.fixtures.is_some() {
            opts.source.order = vec![SourceKind::Fixtures];
        } else if self.feed_url.is_some() {
            opts.source.order = vec![SourceKind::Feed, SourceKind::Site];
        }

        if let Some(n) = self.workers {
            opts.fetch.workers = n.max(1);
        }
        if let Some(secs) = self.run_timeout {
            opts.fetch.run_timeout_secs = secs;
        }
        if self.dry_run {
            opts.publish.dry_run = true;
        }
    }
}

pub fn run() -> Result<ExitCode> {
    let args = Args::parse();
    log::init(args.verbose, args.log_file.as_deref()).wrap_err("could not open log file")?;

    if args.list_provinces {
        for (id, name, name_zh) in runner::list_provinces_table() {
            println!("{id}\t{name_zh}\t{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut opts = match &args.config {
        Some(path) => AppOptions::load(path)?,
        None => AppOptions::default(),
    };
    args.apply(&mut opts);
    opts.validate()?;

    let source = source::from_options(&opts)?;
    tracing::info!(source = source.name(), out = %opts.publish.out_path.display(), "Starting run");

    let mut progress = LogProgress::default();
    let outcome = runner::run(&opts, source, Some(&mut progress));

    Ok(match outcome {
        RunOutcome::Published(report) => {
            let s = &report.statistics;
            let target = report
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| s!("(dry run)"));
            println!(
                "published {target}: {} fresh, {} stale, {} missing of {}",
                s.fresh, s.stale, s.missing, s.total
            );
            ExitCode::SUCCESS
        }
        RunOutcome::Suppressed(reason) => {
            println!("suppressed: {reason}");
            ExitCode::SUCCESS
        }
        RunOutcome::Failed(e) => {
            eprintln!("failed: {e}");
            ExitCode::FAILURE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("oil_scrape").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_is_a_plain_run() {
        let mut opts = AppOptions::default();
        parse(&[]).apply(&mut opts);
        assert_eq!(opts, AppOptions::default());
    }

    #[test]
    fn repeated_sources_form_a_chain() {
        let mut opts = AppOptions::default();
        parse(&["--source", "feed", "--source", "site", "--feed-url", "feed.json"]).apply(&mut opts);
        assert_eq!(opts.source.order, vec![SourceKind::Feed, SourceKind::Site]);
        assert_eq!(opts.source.feed_url.as_deref(), Some("feed.json"));
    }

    #[test]
    fn fixtures_flag_implies_fixture_source() {
        let mut opts = AppOptions::default();
        parse(&["--fixtures", "tests/fixtures", "--dry-run", "-w", "2"]).apply(&mut opts);
        assert_eq!(opts.source.order, vec![SourceKind::Fixtures]);
        assert!(opts.publish.dry_run);
        assert_eq!(opts.fetch.workers, 2);
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Args::try_parse_from(["oil_scrape", "--source", "pigeon"]).is_err());
    }
}
