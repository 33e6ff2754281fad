//! Command line flags with environment fallbacks.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use clap::Parser;
use transit_calc_core::aggregator::CommuteOptions;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Request body to answer; reads stdin when omitted or `-`.
    pub(crate) request: Option<PathBuf>,

    /// Travel time table used to resolve trip durations.
    #[arg(short, long, env = "TRANSIT_CALC_TABLE")]
    pub(crate) table: PathBuf,

    /// Maximum number of lookups running at once.
    #[arg(long, env = "TRANSIT_CALC_MAX_CONCURRENCY")]
    pub(crate) max_concurrency: Option<NonZeroUsize>,

    /// Seconds a single lookup may take before the request fails.
    #[arg(
        long,
        env = "TRANSIT_CALC_LOOKUP_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) lookup_timeout_secs: Option<u64>,

    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Cli {
    pub(crate) fn commute_options(&self) -> CommuteOptions {
        let mut options = CommuteOptions::default();
        if let Some(limit) = self.max_concurrency {
            options = options.with_max_concurrent_lookups(limit);
        }
        if let Some(seconds) = self.lookup_timeout_secs {
            options = options.with_lookup_timeout(StdDuration::from_secs(seconds));
        }
        options
    }

    /// Request path, or `None` for stdin.
    pub(crate) fn request_path(&self) -> Option<&Path> {
        self.request
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let cli = Cli::try_parse_from(["transit-calc", "--table", "legs.toml"]).expect("parses");

        assert_eq!(cli.table, PathBuf::from("legs.toml"));
        assert!(cli.request_path().is_none());
        assert_eq!(cli.commute_options(), CommuteOptions::default());
    }

    #[test]
    fn flags_override_options() {
        let cli = Cli::try_parse_from([
            "transit-calc",
            "-t",
            "legs.toml",
            "--max-concurrency",
            "3",
            "--lookup-timeout-secs",
            "2",
            "request.json",
        ])
        .expect("parses");

        let options = cli.commute_options();
        assert_eq!(options.max_concurrent_lookups.get(), 3);
        assert_eq!(options.lookup_timeout, StdDuration::from_secs(2));
        assert_eq!(cli.request_path(), Some(Path::new("request.json")));
    }

    #[test]
    fn dash_reads_stdin() {
        let cli = Cli::try_parse_from(["transit-calc", "--table", "legs.toml", "-"]).expect("parses");
        assert!(cli.request_path().is_none());
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(
            Cli::try_parse_from(["transit-calc", "--table", "t", "--max-concurrency", "0"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["transit-calc", "--table", "t", "--lookup-timeout-secs", "0"])
                .is_err()
        );
    }
}
