use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Breeding KPI reports for one herd owner.
#[derive(Parser, Debug)]
#[command(
    name = "breeding-kpi",
    version,
    about = "Conception rate, days open, calving interval and AI per conception"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Metrics for a single reporting window.
    Metrics(MetricsArgs),
    /// Monthly series with month-over-month deltas.
    Trends(TrendsArgs),
    /// Change between a month and the month before it.
    Delta(DeltaArgs),
}

/// Where events come from and whose herd to report on.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Owner whose herd is reported.
    #[arg(short, long, env = "BREEDING_KPI_OWNER")]
    pub owner: i64,

    /// JSON file of owner-tagged events; read instead of the database.
    #[arg(short, long)]
    pub events: Option<PathBuf>,
}

/// Arguments for the `metrics` subcommand.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Window start (ISO-8601). Defaults to one year before `--to`.
    #[arg(long)]
    pub from: Option<String>,

    /// Window end (ISO-8601). Defaults to now.
    #[arg(long)]
    pub to: Option<String>,
}

/// Arguments for the `trends` subcommand.
#[derive(Args, Debug)]
pub struct TrendsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Last month of the series (YYYY-MM). Defaults to the current month.
    #[arg(long = "to-month")]
    pub to_month: Option<String>,

    /// First month of the series (YYYY-MM). Overrides `--months`.
    #[arg(long = "from-month")]
    pub from_month: Option<String>,

    /// Number of months ending at `--to-month`.
    #[arg(long, allow_negative_numbers = true)]
    pub months: Option<i64>,
}

/// Arguments for the `delta` subcommand.
#[derive(Args, Debug)]
pub struct DeltaArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Month to compare with its predecessor (YYYY-MM).
    #[arg(long)]
    pub month: Option<String>,
}

impl Command {
    pub fn source(&self) -> &SourceArgs {
        match self {
            Self::Metrics(args) => &args.source,
            Self::Trends(args) => &args.source,
            Self::Delta(args) => &args.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_trends_arguments() {
        let cli = Cli::parse_from([
            "breeding-kpi",
            "-vv",
            "trends",
            "--owner",
            "4",
            "--to-month",
            "2024-06",
            "--months",
            "6",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Trends(args) = cli.command else {
            panic!("expected trends");
        };
        assert_eq!(args.source.owner, 4);
        assert_eq!(args.to_month.as_deref(), Some("2024-06"));
        assert_eq!(args.months, Some(6));
    }
}
