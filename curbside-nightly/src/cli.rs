use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use curbside_core::parse_iso_date;

/// Night-before collection reminders.
#[derive(Parser)]
#[command(
    name = "curbside-nightly",
    version,
    about = "Send holiday-aware trash collection reminders"
)]
pub(crate) struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true, default_value = "curbside.toml")]
    pub config: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Remind every subscriber whose collection is tomorrow.
    Run(RunArgs),
    /// Look up the zone of a street address.
    Check(CheckArgs),
    /// Show the resolution of a date and zone with the year's holidays.
    Inspect(InspectArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub(crate) struct RunArgs {
    /// Send even outside the 8 PM reminder window.
    #[arg(long)]
    pub force: bool,

    /// Pretend today is this date (YYYY-MM-DD) instead of the local date; skips the
    /// reminder window check.
    #[arg(long, value_parser = parse_iso_date)]
    pub today: Option<NaiveDate>,

    /// Log messages instead of sending them; overrides the config file.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Whether the real clock must be inside the reminder window before sending.
    pub(crate) fn checks_window(&self) -> bool {
        !self.force && self.today.is_none()
    }
}

/// Arguments for the `check` subcommand.
#[derive(clap::Args)]
pub(crate) struct CheckArgs {
    /// Free-text street address, e.g. "229 Ardleigh Rd".
    pub address: String,
}

/// Arguments for the `inspect` subcommand.
#[derive(clap::Args)]
pub(crate) struct InspectArgs {
    /// Date to resolve (YYYY-MM-DD).
    #[arg(value_parser = parse_iso_date)]
    pub date: NaiveDate,

    /// Zone identifier, e.g. "Zone 3".
    pub zone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        match cli.command {
            Command::Run(args) => Some(args),
            Command::Check(_) | Command::Inspect(_) => None,
        }
        .expect("run subcommand")
    }

    #[test]
    fn plain_run_waits_for_the_window() {
        assert!(run_args(&["curbside-nightly", "run"]).checks_window());
    }

    #[test]
    fn force_or_explicit_today_skip_the_window() {
        assert!(!run_args(&["curbside-nightly", "run", "--force"]).checks_window());

        let replay = run_args(&["curbside-nightly", "run", "--today", "2025-12-23"]);
        assert!(!replay.checks_window());
        assert_eq!(replay.today, NaiveDate::from_ymd_opt(2025, 12, 23));
    }

    #[test]
    fn malformed_today_is_rejected() {
        assert!(Cli::try_parse_from(["curbside-nightly", "run", "--today", "23/12/2025"]).is_err());
    }
}
