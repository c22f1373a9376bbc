//! Nightly trigger for curbside: sends tomorrow's collection reminders at 8 PM local time.

mod cli;
mod config;
mod dispatch;
mod logging;
mod store;

use std::{env, fs, sync::Arc};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use curbside_core::{
    CurbsideService, MessagePort, MunicipalityId, PluginRegistry, ReminderService, ZoneId,
    is_reminder_window,
};
use curbside_provider_lower_merion::{self as lower_merion, StreetIndex};
use curbside_provider_twilio::{TwilioCredentials, TwilioMessagePort};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::cli::{CheckArgs, Cli, Command, InspectArgs, RunArgs};
use crate::config::NightlyConfig;
use crate::dispatch::DryRunMessagePort;
use crate::store::JsonFileSubscriberStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = NightlyConfig::load(&cli.config)?;
    let service = Arc::new(build_service(&config)?);
    let municipality = MunicipalityId(config.municipality.clone());

    match cli.command {
        Command::Run(args) => run(args, &config, service, municipality).await,
        Command::Check(args) => check(args, &service, &municipality).await,
        Command::Inspect(args) => inspect(args, &service, &municipality),
    }
}

fn build_service(config: &NightlyConfig) -> Result<CurbsideService> {
    let mut index = StreetIndex::builtin()?;
    if let Some(path) = &config.streets {
        let document = fs::read_to_string(path)
            .with_context(|| format!("failed to read street index {}", path.display()))?;
        index = index.merge(StreetIndex::from_toml(&document)?)?;
    }

    let plugins = vec![lower_merion::plugin(index)?];
    let registry = Arc::new(PluginRegistry::new(plugins));
    Ok(CurbsideService::new(registry))
}

async fn run(
    args: RunArgs,
    config: &NightlyConfig,
    service: Arc<CurbsideService>,
    municipality: MunicipalityId,
) -> Result<()> {
    let tz: Tz = config
        .timezone
        .parse()
        .map_err(|err| anyhow!("invalid timezone {}: {err}", config.timezone))?;

    let now = Utc::now();
    if args.checks_window() && !is_reminder_window(now, &tz) {
        info!(%now, timezone = %tz, "outside reminder window, skipping");
        return Ok(());
    }

    let today = args
        .today
        .unwrap_or_else(|| now.with_timezone(&tz).date_naive());

    let messenger: Arc<dyn MessagePort> = if args.dry_run || config.dry_run {
        Arc::new(DryRunMessagePort::default())
    } else {
        let client = Client::builder().user_agent("curbside/0.1").build()?;
        Arc::new(TwilioMessagePort::new(
            client,
            twilio_credentials()?,
            config.channel,
        ))
    };

    let subscribers = Arc::new(JsonFileSubscriberStore::new(config.subscribers.clone()));
    let reminders = ReminderService::new(service, municipality, subscribers, messenger);

    let report = reminders
        .run_nightly(today)
        .await
        .context("failed to load subscribers")?;
    print_json(&report)
}

async fn check(
    args: CheckArgs,
    service: &CurbsideService,
    municipality: &MunicipalityId,
) -> Result<()> {
    let assignment = service
        .lookup_address(municipality, &args.address)
        .await
        .with_context(|| format!("no zone for {:?}", args.address))?;
    print_json(&assignment)
}

fn inspect(args: InspectArgs, service: &CurbsideService, municipality: &MunicipalityId) -> Result<()> {
    let inspection = service.inspect(municipality, args.date, &ZoneId(args.zone))?;
    print_json(&inspection)
}

fn twilio_credentials() -> Result<TwilioCredentials> {
    Ok(TwilioCredentials {
        account_sid: env_var("TWILIO_ACCOUNT_SID")?,
        auth_token: env_var("TWILIO_AUTH_TOKEN")?,
        from: env_var("TWILIO_FROM")?,
    })
}

fn env_var(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} is not set"))
}

#[expect(clippy::print_stdout, reason = "command output goes to stdout, logs to stderr")]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
