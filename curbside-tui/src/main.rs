//! Terminal UI for curbside that lets users pick a zone and inspect holiday-adjusted collection days.

mod app;
mod input;
mod ui;

use std::{
    env,
    fs::File,
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Result, anyhow};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use curbside_core::{CurbsideService, PluginRegistry, parse_iso_date};
use curbside_provider_lower_merion::{self as lower_merion, StreetIndex};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Screen};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    // Service setup
    let plugins = vec![lower_merion::plugin(StreetIndex::builtin()?)?];
    let registry = Arc::new(PluginRegistry::new(plugins));
    let service = Arc::new(CurbsideService::new(registry));

    let (municipality, municipality_name) = service
        .municipalities()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no municipality configured"))?;
    let zones = service.zones(&municipality)?;

    // App state
    let app = App::new(service, municipality, municipality_name, zones);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let path = env::temp_dir().join("curbside-tui.log");
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::LookupAddress => {
                    let address = app.address_input.trim().to_owned();
                    if address.is_empty() {
                        app.error_message =
                            Some("Type a street address, then press Enter".into());
                        continue;
                    }

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app
                        .service
                        .lookup_address(&app.municipality, &address)
                        .await;

                    app.is_loading = false;
                    match res {
                        Ok(assignment) => {
                            tracing::info!(%address, zone = %assignment.zone, "address resolved");
                            if !app.select_zone_by_id(&assignment.zone) {
                                app.error_message =
                                    Some(format!("Zone {} is not listed", assignment.zone));
                            }
                        }
                        Err(err) => {
                            app.error_message = Some(format!("Lookup failed: {err}"));
                        }
                    }
                }
                Action::Inspect => {
                    let Some(zone) = app.selected_zone.clone() else {
                        app.error_message = Some("Select a zone first".into());
                        continue;
                    };

                    let date = match parse_iso_date(&app.date_input) {
                        Ok(date) => date,
                        Err(err) => {
                            app.error_message = Some(err.to_string());
                            continue;
                        }
                    };

                    let inspected = app
                        .service
                        .inspect(&app.municipality, date, &zone.id)
                        .and_then(|inspection| {
                            let decision =
                                app.service.should_notify(&app.municipality, &zone.id, date)?;
                            Ok((inspection, decision))
                        });

                    match inspected {
                        Ok((inspection, decision)) => {
                            app.inspection = Some(inspection);
                            app.reminder_tonight = Some(decision);
                            app.error_message = None;
                            app.screen = Screen::InspectionView;
                        }
                        Err(err) => {
                            app.inspection = None;
                            app.reminder_tonight = None;
                            app.error_message = Some(format!("Inspection failed: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
