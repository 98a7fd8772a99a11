use std::io::Write;
use std::time::Duration;

use clap::Parser;
use ffradar_cli::commands;
use ffradar_cli::console::spawn_line_reader;
use ffradar_cli::logging::init_logging;
use ffradar_cli::presenter::ConsolePresenter;
use ffradar_cli::update_check::{self, UpdateStatus};
use ffradar_core::memory::LiveProcessProvider;
use ffradar_core::{AppConfig, AppConfigExt, Radar};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Parser)]
#[command(version, about = "Headless actor radar")]
struct Args {
    /// Activate this preset on startup
    #[arg(long)]
    preset: Option<String>,
    /// Print the actor list after every scan
    #[arg(short, long)]
    verbose: bool,
    #[arg(long)]
    no_update_check: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = init_logging();
    let args = Args::parse();
    let mut config = AppConfig::load();

    let mut radar = Radar::new(LiveProcessProvider::new(), &config);
    if let Some(name) = args.preset.as_deref() {
        radar.select_preset(Some(name)).map_err(|e| e.to_string())?;
    }
    radar.add_signal_handler(Box::new(ConsolePresenter::new(
        args.verbose,
        config.overlay.european_number_format,
    )));

    let mut updates = if args.no_update_check {
        tokio::sync::mpsc::channel(1).1
    } else {
        update_check::spawn(&config.updates)
    };
    let mut updates_open = true;

    let mut interval = tokio::time::interval(Duration::from_millis(
        config.scanner.tick_interval_ms.max(1),
    ));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut console = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(process = %config.scanner.process_name, "Radar started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                radar.tick();
            }
            line = console.recv(), if stdin_open => match line {
                Some(line) => match commands::respond(&line, &mut radar, &mut config) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(err) => {
                        write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                        std::io::stdout().flush().map_err(|e| e.to_string())?;
                    }
                },
                None => stdin_open = false,
            },
            status = updates.recv(), if updates_open => match status {
                Some(UpdateStatus::Available { version, url }) => {
                    println!("Update available: {version} ({url})");
                }
                Some(UpdateStatus::UpToDate) => debug!("Up to date"),
                None => updates_open = false,
            },
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    config.presets = radar.presets().clone();
    config.save().map_err(|e| e.to_string())?;
    info!("Settings saved");
    Ok(())
}
