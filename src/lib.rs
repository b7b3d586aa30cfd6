pub mod client;
pub mod config;
pub mod dashboard;
pub mod environment;
pub mod models;
pub mod renderer;
pub mod scheduler;

use crate::client::HttpSensorClient;
use crate::config::AppConfig;
use crate::dashboard::{DisplaySink, DisplaySync};
use crate::renderer::{ConsoleDisplay, FileDisplay};
use crate::scheduler::Scheduler;
use anyhow::Context;
use log::{debug, error, info};

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting application");

    tokio::select! {
        result = main_loop(&config) => {
            match result {
                Ok(_) => info!("Application completed successfully"),
                Err(e) => {
                    error!("Application error: {e:#}");
                    // Print chain of error causes
                    for cause in e.chain().skip(1) {
                        error!("Caused by: {cause}");
                    }
                    return Err(e).context("Application failed to run");
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted, shutting down"),
                Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
            }
        }
    }

    Ok(())
}

async fn main_loop(config: &AppConfig) -> anyhow::Result<()> {
    let client = HttpSensorClient::new(&config.endpoint)?;
    info!("Sensor endpoint: {}", client.url());

    let mut sinks: Vec<Box<dyn DisplaySink>> =
        vec![Box::new(ConsoleDisplay::stdio(config.display.show_units))];
    if config.display.save_to_file {
        debug!("Mirroring readings to {}", config.display.file);
        sinks.push(Box::new(FileDisplay::new(
            &config.display.file,
            config.display.show_units,
        )));
    }

    let (readiness, visibility_rx, _listener) =
        environment::spawn_stdin_listener(config.scheduler.wait_for_ready)
            .context("Failed to start environment signal listener")?;

    let scheduler = Scheduler::new(client, DisplaySync::new(sinks), config.scheduler.interval())
        .with_cycle_timeout(config.scheduler.cycle_timeout());
    let stats = scheduler
        .run(readiness, visibility_rx, std::future::pending())
        .await;

    info!("Scheduler stopped: {stats:?}");
    Ok(())
}
