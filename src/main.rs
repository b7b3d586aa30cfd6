use env_logger::{Builder, WriteStyle};
use log::error;
use sensordash::config::{AppConfig, DEFAULT_CONFIG_FILE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    // Load configuration first (without logging)
    let config = AppConfig::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {:#}", e);
        // Fall back to default configuration
        AppConfig::default()
    });

    // Initialise logger with a configured log level
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Always)
        .format_timestamp_secs()
        .init();

    if let Err(e) = sensordash::run(config).await {
        error!("Application error: {}", e);
        return Err(e);
    }
    Ok(())
}
