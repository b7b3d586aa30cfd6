use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    /// Whole-request timeout in milliseconds, 0 leaves only the scheduler's cycle deadline.
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub interval_ms: u64,
    /// Deadline for one refresh cycle, however the fetch is configured.
    pub cycle_timeout_ms: u64,
    pub wait_for_ready: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_units: bool,
    pub file: String,
    pub save_to_file: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(rename = "ENDPOINT", alias = "endpoint", default)]
    pub endpoint: EndpointConfig,
    #[serde(rename = "SCHEDULER", alias = "scheduler", default)]
    pub scheduler: SchedulerConfig,
    #[serde(rename = "DISPLAY", alias = "display", default)]
    pub display: DisplayConfig,
    #[serde(rename = "LOGGING", alias = "logging", default)]
    pub logging: LoggingConfig,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8091".to_string(),
            path: "/sensor".to_string(),
            timeout_ms: 2000,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            cycle_timeout_ms: 10000,
            wait_for_ready: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_units: true,
            file: "readings.txt".to_string(),
            save_to_file: false,
        }
    }
}

impl EndpointConfig {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        // tokio's interval panics on a zero period
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_millis(self.cycle_timeout_ms.max(1))
    }
}

impl AppConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!(
            "[ENDPOINT]\nbase_url = \"{}\"\npath = \"{}\"\ntimeout_ms = {}\n\n",
            self.endpoint.base_url, self.endpoint.path, self.endpoint.timeout_ms
        ));

        config_str.push_str(&format!(
            "[SCHEDULER]\ninterval_ms = {}\ncycle_timeout_ms = {}\nwait_for_ready = {}\n\n",
            self.scheduler.interval_ms, self.scheduler.cycle_timeout_ms, self.scheduler.wait_for_ready
        ));

        config_str.push_str(&format!(
            "[DISPLAY]\nshow_units = {}\nfile = \"{}\"\nsave_to_file = {}\n\n",
            self.display.show_units, self.display.file, self.display.save_to_file
        ));

        config_str.push_str(&format!("[LOGGING]\nlevel = {}\n", self.logging.level));

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
