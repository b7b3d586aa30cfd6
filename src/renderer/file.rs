use anyhow::{Context, Result};
use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dashboard::DisplaySink;
use crate::models::DisplaySlots;
use crate::renderer::units;

/// Keeps the latest slot values in a text file.
///
/// The file is replaced by rename, so readers see either the previous group or the new one.
/// Notifications are only logged; the file holds values, not errors.
pub struct FileDisplay {
    path: PathBuf,
    show_units: bool,
}

impl FileDisplay {
    pub fn new<P: AsRef<Path>>(path: P, show_units: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            show_units,
        }
    }

    fn save(&self, slots: &DisplaySlots) -> Result<()> {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let contents = format!(
            "temperature = {}\npressure = {}\nhumidity = {}\nsummary = {}\n",
            slots.temperature,
            slots.pressure,
            slots.humidity,
            units::format_line(slots, self.show_units)
        );

        fs::write(&staging, contents)
            .context(format!("Failed to write readings to {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .context(format!("Failed to replace {}", self.path.display()))?;

        debug!("Readings saved to {}", self.path.display());
        Ok(())
    }
}

impl DisplaySink for FileDisplay {
    fn render(&mut self, slots: &DisplaySlots) {
        if let Err(e) = self.save(slots) {
            error!("{e:#}");
        }
    }

    fn notify(&mut self, message: &str) {
        debug!("{} not updated: {}", self.path.display(), message);
    }
}
