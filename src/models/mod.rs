pub mod reading;
pub mod trigger;

pub use reading::{SensorReading, SensorValue};
pub use trigger::{RefreshTrigger, Visibility};

/// The three display slots, rendered as one group from a single reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySlots {
    pub temperature: String,
    pub pressure: String,
    pub humidity: String,
}

impl From<&SensorReading> for DisplaySlots {
    fn from(reading: &SensorReading) -> Self {
        Self {
            temperature: reading.temperature.to_string(),
            pressure: reading.pressure.to_string(),
            humidity: reading.humidity.to_string(),
        }
    }
}
