use crate::models::DisplaySlots;

pub(crate) struct Units {
    pub temperature: &'static str,
    pub pressure: &'static str,
    pub humidity: &'static str,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            temperature: "°C",
            pressure: "hPa",
            humidity: "%RH",
        }
    }
}

/// One-line summary of the slots, with or without units.
pub(crate) fn format_line(slots: &DisplaySlots, show_units: bool) -> String {
    if show_units {
        let units = Units::default();
        format!(
            "temperature: {} {} | pressure: {} {} | humidity: {} {}",
            slots.temperature,
            units.temperature,
            slots.pressure,
            units.pressure,
            slots.humidity,
            units.humidity
        )
    } else {
        format!(
            "temperature: {} | pressure: {} | humidity: {}",
            slots.temperature, slots.pressure, slots.humidity
        )
    }
}
