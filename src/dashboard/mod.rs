use log::{debug, warn};

use crate::client::FetchError;
use crate::models::{DisplaySlots, SensorReading};

/// Write-only presentation surface: three value slots and a notification channel.
///
/// Implementations handle their own output failures; nothing is returned to the caller.
pub trait DisplaySink {
    /// Replace all three slots at once.
    fn render(&mut self, slots: &DisplaySlots);

    /// Show a transient, human-readable error message.
    fn notify(&mut self, message: &str);
}

impl DisplaySink for Vec<Box<dyn DisplaySink>> {
    fn render(&mut self, slots: &DisplaySlots) {
        for sink in self.iter_mut() {
            sink.render(slots);
        }
    }

    fn notify(&mut self, message: &str) {
        for sink in self.iter_mut() {
            sink.notify(message);
        }
    }
}

/// Pushes readings into the slots and routes failures to the notification channel.
pub struct DisplaySync<S> {
    sink: S,
}

impl<S: DisplaySink> DisplaySync<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn apply_reading(&mut self, reading: SensorReading) {
        let slots = DisplaySlots::from(&reading);
        debug!(
            "Applying reading: temperature={} pressure={} humidity={}",
            slots.temperature, slots.pressure, slots.humidity
        );
        self.sink.render(&slots);
    }

    pub fn report_failure(&mut self, error: &FetchError) {
        warn!("Refresh failed: {error}");
        self.sink.notify(&error.to_string());
    }
}
