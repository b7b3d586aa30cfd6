use chrono::Local;
use log::error;
use std::io::{self, Stderr, Stdout, Write};

use crate::dashboard::DisplaySink;
use crate::models::DisplaySlots;
use crate::renderer::units;

/// Prints readings to one stream and notifications to another.
pub struct ConsoleDisplay<O = Stdout, E = Stderr> {
    out: O,
    err: E,
    show_units: bool,
}

impl ConsoleDisplay {
    pub fn stdio(show_units: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), show_units)
    }
}

impl<O: Write, E: Write> ConsoleDisplay<O, E> {
    pub fn new(out: O, err: E, show_units: bool) -> Self {
        Self {
            out,
            err,
            show_units,
        }
    }
}

impl<O: Write, E: Write> DisplaySink for ConsoleDisplay<O, E> {
    fn render(&mut self, slots: &DisplaySlots) {
        let line = units::format_line(slots, self.show_units);
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            error!("Failed to write reading to console: {}", e);
        }
    }

    fn notify(&mut self, message: &str) {
        let stamp = Local::now().format("%H:%M:%S");
        if let Err(e) = writeln!(self.err, "[{stamp}] {message}").and_then(|_| self.err.flush()) {
            error!("Failed to write notification to console: {}", e);
        }
    }
}
