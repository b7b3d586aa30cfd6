pub mod console;
pub mod file;
pub(crate) mod units;

pub use console::ConsoleDisplay;
pub use file::FileDisplay;
