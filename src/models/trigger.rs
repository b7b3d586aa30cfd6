use std::fmt;
use std::str::FromStr;

/// Why a refresh cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    InitialLoad,
    TimerTick,
    VisibilityBecameVisible,
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshTrigger::InitialLoad => "initial load",
            RefreshTrigger::TimerTick => "timer tick",
            RefreshTrigger::VisibilityBecameVisible => "became visible",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown visibility state: {0:?}")]
pub struct UnknownVisibility(pub String);

impl FromStr for Visibility {
    type Err = UnknownVisibility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visible" => Ok(Visibility::Visible),
            "hidden" => Ok(Visibility::Hidden),
            other => Err(UnknownVisibility(other.to_string())),
        }
    }
}
