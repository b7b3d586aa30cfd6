use serde::Deserialize;
use std::fmt;

/// A single sensor field as the endpoint sends it, either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(n) => write!(f, "{}", n),
            SensorValue::Text(s) => f.write_str(s),
        }
    }
}

/// Snapshot returned by one successful fetch. Created per fetch and dropped once applied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorReading {
    pub temperature: SensorValue,
    pub pressure: SensorValue,
    pub humidity: SensorValue,
}

impl SensorReading {
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}
