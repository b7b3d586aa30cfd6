pub mod sensor;

pub use sensor::{FetchError, HttpSensorClient, SensorSource};
