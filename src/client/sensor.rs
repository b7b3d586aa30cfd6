use anyhow::Context;
use log::debug;
use std::error::Error as StdError;
use std::time::Instant;
use thiserror::Error;

use crate::config::EndpointConfig;
use crate::models::SensorReading;

/// # Sensor endpoint
///
/// The sensor service answers `GET <path>` with a JSON object:
///
/// ```text
/// { "temperature": 21.5, "pressure": 1013, "humidity": 40 }
/// ```
///
/// Any status outside 2xx fails the cycle. No query string, request body or
/// extra headers are sent, and nothing is retried here: the next scheduled
/// cycle is the retry.

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{path} request failed: {source}")]
    Network {
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{path} response status: {status}")]
    HttpStatus { path: String, status: u16 },

    #[error("{path} response is not a sensor reading: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can produce one reading per call.
#[allow(async_fn_in_trait)]
pub trait SensorSource {
    /// Endpoint path, used to label failures.
    fn path(&self) -> &str;

    async fn fetch_reading(&self) -> Result<SensorReading, FetchError>;
}

pub struct HttpSensorClient {
    client: reqwest::Client,
    url: String,
    path: String,
}

impl HttpSensorClient {
    pub fn new(endpoint: &EndpointConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = endpoint.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: endpoint.url(),
            path: endpoint.path.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn network_error(&self, e: reqwest::Error) -> FetchError {
        FetchError::Network {
            path: self.path.clone(),
            source: Box::new(e),
        }
    }
}

impl SensorSource for HttpSensorClient {
    fn path(&self) -> &str {
        &self.path
    }

    async fn fetch_reading(&self) -> Result<SensorReading, FetchError> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                path: self.path.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.network_error(e))?;
        let reading = SensorReading::from_slice(&body).map_err(|source| FetchError::Parse {
            path: self.path.clone(),
            source,
        })?;

        debug!("fetch_reading took: {} ms", start.elapsed().as_millis());
        Ok(reading)
    }
}
