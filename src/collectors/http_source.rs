use crate::collectors::SampleSource;
use crate::error::SampleError;
use crate::events::{Reading, SensorPayload};
use chrono::Utc;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Sample source reading the sensor's JSON endpoint over HTTP
///
/// Each fetch is a single `GET` bounded by the client timeout. Network
/// failures, timeouts and non-2xx statuses are transport errors; a body that
/// does not parse as a [`SensorPayload`] is a format error.
pub struct HttpSampleSource {
    client: Client,
    url: String,
}

impl HttpSampleSource {
    /// Create a source for the sensor at `url`
    ///
    /// # Errors
    ///
    /// Returns `SampleError::Transport` if the HTTP client cannot be built.
    pub fn new(url: String, timeout: Duration) -> Result<Self, SampleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SampleError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse a response body into a reading
    fn parse_body(body: &str, fetched_at: chrono::DateTime<Utc>) -> Result<Reading, SampleError> {
        let payload: SensorPayload = serde_json::from_str(body).map_err(|e| {
            SampleError::Format(format!("{}. Payload was: {}", e, body.trim()))
        })?;
        Ok(payload.into_reading(fetched_at))
    }
}

impl SampleSource for HttpSampleSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Reading, SampleError>> + Send + '_>> {
        Box::pin(async move {
            let fetched_at = Utc::now();

            let response = self
                .client
                .get(&self.url)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| SampleError::Transport(format!("GET {} failed: {}", self.url, e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SampleError::Transport(format!(
                    "Sensor returned HTTP {}",
                    status
                )));
            }

            let body = response.text().await?;
            let reading = Self::parse_body(&body, fetched_at)?;

            debug!(
                "Fetched reading: distance={:.2}cm sensor_id={:?}",
                reading.distance, reading.sensor_id
            );
            Ok(reading)
        })
    }
}
