//! Sample delivery over HTTP.
//!
//! The [`SampleSink`] trait is the seam between the producer task and the
//! transport: production code uses [`HttpSampleSink`] (a pooled reqwest
//! client), tests inject recording or failing sinks. Delivery failures are
//! the producer's business to tolerate; the sink only reports them.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Default per-request timeout for sample delivery.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(2_500);

/// The payload posted to the sink for every generated sample.
///
/// Positions are geographic here: sampling runs in the local planar frame
/// and each point is projected back before delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    /// ISO-8601 timestamp of the simulated measurement.
    pub timestamp: DateTime<Utc>,
    /// Generator that produced the sample.
    pub identifier: String,
}

/// Errors raised while delivering a sample.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// Asynchronous sample delivery.
///
/// Boxed futures keep the trait object-safe so the producer can hold an
/// `Arc<dyn SampleSink>`.
pub trait SampleSink: Send + Sync {
    /// Posts one serialized sample record to `url`.
    fn deliver<'a>(
        &'a self,
        url: &'a str,
        payload: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;
}

/// Real sink implementation over a pooled async reqwest client.
#[derive(Clone)]
pub struct HttpSampleSink {
    client: reqwest::Client,
}

impl HttpSampleSink {
    /// Creates a sink with the default delivery timeout.
    pub fn new() -> Result<Self, DeliveryError> {
        Self::with_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    /// Creates a sink with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| DeliveryError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

impl SampleSink for HttpSampleSink {
    fn deliver<'a>(
        &'a self,
        url: &'a str,
        payload: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            trace!(url = url, bytes = payload.len(), "posting sample");

            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .body(payload.to_string())
                .send()
                .await
                .map_err(|e| DeliveryError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(DeliveryError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            debug!(url = url, status = status.as_u16(), "sample delivered");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Mock sink that records payloads and can be told to fail.
    pub struct MockSink {
        pub delivered: std::sync::Mutex<Vec<String>>,
        pub response: Result<(), DeliveryError>,
    }

    impl MockSink {
        fn ok() -> Self {
            Self {
                delivered: std::sync::Mutex::new(Vec::new()),
                response: Ok(()),
            }
        }
    }

    impl SampleSink for MockSink {
        fn deliver<'a>(
            &'a self,
            _url: &'a str,
            payload: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
            Box::pin(async move {
                self.delivered.lock().unwrap().push(payload.to_string());
                self.response.clone()
            })
        }
    }

    fn record() -> SampleRecord {
        SampleRecord {
            latitude: 43.187634,
            longitude: 27.926699,
            elevation: -12.5,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            identifier: "uuv1".into(),
        }
    }

    #[test]
    fn test_record_serializes_with_wire_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["latitude"], 43.187634);
        assert_eq!(json["longitude"], 27.926699);
        assert_eq!(json["elevation"], -12.5);
        assert_eq!(json["identifier"], "uuv1");
        // chrono renders an ISO-8601 / RFC 3339 timestamp
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(timestamp.starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let original = record();
        let json = serde_json::to_string(&original).unwrap();
        let parsed: SampleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[tokio::test]
    async fn test_mock_sink_records_payloads() {
        let sink = MockSink::ok();
        sink.deliver("http://sink.example", "{\"a\":1}")
            .await
            .unwrap();
        assert_eq!(sink.delivered.lock().unwrap().as_slice(), ["{\"a\":1}"]);
    }

    #[tokio::test]
    async fn test_mock_sink_propagates_failure() {
        let sink = MockSink {
            delivered: std::sync::Mutex::new(Vec::new()),
            response: Err(DeliveryError::Status {
                status: 503,
                url: "http://sink.example".into(),
            }),
        };
        let result = sink.deliver("http://sink.example", "{}").await;
        assert!(result.is_err());
        // The payload still reached the transport attempt
        assert_eq!(sink.delivered.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_http_sink_builds_with_custom_timeout() {
        assert!(HttpSampleSink::with_timeout(Duration::from_secs(1)).is_ok());
    }
}
