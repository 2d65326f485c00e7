//! Adapter error types.
//!
//! This module defines the errors that can surface from any wrapper operation.

use thiserror::Error;

/// Errors that can occur while talking to Elasticsearch through the adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EsError {
    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The client or its transport could not be constructed.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The liveness probe against the cluster info endpoint failed.
    #[error("Cluster unavailable: {0}")]
    ClusterUnavailable(String),

    /// Failed to serialize a document or query to JSON.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The request could not be sent or no response was received.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The response body could not be read.
    #[error("Response error: {0}")]
    ResponseError(String),

    /// The caller supplied a request the adapter cannot send.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl EsError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a cluster unavailable error.
    pub fn cluster_unavailable(msg: impl Into<String>) -> Self {
        Self::ClusterUnavailable(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a response error.
    pub fn response(msg: impl Into<String>) -> Self {
        Self::ResponseError(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl From<serde_json::Error> for EsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_display() {
        let err = EsError::request("connection refused");
        assert_eq!(err.to_string(), "Request error: connection refused");
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EsError = serde_err.into();
        assert!(matches!(err, EsError::SerializationError(_)));
    }
}
