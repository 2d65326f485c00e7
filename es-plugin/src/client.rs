//! Elasticsearch client wrapper.
//!
//! This module provides the client application code uses to index, search,
//! and delete documents and to reach the SQL and raw HTTP endpoints.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::{EsConfig, IndexNames};
use crate::errors::EsError;
use crate::es::ElasticsearchBackend;
use crate::interfaces::SearchBackend;
use crate::types::{BackendResponse, RawRequest, SearchRequest};

/// The wrapper every caller goes through.
///
/// Each operation is a single request/response cycle with no retry. Response
/// bodies are returned as received whatever the status; an `Err` means the
/// request could not be encoded, sent, or read.
pub struct EsClient {
    backend: Box<dyn SearchBackend>,
    indices: IndexNames,
}

impl EsClient {
    /// Create a client over the given backend with default index names.
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            backend,
            indices: IndexNames::default(),
        }
    }

    /// Create a client over the given backend with explicit index names.
    pub fn with_indices(backend: Box<dyn SearchBackend>, indices: IndexNames) -> Self {
        Self { backend, indices }
    }

    /// Build an Elasticsearch backend from `config` and wrap it.
    ///
    /// No request is sent; an unreachable cluster only shows up on the first call.
    pub fn connect(config: &EsConfig) -> Result<Self, EsError> {
        let backend = ElasticsearchBackend::new(config)?;
        Ok(Self::with_indices(Box::new(backend), config.indices.clone()))
    }

    /// Index names this client was configured with.
    pub fn indices(&self) -> &IndexNames {
        &self.indices
    }

    /// Probe the cluster info endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the cluster answered, whatever the status
    /// * `Err(EsError::ClusterUnavailable)` - If no response was obtained
    pub async fn check_liveness(&self) -> Result<(), EsError> {
        let response = self.backend.info().await.map_err(|e| {
            error!(error = %e, "Liveness probe failed");
            EsError::cluster_unavailable(e.to_string())
        })?;

        if !response.is_success() {
            warn!(status = response.status, body = %response.body, "Info endpoint returned non-success status");
        }

        Ok(())
    }

    /// Index a document and let the cluster assign its id.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(EsError)` - If encoding or the request fails
    pub async fn index<T>(&self, index: &str, document: &T) -> Result<String, EsError>
    where
        T: Serialize + ?Sized,
    {
        let document = serde_json::to_value(document)?;
        let response = self.backend.index(index, None, document).await?;
        Ok(into_body("index", response))
    }

    /// Index a document under an explicit id, replacing any existing one.
    ///
    /// Probes the cluster first.
    pub async fn index_with_id<T>(&self, index: &str, id: &str, document: &T) -> Result<String, EsError>
    where
        T: Serialize + ?Sized,
    {
        self.check_liveness().await?;

        let document = serde_json::to_value(document)?;
        let response = self.backend.index(index, Some(id), document).await?;
        Ok(into_body("index", response))
    }

    /// Run a search and return the raw response bytes.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = SearchRequest::new("trans_log", json!({"query": {"match_all": {}}}))
    ///     .with_size(50)
    ///     .with_sort("time:desc");
    /// let bytes = client.search(&request).await?;
    /// ```
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<u8>, EsError> {
        self.check_liveness().await?;

        let response = self.backend.search(request.to_params()).await?;
        Ok(into_body("search", response).into_bytes())
    }

    /// Delete a document by id.
    pub async fn delete(&self, index: &str, id: &str) -> Result<String, EsError> {
        self.check_liveness().await?;

        let response = self.backend.delete(index, id).await?;
        Ok(into_body("delete", response))
    }

    /// Delete every document in `indices` matching `query`.
    ///
    /// The response body is discarded on success.
    pub async fn delete_by_query<S, T>(&self, indices: &[S], query: &T) -> Result<(), EsError>
    where
        S: AsRef<str>,
        T: Serialize + ?Sized,
    {
        if indices.is_empty() {
            return Err(EsError::invalid_request(
                "delete_by_query requires at least one index",
            ));
        }

        self.check_liveness().await?;

        let query = serde_json::to_value(query)?;
        let indices: Vec<String> = indices.iter().map(|i| i.as_ref().to_string()).collect();
        let response = self.backend.delete_by_query(&indices, query).await?;
        into_body("delete_by_query", response);
        Ok(())
    }

    /// Run a query through the SQL endpoint, e.g. `{"query": "SELECT * FROM trans_log"}`.
    pub async fn sql_query<T>(&self, query: &T) -> Result<String, EsError>
    where
        T: Serialize + ?Sized,
    {
        let query = serde_json::to_value(query)?;
        let response = self.backend.sql_query(query).await?;
        Ok(into_body("sql_query", response))
    }

    /// Send an arbitrary request with a JSON body through the client's transport.
    ///
    /// `url` may be a path such as `/trans_log/_count` or an absolute URL;
    /// the transport decides which node receives it.
    pub async fn perform<T>(&self, method: &str, url: &str, body: &T) -> Result<String, EsError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let request = RawRequest::new(method, url, body)?;
        let response = self.backend.perform(request).await?;
        Ok(into_body("perform", response))
    }
}

fn into_body(operation: &str, response: BackendResponse) -> String {
    if response.is_success() {
        debug!(operation, status = response.status, "Elasticsearch request completed");
    } else {
        warn!(
            operation,
            status = response.status,
            body = %response.body,
            "Elasticsearch returned non-success status"
        );
    }
    response.body
}
