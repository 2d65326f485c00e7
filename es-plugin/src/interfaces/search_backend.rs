//! Search backend trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::EsError;
use crate::types::{BackendResponse, RawRequest, SearchParams};

/// One call per client library endpoint used by [`crate::EsClient`].
///
/// Implementations send the request and hand back status and body untouched;
/// deciding what a non-2xx status means is left to the caller. An `Err` means
/// no response was obtained.
///
/// All implementations must be `Send + Sync` so a client can be shared
/// across tasks.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Query the cluster info endpoint.
    async fn info(&self) -> Result<BackendResponse, EsError>;

    /// Index a document, with an explicit id or letting the cluster assign one.
    async fn index(
        &self,
        index: &str,
        id: Option<&str>,
        document: Value,
    ) -> Result<BackendResponse, EsError>;

    /// Run a search.
    async fn search(&self, params: SearchParams) -> Result<BackendResponse, EsError>;

    /// Delete a document by id.
    async fn delete(&self, index: &str, id: &str) -> Result<BackendResponse, EsError>;

    /// Delete every document in `indices` matching `query`.
    async fn delete_by_query(
        &self,
        indices: &[String],
        query: Value,
    ) -> Result<BackendResponse, EsError>;

    /// Run a query through the SQL endpoint.
    async fn sql_query(&self, query: Value) -> Result<BackendResponse, EsError>;

    /// Send an arbitrary request through the transport.
    async fn perform(&self, request: RawRequest) -> Result<BackendResponse, EsError>;
}
