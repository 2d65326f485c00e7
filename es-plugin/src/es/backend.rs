//! Elasticsearch backend implementation.
//!
//! This module builds the configured HTTP transport and implements
//! `SearchBackend` on top of the `elasticsearch` crate.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use elasticsearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        headers::{HeaderMap, HeaderValue, CONTENT_TYPE},
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, Transport, TransportBuilder},
        Method,
    },
    DeleteByQueryParts, DeleteParts, Elasticsearch, IndexParts, SearchParts,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{EsConfig, TransportSettings, DEFAULT_ADDRESS};
use crate::errors::EsError;
use crate::interfaces::SearchBackend;
use crate::types::{BackendResponse, HttpMethod, RawRequest, SearchParams};

/// Elasticsearch backend.
///
/// Holds one client per configured node and spreads calls across them in
/// round-robin order. Constructing it performs no network I/O.
///
/// # Example
///
/// ```ignore
/// let config = EsConfig::new(["https://es-1:9200", "https://es-2:9200"])
///     .with_credentials("elastic", "changeme");
/// let backend = ElasticsearchBackend::new(&config)?;
/// let client = EsClient::new(Box::new(backend));
/// ```
pub struct ElasticsearchBackend {
    clients: Vec<Elasticsearch>,
    next: AtomicUsize,
    settings: TransportSettings,
}

impl ElasticsearchBackend {
    /// Build a client for every address in `config`.
    ///
    /// An empty address list falls back to [`DEFAULT_ADDRESS`].
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticsearchBackend)` - A backend ready to send requests
    /// * `Err(EsError::ConnectionError)` - If an address is not an absolute
    ///   http(s) URL or the transport cannot be built
    pub fn new(config: &EsConfig) -> Result<Self, EsError> {
        let addresses: Vec<&str> = if config.addresses.is_empty() {
            vec![DEFAULT_ADDRESS]
        } else {
            config.addresses.iter().map(String::as_str).collect()
        };

        if config.transport.insecure_skip_verify {
            warn!("TLS certificate verification is disabled for Elasticsearch connections");
        }

        let clients = addresses
            .iter()
            .map(|address| build_transport(address, config).map(Elasticsearch::new))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            addresses = ?addresses,
            timeout_ms = config.transport.timeout.as_millis() as u64,
            authenticated = !config.username.is_empty(),
            "Created Elasticsearch client"
        );

        Ok(Self {
            clients,
            next: AtomicUsize::new(0),
            settings: config.transport.clone(),
        })
    }

    /// Transport settings every node connection was built with.
    pub fn transport_settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Number of configured nodes.
    pub fn node_count(&self) -> usize {
        self.clients.len()
    }

    fn next_node(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len()
    }

    fn client(&self) -> &Elasticsearch {
        &self.clients[self.next_node()]
    }
}

fn parse_address(address: &str) -> Result<Url, EsError> {
    let url = Url::parse(address.trim())
        .map_err(|e| EsError::connection(format!("Invalid address '{}': {}", address, e)))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(EsError::connection(format!(
            "Invalid address '{}': expected an http or https URL",
            address
        ))),
    }
}

fn build_transport(address: &str, config: &EsConfig) -> Result<Transport, EsError> {
    let url = parse_address(address)?;
    let conn_pool = SingleNodeConnectionPool::new(url);

    let mut builder = TransportBuilder::new(conn_pool).timeout(config.transport.timeout);

    if !config.username.is_empty() {
        builder = builder.auth(Credentials::Basic(
            config.username.clone(),
            config.password.clone(),
        ));
    }
    if config.transport.insecure_skip_verify {
        builder = builder.cert_validation(CertificateValidation::None);
    }
    if config.transport.disable_proxy {
        builder = builder.disable_proxy();
    }

    builder
        .build()
        .map_err(|e| EsError::connection(e.to_string()))
}

fn send_error(err: elasticsearch::Error) -> EsError {
    EsError::request(err.to_string())
}

async fn read_response(response: Response) -> Result<BackendResponse, EsError> {
    let status = response.status_code().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| EsError::response(e.to_string()))?;
    Ok(BackendResponse { status, body })
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::Get,
        HttpMethod::Put => Method::Put,
        HttpMethod::Post => Method::Post,
        HttpMethod::Delete => Method::Delete,
        HttpMethod::Head => Method::Head,
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn info(&self) -> Result<BackendResponse, EsError> {
        let response = self.client().info().send().await.map_err(send_error)?;
        read_response(response).await
    }

    async fn index(
        &self,
        index: &str,
        id: Option<&str>,
        document: Value,
    ) -> Result<BackendResponse, EsError> {
        let response = match id {
            Some(id) => {
                self.client()
                    .index(IndexParts::IndexId(index, id))
                    .body(document)
                    .send()
                    .await
            }
            None => {
                self.client()
                    .index(IndexParts::Index(index))
                    .body(document)
                    .send()
                    .await
            }
        }
        .map_err(send_error)?;

        debug!(index = %index, id = ?id, status = %response.status_code(), "Index request sent");
        read_response(response).await
    }

    async fn search(&self, params: SearchParams) -> Result<BackendResponse, EsError> {
        let indices = [params.index.as_str()];
        let sort_fields: Vec<&str> = params.sort.as_deref().into_iter().collect();

        let parts = if params.index.is_empty() {
            SearchParts::None
        } else {
            SearchParts::Index(&indices)
        };

        let mut request = self
            .client()
            .search(parts)
            .from(params.from)
            .size(params.size);
        if !sort_fields.is_empty() {
            request = request.sort(&sort_fields);
        }

        let response = request
            .body(params.body)
            .send()
            .await
            .map_err(send_error)?;

        debug!(
            index = %params.index,
            from = params.from,
            size = params.size,
            status = %response.status_code(),
            "Search request sent"
        );
        read_response(response).await
    }

    async fn delete(&self, index: &str, id: &str) -> Result<BackendResponse, EsError> {
        let response = self
            .client()
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(send_error)?;

        debug!(index = %index, id = %id, status = %response.status_code(), "Delete request sent");
        read_response(response).await
    }

    async fn delete_by_query(
        &self,
        indices: &[String],
        query: Value,
    ) -> Result<BackendResponse, EsError> {
        let indices: Vec<&str> = indices.iter().map(String::as_str).collect();

        let response = self
            .client()
            .delete_by_query(DeleteByQueryParts::Index(&indices))
            .body(query)
            .send()
            .await
            .map_err(send_error)?;

        debug!(indices = ?indices, status = %response.status_code(), "Delete by query request sent");
        read_response(response).await
    }

    async fn sql_query(&self, query: Value) -> Result<BackendResponse, EsError> {
        let response = self
            .client()
            .sql()
            .query()
            .body(query)
            .send()
            .await
            .map_err(send_error)?;

        debug!(status = %response.status_code(), "SQL query sent");
        read_response(response).await
    }

    async fn perform(&self, request: RawRequest) -> Result<BackendResponse, EsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = if request.body.is_null() {
            None
        } else {
            Some(JsonBody::new(request.body))
        };

        let response = self
            .client()
            .send(
                to_method(request.method),
                &request.path,
                headers,
                None::<&()>,
                body,
                None,
            )
            .await
            .map_err(send_error)?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = %response.status_code(),
            "Raw request sent"
        );
        read_response(response).await
    }
}
