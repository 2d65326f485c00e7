//! Request and response types for adapter operations.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use url::Url;

use crate::errors::EsError;

/// Page size used when a search request does not set one.
pub const DEFAULT_SEARCH_SIZE: i64 = 10;

/// Named fields for building a [`SearchRequest`] in one call.
///
/// Every `None` falls back to the request default: `from` 0, `size` 10, no sort.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Target index. Empty searches every index.
    pub index: String,
    /// Request body, e.g. `{"query": {"match_all": {}}}`.
    pub query: Value,
    /// Pagination offset.
    pub from: Option<i64>,
    /// Pagination limit.
    pub size: Option<i64>,
    /// Sort expression such as `time:desc`.
    pub sort: Option<String>,
}

/// Parameters of a search call.
///
/// Values are not validated; a negative offset is sent as given.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    index: String,
    query: Value,
    from: i64,
    size: i64,
    sort: String,
}

impl SearchRequest {
    /// Create a search request for `index` with default pagination and no sort.
    pub fn new(index: impl Into<String>, query: Value) -> Self {
        Self {
            index: index.into(),
            query,
            from: 0,
            size: DEFAULT_SEARCH_SIZE,
            sort: String::new(),
        }
    }

    /// Create a search request from named options, defaulting every `None`.
    pub fn from_options(options: SearchOptions) -> Self {
        Self {
            index: options.index,
            query: options.query,
            from: options.from.unwrap_or(0),
            size: options.size.unwrap_or(DEFAULT_SEARCH_SIZE),
            sort: options.sort.unwrap_or_default(),
        }
    }

    /// Set the pagination offset.
    pub fn with_from(mut self, from: i64) -> Self {
        self.from = from;
        self
    }

    /// Set the pagination limit.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Set the sort expression.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn query(&self) -> &Value {
        &self.query
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Assemble the options handed to the backend. Sort is left out when empty.
    pub fn to_params(&self) -> SearchParams {
        SearchParams {
            index: self.index.clone(),
            body: self.query.clone(),
            from: self.from,
            size: self.size,
            sort: if self.sort.is_empty() {
                None
            } else {
                Some(self.sort.clone())
            },
        }
    }
}

impl From<SearchOptions> for SearchRequest {
    fn from(options: SearchOptions) -> Self {
        Self::from_options(options)
    }
}

/// A search call as issued to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub index: String,
    pub body: Value,
    pub from: i64,
    pub size: i64,
    pub sort: Option<String>,
}

/// HTTP methods accepted by the raw passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
}

impl FromStr for HttpMethod {
    type Err = EsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(EsError::invalid_request(format!(
                "Unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        };
        f.write_str(name)
    }
}

/// A raw HTTP request sent through the client's transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub method: HttpMethod,
    /// Path and query relative to the node, always starting with `/`.
    pub path: String,
    pub body: Value,
}

impl RawRequest {
    /// Build a raw request from a method name and a path or absolute URL.
    ///
    /// For an absolute URL only the path and query are kept; the transport
    /// picks the node.
    pub fn new(method: &str, url: &str, body: Value) -> Result<Self, EsError> {
        let method: HttpMethod = method.parse()?;
        let path = normalize_path(url)?;
        Ok(Self { method, path, body })
    }
}

fn normalize_path(url: &str) -> Result<String, EsError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(EsError::invalid_request("URL must not be empty"));
    }

    if url.starts_with('/') {
        return Ok(url.to_string());
    }

    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => {
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            Ok(path)
        }
        Ok(_) => Err(EsError::invalid_request(format!("Invalid URL: {}", url))),
        // Relative path without the leading slash, e.g. "_cat/indices".
        Err(_) => Ok(format!("/{}", url)),
    }
}

/// Status and body of a completed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_defaults() {
        let request = SearchRequest::new("trans_log", json!({"query": {"match_all": {}}}));

        assert_eq!(request.index(), "trans_log");
        assert_eq!(request.from(), 0);
        assert_eq!(request.size(), 10);
        assert_eq!(request.sort(), "");
    }

    #[test]
    fn test_search_request_setters_touch_one_field() {
        let base = SearchRequest::new("trans_log", json!({}));

        let with_from = base.clone().with_from(20);
        assert_eq!(with_from.from(), 20);
        assert_eq!(with_from.size(), base.size());
        assert_eq!(with_from.sort(), base.sort());

        let with_size = base.clone().with_size(50);
        assert_eq!(with_size.size(), 50);
        assert_eq!(with_size.from(), base.from());

        let with_sort = base.clone().with_sort("time:desc");
        assert_eq!(with_sort.sort(), "time:desc");
        assert_eq!(with_sort.from(), base.from());
        assert_eq!(with_sort.size(), base.size());
    }

    #[test]
    fn test_search_request_chaining() {
        let request = SearchRequest::new("trans_log", json!({}))
            .with_from(5)
            .with_size(25)
            .with_sort("time:desc");

        assert_eq!(request.from(), 5);
        assert_eq!(request.size(), 25);
        assert_eq!(request.sort(), "time:desc");
    }

    #[test]
    fn test_negative_offset_is_kept() {
        let request = SearchRequest::new("trans_log", json!({})).with_from(-1);
        assert_eq!(request.to_params().from, -1);
    }

    #[test]
    fn test_search_options_defaults_match_new() {
        let from_options: SearchRequest = SearchOptions {
            index: "trans_log".to_string(),
            query: json!({"query": {"term": {"status": 1}}}),
            ..Default::default()
        }
        .into();
        let from_new = SearchRequest::new("trans_log", json!({"query": {"term": {"status": 1}}}));

        assert_eq!(from_options, from_new);
    }

    #[test]
    fn test_search_options_explicit() {
        let request = SearchRequest::from_options(SearchOptions {
            index: "trans_log".to_string(),
            query: json!({}),
            from: Some(10),
            size: Some(100),
            sort: Some("time:asc".to_string()),
        });

        assert_eq!(request.from(), 10);
        assert_eq!(request.size(), 100);
        assert_eq!(request.sort(), "time:asc");
    }

    #[test]
    fn test_params_omit_empty_sort() {
        let params = SearchRequest::new("trans_log", json!({})).to_params();
        assert!(params.sort.is_none());
    }

    #[test]
    fn test_params_include_sort_verbatim() {
        let params = SearchRequest::new("trans_log", json!({}))
            .with_sort("time:desc,_score")
            .to_params();
        assert_eq!(params.sort.as_deref(), Some("time:desc,_score"));
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" POST ".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!(matches!(
            "PATCH".parse::<HttpMethod>(),
            Err(EsError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_raw_request_keeps_path_and_query_of_absolute_url() {
        let request = RawRequest::new(
            "POST",
            "https://es-1:9200/trans_log/_search?pretty=true",
            json!({}),
        )
        .unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/trans_log/_search?pretty=true");
    }

    #[test]
    fn test_raw_request_paths() {
        let absolute = RawRequest::new("GET", "/_cat/indices", json!({})).unwrap();
        assert_eq!(absolute.path, "/_cat/indices");

        let relative = RawRequest::new("GET", "_cat/indices", json!({})).unwrap();
        assert_eq!(relative.path, "/_cat/indices");

        assert!(RawRequest::new("GET", "  ", json!({})).is_err());
    }

    #[test]
    fn test_backend_response_success() {
        assert!(BackendResponse::new(200, "").is_success());
        assert!(BackendResponse::new(201, "").is_success());
        assert!(!BackendResponse::new(404, "").is_success());
        assert!(!BackendResponse::new(500, "").is_success());
    }
}
