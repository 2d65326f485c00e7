//! # es-plugin
//!
//! Thin adapter over the Elasticsearch client library. It builds a configured
//! transport and exposes index, search, delete, delete-by-query, SQL and raw
//! HTTP passthrough through [`EsClient`], returning response bodies as
//! received.
//!
//! ```ignore
//! let config = EsConfig::from_env()?;
//! let client = EsClient::connect(&config)?;
//! client.index(&config.indices.trans_log, &log).await?;
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod es;
pub mod interfaces;
pub mod types;

pub use client::EsClient;
pub use config::{EsConfig, IndexNames, TransportSettings, DEFAULT_TRANS_LOG_INDEX};
pub use errors::EsError;
pub use es::ElasticsearchBackend;
pub use interfaces::SearchBackend;
pub use types::{BackendResponse, HttpMethod, RawRequest, SearchOptions, SearchParams, SearchRequest};
