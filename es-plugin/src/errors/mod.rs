//! Error types for the Elasticsearch adapter.

mod es_error;

pub use es_error::EsError;
