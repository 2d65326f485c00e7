//! Elasticsearch implementation of the search backend.
//!
//! This module provides the concrete `SearchBackend` built on the
//! `elasticsearch` client crate.

mod backend;

pub use backend::ElasticsearchBackend;
