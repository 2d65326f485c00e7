//! Interface definitions for the search backend.
//!
//! This module defines the `SearchBackend` trait that sits between the
//! wrapper operations and the client library.

mod search_backend;

pub use search_backend::SearchBackend;
