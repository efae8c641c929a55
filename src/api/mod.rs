//! HTTP API Module
//!
//! Provides the REST gateway for container management.

mod http;

pub use http::{create_router, AppState, ConfigResponse, HttpServer};
