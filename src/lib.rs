//! BlobGate - HTTP Gateway for Azure Blob Storage Containers
//!
//! A small Rust service that exposes container management for an Azure
//! Storage account over plain HTTP GET routes.
//!
//! # Architecture
//!
//! One HTTP gateway (axum) holds a single storage client handle, built once
//! at startup from the connection string, and shares it with every request
//! handler. Handlers are stateless: each validates its input, makes one
//! storage call and shapes the result as HTML text or JSON.
//!
//! # Features
//!
//! - Account metadata and container listing
//! - Container creation with name validation
//! - Container deletion
//! - Permissive CORS and per-request tracing
//! - In-memory backend for local development

pub mod api;
pub mod config;
pub mod error;
pub mod storage;

pub use config::GatewayConfig;
pub use error::{Error, Result};
