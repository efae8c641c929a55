//! HTTP API Server
//!
//! Container management routes. Each handler performs at most one storage
//! call and shapes its result into plain HTML text or JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::TryStreamExt;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{ApiConfig, CONNECTION_STRING_ENV};
use crate::error::{Error, Result};
use crate::storage::{ContainerName, StorageClient};

/// Shared application state
pub struct AppState {
    /// Storage client handle, constructed once at startup
    pub storage: Arc<dyn StorageClient>,
    /// Raw connection string, as configured
    pub connection_string: Option<String>,
    /// Serve the connection string on /api/config
    pub expose_connection_string: bool,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageClient>, connection_string: Option<String>) -> Self {
        Self {
            storage,
            connection_string,
            expose_connection_string: true,
        }
    }
}

/// HTTP API server
pub struct HttpServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(
        config: ApiConfig,
        storage: Arc<dyn StorageClient>,
        connection_string: Option<String>,
    ) -> Self {
        let state = Arc::new(AppState {
            storage,
            connection_string,
            expose_connection_string: config.expose_connection_string,
        });

        Self { config, state }
    }

    /// Build the router for this server's configuration
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state), self.config.cors_enabled)
    }

    /// Start the HTTP server and run until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address).await?;
        let port = listener.local_addr()?.port();
        tracing::info!("Server running on port {}", port);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Network(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route("/", get(handle_account))
        .route("/createContainer/:container_name", get(handle_create_container))
        .route("/deleteContainer/:container_name", get(handle_delete_container))
        .route("/listContainers", get(handle_list_containers))
        .route("/api/config", get(handle_config))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

// ============ Response Types ============

/// Configuration echo
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    #[serde(
        rename = "AZURE_STORAGE_CONNECTION_STRING",
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_string: Option<String>,
}

// ============ Handlers ============

/// Account metadata followed by one line per container
async fn handle_account(State(state): State<Arc<AppState>>) -> Response {
    let account = state.storage.account();
    let mut output = format!("Account Name: {}<br>", account.name);
    output.push_str(&format!("Blob Service Client URL: {}<br>", account.url));
    output.push_str(&format!("Is it HTTPS?: {}<br>", account.is_https));

    let names = match collect_container_names(state.storage.as_ref()).await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!("Failed to list containers: {}", e);
            return internal_error("An error occurred while listing containers");
        }
    };

    for (i, name) in names.iter().enumerate() {
        output.push_str(&format!("Container {}: {}<br>", i + 1, name));
    }

    Html(output).into_response()
}

async fn handle_create_container(
    State(state): State<Arc<AppState>>,
    Path(container_name): Path<String>,
) -> Response {
    match create_container(state.storage.as_ref(), &container_name).await {
        Ok(name) => {
            tracing::info!("Container {} created", name);
            Html(format!("Container {} created", name)).into_response()
        }
        Err(e) if e.is_client_error() => {
            (StatusCode::BAD_REQUEST, Html("Invalid container name")).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create container {}: {}", container_name, e);
            internal_error("An error occurred while creating the container")
        }
    }
}

async fn handle_delete_container(
    State(state): State<Arc<AppState>>,
    Path(container_name): Path<String>,
) -> Response {
    match state.storage.delete_container(&container_name).await {
        Ok(()) => {
            tracing::info!("Container {} deleted", container_name);
            Html(format!("Container {} deleted", container_name)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to delete container {}: {}", container_name, e);
            internal_error("An error occurred while deleting the container")
        }
    }
}

async fn handle_list_containers(State(state): State<Arc<AppState>>) -> Response {
    match collect_container_names(state.storage.as_ref()).await {
        Ok(names) => Json(names).into_response(),
        Err(e) => {
            tracing::error!("Failed to list containers: {}", e);
            internal_error("An error occurred while listing containers")
        }
    }
}

async fn handle_config(State(state): State<Arc<AppState>>) -> Response {
    if !state.expose_connection_string {
        return (StatusCode::FORBIDDEN, Html("Configuration endpoint disabled")).into_response();
    }

    tracing::debug!("Serving {} to caller", CONNECTION_STRING_ENV);
    Json(ConfigResponse {
        connection_string: state.connection_string.clone(),
    })
    .into_response()
}

// ============ Helpers ============

/// Validate the raw path segment, then ask storage to create it
async fn create_container(storage: &dyn StorageClient, raw: &str) -> Result<ContainerName> {
    let name: ContainerName = raw.parse()?;
    storage.create_container(&name).await?;
    Ok(name)
}

/// Drain a fresh container enumeration into its names, in service order
async fn collect_container_names(storage: &dyn StorageClient) -> Result<Vec<String>> {
    storage
        .list_containers()
        .map_ok(|container| container.name)
        .try_collect()
        .await
}

fn internal_error(message: &'static str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(message)).into_response()
}
