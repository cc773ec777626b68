//! HTTP Gateway
//!
//! Translates HTTP requests into calls against the storage service and
//! renders the replies as JSON.
//!
//! - **`backend`**: The `KvBackend` seam and its gRPC implementation.
//! - **`error`**: Request and backend failures mapped to HTTP responses.
//! - **`handlers`**: Axum handlers for the public routes.
//! - **`protocol`**: Route paths and the JSON bodies exchanged with clients.

pub mod backend;
pub mod error;
pub mod handlers;
pub mod protocol;

use axum::Router;
use axum::routing::{delete, get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub use backend::{KvBackend, RpcBackend};
pub use error::GatewayError;

use crate::error::Result;

/// Shared handle the handlers extract from the router state
pub type SharedBackend = Arc<dyn KvBackend>;

/// Build the axum router with all gateway endpoints.
pub fn build_router(backend: SharedBackend) -> Router {
    Router::new()
        .route(protocol::ENDPOINT_TEST, get(handlers::handle_test))
        .route(
            &format!("{}/:key", protocol::ENDPOINT_GET),
            get(handlers::handle_get),
        )
        .route(protocol::ENDPOINT_SET, post(handlers::handle_set))
        .route(
            &format!("{}/:key", protocol::ENDPOINT_DELETE),
            delete(handlers::handle_delete),
        )
        .with_state(backend)
}

/// HTTP gateway server
pub struct Gateway {
    listener: TcpListener,
    local_addr: SocketAddr,
    backend: SharedBackend,
}

impl Gateway {
    /// Bind the HTTP listener
    pub async fn bind(addr: &str, backend: SharedBackend) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP gateway bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            backend,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until the process exits
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        info!("HTTP gateway listening on {}", self.local_addr);
        axum::serve(self.listener, build_router(self.backend))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
