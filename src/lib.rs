//! kvstore: an in-memory key-value store served over gRPC, with an HTTP
//! gateway in front of it.
//!
//! - **`store`**: The core map and its reader-writer lock discipline.
//! - **`server`**: The gRPC storage service wrapping a shared `Store`.
//! - **`gateway`**: The HTTP-to-gRPC gateway.
//! - **`config`**: TOML configuration with environment overrides.
//! - **`logging`**: `tracing` subscriber setup.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{DeleteOutcome, SetOutcome, Store};

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("kvstore");
}
