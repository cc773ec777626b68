//! Gateway HTTP Protocol
//!
//! Route paths and the JSON bodies the gateway accepts and returns. Field
//! names match what existing clients of the service already parse.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Read a key: `GET /getValue/:key`
pub const ENDPOINT_GET: &str = "/getValue";
/// Write a key: `POST /setValue`
pub const ENDPOINT_SET: &str = "/setValue";
/// Remove a key: `DELETE /deleteValue/:key`
pub const ENDPOINT_DELETE: &str = "/deleteValue";
/// Connectivity probe against the storage service
pub const ENDPOINT_TEST: &str = "/test";

// --- Data Transfer Objects ---

/// Body of `POST /setValue`.
///
/// Both fields are optional at the serde level so that a missing field is
/// reported as a 400 by the handler rather than by the extractor.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct GetValueResponse {
    pub message: String,
    pub key: String,
    /// Empty when the key is absent
    pub value: String,
    pub found: bool,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SetValueResponse {
    pub message: String,
    pub key: String,
    pub value: String,
    /// Human-readable result from the storage service
    pub response: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteValueResponse {
    pub message: String,
    pub key: String,
    pub response: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
