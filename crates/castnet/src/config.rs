//! Connection and engine configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration for the search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Auth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Connection configuration for the search engine transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Engine node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<Auth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// Behavioral configuration for the engine and indexing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Documents per bulk request and per import chunk (default: 100).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Whether the first write batch for each entity type refreshes the
    /// type's mapping before indexing (default: false).
    #[serde(default)]
    pub update_mapping: bool,
}

fn default_chunk_size() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            update_mapping: false,
        }
    }
}
