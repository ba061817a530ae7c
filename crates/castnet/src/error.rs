//! Error types for the driver.
//!
//! Errors are split into two categories: configuration problems detected
//! before any engine call is issued, and failures reported by (or on the way
//! to) the search engine itself. [`EngineError`] is the umbrella type
//! returned by every fallible driver operation.

use thiserror::Error;

/// The primary error type for all driver operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A collaborator is missing a required capability or is misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The search engine rejected or failed to answer a request.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors detected before any request is sent to the engine.
///
/// A configuration error always aborts the operation before any mutation.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The index configurator has no write alias and cannot take part in a
    /// migration.
    #[error("index configurator '{configurator}' has no write alias and cannot be migrated")]
    NotMigratable { configurator: String },

    /// An entity type named by an index configurator has no registered
    /// entity.
    #[error("unknown entity type: {type_name}")]
    UnknownEntityType { type_name: String },

    /// A node URL in the connection configuration could not be parsed.
    #[error("invalid node url '{url}': {message}")]
    InvalidNodeUrl { url: String, message: String },

    /// The connection transport could not be constructed.
    #[error("failed to build transport: {message}")]
    TransportSetup { message: String },
}

/// Errors reported by the search engine or its transport.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("transport failure during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// The engine answered with a non-success status.
    #[error("{operation} returned status {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    /// A bulk request succeeded at the transport level but reported
    /// per-operation failures.
    #[error("bulk request reported {failed} failed operations on index '{index}'")]
    BulkRejections { index: String, failed: usize },

    /// Serialization of a request body failed.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Result type alias for driver operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Client(err.into())
    }
}
