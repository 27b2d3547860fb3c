//! # Errors
//!
//! Error types for proxy generation, transactional state, the entity cache and
//! configuration.
//!
//! Configuration and usage errors are fatal and never retried. Remote failures
//! arrive wrapped in [`ClientError`] exactly as the transport reported them.

use dapr_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating or calling an actor proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The interface has no remote actor type and none was supplied
    #[error("{interface} must declare its remote actor type")]
    MissingDaprType { interface: String },

    /// A method takes its parameter by reference, which cannot cross processes
    #[error("Cannot pass references between actors/methods (method: {method})")]
    PassByReference { method: String },

    /// A lifecycle method that only exists inside the hosted actor was called
    #[error("Cannot call {method} outside the actor")]
    NotActorContext { method: String },

    #[error("Unknown actor method: {method}")]
    UnknownMethod { method: String },

    /// Existing-only mode found no definition to instantiate
    #[error("No existing proxy for {interface} ({dapr_type})")]
    NoExistingProxy { interface: String, dapr_type: String },

    /// Existing-only mode was asked to generate a method body
    #[error("Refusing to generate {method}: only existing proxies may be used")]
    GenerationRefused { method: String },

    #[error("Proxy cache error at {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a transactional state session.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("State already committed")]
    AlreadyCommitted,

    #[error("{field} is not defined on {entity} and will not be stored")]
    UnknownField { field: String, entity: String },

    #[error("Transaction has not begun")]
    NotBegun,

    #[error("Transaction has already begun")]
    AlreadyBegun,

    #[error("{entity} does not declare a state store")]
    MissingStateStore { entity: String },

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid proxy mode: {0} (must be a supported mode)")]
    InvalidProxyMode(String),

    #[error("Unknown consistency policy: {0}")]
    UnknownConsistency(String),
}
