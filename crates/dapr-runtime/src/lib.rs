//! # Dapr Runtime
//!
//! Client-side runtime for virtual actors and their durable state, hosted by a
//! Dapr sidecar.
//!
//! ## Core Features
//!
//! * **Actor Proxies**: Turn an interface description into a stub whose methods
//!   become remote actor invocations
//! * **Proxy Strategies**: Dynamic, generated, generated-and-cached, or
//!   existing-only proxy definitions, selected by configuration
//! * **Proxy Identity**: One proxy per actor type and id for the life of the
//!   registry
//! * **Transactional State**: A read/write cache over an entity's durable
//!   state, committed as a single etag-checked transaction
//!
//! ## Architecture
//!
//! * `ActorProxy`: Entry point that resolves an interface to a cached proxy
//! * `ProxyFactory`: Picks the generation strategy for the configured mode
//! * `ActorInstance`: A proxy; dispatches calls through its definition's table
//! * `TransactionalState`: begin, get/set/has/unset, commit
//!
//! Transport lives in the `dapr-client` crate; everything here only depends on
//! its `InvocationClient` trait.

pub mod actor;
pub mod config;
pub mod errors;
pub mod logging;
mod macros;
pub mod state;

pub use actor::{
    ActorInstance, ActorInterface, ActorProxy, DispatchEntry, GenerateProxy, InterfaceDescriptor,
    MethodDescriptor, Parameter, ProxyDefinition, ProxyDefinitions, ProxyFactory, ProxyMode,
    ReturnType, VerbHint,
};
pub use config::{ActorsConfig, ClientConfig, LogOutput, LoggingConfig, RuntimeConfig};
pub use errors::{CacheError, ConfigError, ProxyError, StateError};
pub use state::{
    CacheLookup, EntityCache, EntityDescriptor, FieldDescriptor, StateStoreDescriptor, Transaction,
    TransactionalEntity, TransactionalState,
};

pub use dapr_client::{
    ActorReference, ConsistencyPolicy, DaprClientBuilder, HttpInvocationClient, HttpVerb,
    InvocationClient, Metadata,
};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
