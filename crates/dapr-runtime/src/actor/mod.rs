//! # Actor Proxies
//!
//! Everything needed to call a remote actor as if it were a local object.
//!
//! An interface is described once by an [`InterfaceDescriptor`]. A generator
//! compiles that description into a [`ProxyDefinition`], a dispatch table from
//! method name to verb, parameter shape and return hint. An [`ActorInstance`]
//! pairs a definition with an actor id and forwards every call through the
//! shared [`InvocationClient`](dapr_client::InvocationClient).

pub mod definition;
pub mod descriptor;
pub mod factory;
pub mod generators;
pub mod instance;
pub mod proxy;

pub use definition::{DispatchEntry, ProxyDefinition, ProxyDefinitions};
pub use descriptor::{
    ActorInterface, InterfaceDescriptor, MethodDescriptor, Parameter, ReturnType, VerbHint,
};
pub use factory::{ProxyFactory, ProxyMode};
pub use generators::GenerateProxy;
pub use instance::ActorInstance;
pub use proxy::ActorProxy;
