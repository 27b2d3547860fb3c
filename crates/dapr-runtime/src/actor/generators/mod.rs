//! # Proxy Generators
//!
//! One generator per proxy strategy. Each turns an interface descriptor and a
//! remote actor type into [`ActorInstance`]s; they differ only in where the
//! compiled [`ProxyDefinition`] comes from.
//!
//! * [`DynamicGenerator`]: compiles the definition on every request
//! * [`FileGenerator`]: compiles once per registry
//! * [`CachedGenerator`]: compiles once and persists the result to disk
//! * [`ExistingOnlyGenerator`]: never compiles; the definition must exist

mod cached;
mod dynamic;
mod existing;
mod file;

pub use cached::CachedGenerator;
pub use dynamic::DynamicGenerator;
pub use existing::ExistingOnlyGenerator;
pub use file::FileGenerator;

use dapr_client::InvocationClient;
use std::sync::Arc;

use super::definition::{DispatchEntry, ProxyDefinition};
use super::descriptor::{InterfaceDescriptor, MethodDescriptor, Parameter};
use super::instance::ActorInstance;
use crate::errors::ProxyError;

/// A strategy for producing proxies of one interface bound to one remote
/// actor type.
pub trait GenerateProxy: Send + Sync {
    fn interface(&self) -> &InterfaceDescriptor;

    fn dapr_type(&self) -> &str;

    /// Returns a proxy for the actor with the given id.
    fn get_proxy(&self, id: &str) -> Result<Arc<ActorInstance>, ProxyError>;

    /// Compiles a single method into its dispatch entry.
    fn generate_method(&self, method: &MethodDescriptor) -> Result<DispatchEntry, ProxyError> {
        dispatch_entry(method)
    }

    /// Compiles the whole interface.
    fn generate_definition(&self) -> Result<ProxyDefinition, ProxyError> {
        compile_definition(self.interface(), self.dapr_type(), |method| {
            self.generate_method(method)
        })
    }
}

/// State every generator carries: what to generate, for which actor type, and
/// the client the resulting proxies call through.
#[derive(Clone)]
pub(crate) struct GeneratorTarget {
    pub interface: Arc<InterfaceDescriptor>,
    pub dapr_type: String,
    pub client: Arc<dyn InvocationClient>,
}

impl GeneratorTarget {
    pub fn instantiate(&self, id: &str, definition: Arc<ProxyDefinition>) -> Arc<ActorInstance> {
        Arc::new(ActorInstance::new(id, definition, self.client.clone()))
    }
}

pub(crate) fn dispatch_entry(method: &MethodDescriptor) -> Result<DispatchEntry, ProxyError> {
    if method.host_only {
        return Ok(DispatchEntry::HostOnly);
    }
    let has_parameter = match &method.parameter {
        Parameter::ByReference(_) => {
            return Err(ProxyError::PassByReference {
                method: method.name.clone(),
            })
        }
        Parameter::ByValue(_) => true,
        Parameter::None => false,
    };
    Ok(DispatchEntry::Remote {
        verb: method.verb.resolve(has_parameter),
        has_parameter,
        returns: method.returns.to_hint(),
    })
}

pub(crate) fn compile_definition<F>(
    interface: &InterfaceDescriptor,
    dapr_type: &str,
    mut generate_method: F,
) -> Result<ProxyDefinition, ProxyError>
where
    F: FnMut(&MethodDescriptor) -> Result<DispatchEntry, ProxyError>,
{
    if dapr_type.is_empty() {
        return Err(ProxyError::MissingDaprType {
            interface: interface.name().to_string(),
        });
    }
    let mut definition = ProxyDefinition::new(interface.name(), dapr_type);
    for method in interface.methods() {
        let entry = generate_method(method)?;
        definition.methods.insert(method.name.clone(), entry);
    }
    Ok(definition)
}
