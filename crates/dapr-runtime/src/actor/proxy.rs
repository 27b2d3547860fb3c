use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error};

use super::descriptor::{ActorInterface, InterfaceDescriptor};
use super::factory::ProxyFactory;
use super::instance::ActorInstance;
use crate::errors::ProxyError;

/// # ActorProxy
///
/// Registry of actor proxies, one per remote actor type and id.
///
/// ## Purpose
///
/// Callers ask for an actor by interface and id and always get the same
/// [`ActorInstance`] back for the same `(type, id)` pair. Proxies are never
/// evicted. The lookup and the insert happen under one lock, so concurrent
/// callers never build two proxies for the same key.
pub struct ActorProxy {
    factory: ProxyFactory,
    actors: Mutex<HashMap<String, Arc<ActorInstance>>>,
}

impl ActorProxy {
    pub fn new(factory: ProxyFactory) -> Self {
        Self {
            factory,
            actors: Mutex::new(HashMap::new()),
        }
    }

    pub fn factory(&self) -> &ProxyFactory {
        &self.factory
    }

    /// Returns the proxy for actor `id` of `interface`.
    ///
    /// `override_type` replaces the interface's declared remote type.
    pub fn get(
        &self,
        interface: &InterfaceDescriptor,
        id: &str,
        override_type: Option<&str>,
    ) -> Result<Arc<ActorInstance>, ProxyError> {
        let dapr_type = match override_type
            .filter(|t| !t.is_empty())
            .or_else(|| interface.dapr_type())
        {
            Some(dapr_type) => dapr_type.to_string(),
            None => {
                error!("{} must declare its remote actor type", interface.name());
                return Err(ProxyError::MissingDaprType {
                    interface: interface.name().to_string(),
                });
            }
        };

        let key = format!("{}-{}", dapr_type, id);
        let mut actors = self.actors.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(actor) = actors.get(&key) {
            return Ok(actor.clone());
        }

        debug!("Creating proxy {} for {}", key, interface.name());
        let generator = self
            .factory
            .get_generator(Arc::new(interface.clone()), &dapr_type);
        let actor = generator.get_proxy(id)?;
        actors.insert(key, actor.clone());
        Ok(actor)
    }

    /// Typed form of [`get`](Self::get) for interfaces declared with
    /// [`actor_interface!`](crate::actor_interface).
    pub fn get_typed<I: ActorInterface>(
        &self,
        id: &str,
        override_type: Option<&str>,
    ) -> Result<I, ProxyError> {
        let instance = self.get(&I::descriptor(), id, override_type)?;
        Ok(I::from_instance(instance))
    }

    pub fn len(&self) -> usize {
        self.actors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
