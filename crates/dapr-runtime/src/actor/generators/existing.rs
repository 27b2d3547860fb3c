use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use super::cached::cache_file;
use super::{GenerateProxy, GeneratorTarget};
use crate::actor::definition::{DispatchEntry, ProxyDefinitions};
use crate::actor::descriptor::{InterfaceDescriptor, MethodDescriptor};
use crate::actor::instance::ActorInstance;
use crate::errors::ProxyError;

/// Hands out proxies only for definitions that already exist.
///
/// A definition exists when it is registered, or when a cache directory is
/// configured and holds a file for it. Nothing is ever compiled.
pub struct ExistingOnlyGenerator {
    target: GeneratorTarget,
    definitions: Arc<ProxyDefinitions>,
    cache_dir: Option<PathBuf>,
}

impl ExistingOnlyGenerator {
    pub(crate) fn new(
        target: GeneratorTarget,
        definitions: Arc<ProxyDefinitions>,
        cache_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            target,
            definitions,
            cache_dir,
        }
    }
}

impl GenerateProxy for ExistingOnlyGenerator {
    fn interface(&self) -> &InterfaceDescriptor {
        &self.target.interface
    }

    fn dapr_type(&self) -> &str {
        &self.target.dapr_type
    }

    fn generate_method(&self, method: &MethodDescriptor) -> Result<DispatchEntry, ProxyError> {
        Err(ProxyError::GenerationRefused {
            method: method.name.clone(),
        })
    }

    fn get_proxy(&self, id: &str) -> Result<Arc<ActorInstance>, ProxyError> {
        let interface = self.target.interface.name();
        let dapr_type = &self.target.dapr_type;

        if let Some(definition) = self.definitions.get(interface, dapr_type) {
            return Ok(self.target.instantiate(id, definition));
        }

        if let Some(cache_dir) = &self.cache_dir {
            let path = cache_file(cache_dir, interface, dapr_type);
            if path.is_file() {
                if let Some(definition) =
                    self.definitions.load_file(&path, interface, dapr_type)?
                {
                    return Ok(self.target.instantiate(id, definition));
                }
            }
        }

        error!("No existing proxy for {} ({})", interface, dapr_type);
        Err(ProxyError::NoExistingProxy {
            interface: interface.to_string(),
            dapr_type: dapr_type.to_string(),
        })
    }
}
