use std::sync::Arc;
use tracing::debug;

use super::{GenerateProxy, GeneratorTarget};
use crate::actor::descriptor::InterfaceDescriptor;
use crate::actor::instance::ActorInstance;
use crate::errors::ProxyError;

/// Compiles a fresh definition for every proxy it hands out.
pub struct DynamicGenerator {
    target: GeneratorTarget,
}

impl DynamicGenerator {
    pub(crate) fn new(target: GeneratorTarget) -> Self {
        Self { target }
    }
}

impl GenerateProxy for DynamicGenerator {
    fn interface(&self) -> &InterfaceDescriptor {
        &self.target.interface
    }

    fn dapr_type(&self) -> &str {
        &self.target.dapr_type
    }

    fn get_proxy(&self, id: &str) -> Result<Arc<ActorInstance>, ProxyError> {
        debug!(
            "Building dynamic proxy for {} ({}/{})",
            self.target.interface.name(),
            self.target.dapr_type,
            id
        );
        let definition = Arc::new(self.generate_definition()?);
        Ok(self.target.instantiate(id, definition))
    }
}
