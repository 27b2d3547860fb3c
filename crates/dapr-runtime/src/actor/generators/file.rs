use std::sync::Arc;
use tracing::info;

use super::{compile_definition, dispatch_entry, GenerateProxy, GeneratorTarget};
use crate::actor::definition::ProxyDefinitions;
use crate::actor::descriptor::InterfaceDescriptor;
use crate::actor::instance::ActorInstance;
use crate::errors::ProxyError;

/// Compiles each definition once and keeps it in the shared registry.
pub struct FileGenerator {
    target: GeneratorTarget,
    definitions: Arc<ProxyDefinitions>,
}

impl FileGenerator {
    pub(crate) fn new(target: GeneratorTarget, definitions: Arc<ProxyDefinitions>) -> Self {
        Self {
            target,
            definitions,
        }
    }

    /// Renders the definition for `interface` as pretty JSON without
    /// registering it anywhere.
    ///
    /// `override_type` takes precedence over the interface's own actor type.
    pub fn render(
        interface: &InterfaceDescriptor,
        override_type: Option<&str>,
    ) -> Result<String, ProxyError> {
        let dapr_type = override_type
            .filter(|t| !t.is_empty())
            .or_else(|| interface.dapr_type())
            .unwrap_or_default();
        compile_definition(interface, dapr_type, dispatch_entry)?.to_json()
    }
}

impl GenerateProxy for FileGenerator {
    fn interface(&self) -> &InterfaceDescriptor {
        &self.target.interface
    }

    fn dapr_type(&self) -> &str {
        &self.target.dapr_type
    }

    fn get_proxy(&self, id: &str) -> Result<Arc<ActorInstance>, ProxyError> {
        let definition = self.definitions.get_or_insert_with(
            self.target.interface.name(),
            &self.target.dapr_type,
            || {
                let definition = self.generate_definition()?;
                self.definitions.mark_generated();
                info!(
                    "Generated proxy definition for {} ({})",
                    definition.interface, definition.dapr_type
                );
                Ok(definition)
            },
        )?;
        Ok(self.target.instantiate(id, definition))
    }
}
