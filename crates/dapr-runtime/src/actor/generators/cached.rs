use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{GenerateProxy, GeneratorTarget};
use crate::actor::definition::{ProxyDefinition, ProxyDefinitions};
use crate::actor::descriptor::InterfaceDescriptor;
use crate::actor::instance::ActorInstance;
use crate::errors::ProxyError;

/// Compiles each definition once and persists it under a cache directory.
///
/// A definition found on disk is loaded instead of compiled, so a warm cache
/// survives process restarts.
pub struct CachedGenerator {
    target: GeneratorTarget,
    definitions: Arc<ProxyDefinitions>,
    cache_dir: PathBuf,
}

impl CachedGenerator {
    pub(crate) fn new(
        target: GeneratorTarget,
        definitions: Arc<ProxyDefinitions>,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            target,
            definitions,
            cache_dir,
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        cache_file(&self.cache_dir, self.target.interface.name(), &self.target.dapr_type)
    }

    fn load_or_generate(&self) -> Result<ProxyDefinition, ProxyError> {
        let path = self.cache_path();
        if path.is_file() {
            let raw = fs::read_to_string(&path).map_err(|source| ProxyError::Cache {
                path: path.clone(),
                source,
            })?;
            let cached = ProxyDefinition::from_json(&raw)?;
            if cached.describes(self.target.interface.name(), &self.target.dapr_type) {
                debug!("Loaded cached proxy definition from {:?}", path);
                return Ok(cached);
            }
            warn!(
                "Replacing stale proxy definition at {:?} (held {} ({}))",
                path, cached.interface, cached.dapr_type
            );
        }

        let definition = self.generate_definition()?;
        fs::create_dir_all(&self.cache_dir).map_err(|source| ProxyError::Cache {
            path: self.cache_dir.clone(),
            source,
        })?;
        fs::write(&path, definition.to_json()?).map_err(|source| ProxyError::Cache {
            path: path.clone(),
            source,
        })?;
        self.definitions.mark_generated();
        info!(
            "Generated proxy definition for {} ({}) at {:?}",
            definition.interface, definition.dapr_type, path
        );
        Ok(definition)
    }
}

impl GenerateProxy for CachedGenerator {
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
            || self.load_or_generate(),
        )?;
        Ok(self.target.instantiate(id, definition))
    }
}

/// `{cache_dir}/{interface}.{dapr_type}.json`, with anything outside
/// `[A-Za-z0-9_-]` replaced by `_`.
pub(crate) fn cache_file(cache_dir: &Path, interface: &str, dapr_type: &str) -> PathBuf {
    let sanitize = |part: &str| -> String {
        part.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    cache_dir.join(format!("{}.{}.json", sanitize(interface), sanitize(dapr_type)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_file_name_is_sanitized() {
        let path = cache_file(Path::new("/tmp/proxies"), "app::ICounter", "Counter v2");
        assert_eq!(path, Path::new("/tmp/proxies/app__ICounter.Counter_v2.json"));
    }
}
