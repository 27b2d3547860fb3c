//! # Proxy Definitions
//!
//! A [`ProxyDefinition`] is the compiled form of an interface: for every method,
//! whether it is forwarded to the sidecar and how. Definitions are what the
//! generated and cached strategies persist, and what the existing-only strategy
//! requires to be present already.

use dapr_client::{HttpVerb, ReturnHint};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::errors::ProxyError;

/// How a single method call is carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchEntry {
    /// Forwarded to the actor through the invocation client
    Remote {
        verb: HttpVerb,
        has_parameter: bool,
        returns: ReturnHint,
    },
    /// Only callable inside the hosted actor
    HostOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDefinition {
    pub interface: String,
    pub dapr_type: String,
    pub methods: BTreeMap<String, DispatchEntry>,
}

impl ProxyDefinition {
    pub fn new(interface: impl Into<String>, dapr_type: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            dapr_type: dapr_type.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, method: impl Into<String>, entry: DispatchEntry) -> Self {
        self.methods.insert(method.into(), entry);
        self
    }

    pub fn entry(&self, method: &str) -> Option<&DispatchEntry> {
        self.methods.get(method)
    }

    /// Whether this definition was compiled for `interface` bound to `dapr_type`.
    pub fn describes(&self, interface: &str, dapr_type: &str) -> bool {
        self.interface == interface && self.dapr_type == dapr_type
    }

    pub fn to_json(&self) -> Result<String, ProxyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProxyError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Registry of definitions shared between generators, keyed by interface name
/// and remote actor type.
///
/// Also counts how many definitions were actually generated, which is how
/// callers observe that a definition is compiled at most once per registry.
#[derive(Debug, Default)]
pub struct ProxyDefinitions {
    definitions: Mutex<HashMap<(String, String), Arc<ProxyDefinition>>>,
    generated: AtomicUsize,
}

impl ProxyDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, interface: &str, dapr_type: &str) -> Option<Arc<ProxyDefinition>> {
        let definitions = self
            .definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        definitions
            .get(&(interface.to_string(), dapr_type.to_string()))
            .cloned()
    }

    /// Registers a definition produced elsewhere, replacing any previous one
    /// for the same interface and type.
    pub fn register(&self, definition: ProxyDefinition) -> Arc<ProxyDefinition> {
        let key = (definition.interface.clone(), definition.dapr_type.clone());
        let definition = Arc::new(definition);
        self.definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, definition.clone());
        definition
    }

    /// Returns the registered definition, or builds and registers one.
    ///
    /// `build` runs under the registry lock, so concurrent callers never build
    /// the same definition twice.
    pub fn get_or_insert_with<F>(
        &self,
        interface: &str,
        dapr_type: &str,
        build: F,
    ) -> Result<Arc<ProxyDefinition>, ProxyError>
    where
        F: FnOnce() -> Result<ProxyDefinition, ProxyError>,
    {
        let mut definitions = self
            .definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let key = (interface.to_string(), dapr_type.to_string());
        if let Some(existing) = definitions.get(&key) {
            return Ok(existing.clone());
        }
        let definition = Arc::new(build()?);
        definitions.insert(key, definition.clone());
        Ok(definition)
    }

    pub fn mark_generated(&self) {
        self.generated.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of definitions compiled from descriptors by this registry.
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a definition previously written with [`ProxyDefinition::to_json`]
    /// and registers it.
    ///
    /// Returns `None` without registering anything when the file holds a
    /// definition for a different interface or type. Sanitized file names can
    /// collide, so such a file is a stale entry rather than a match.
    pub fn load_file(
        &self,
        path: &Path,
        interface: &str,
        dapr_type: &str,
    ) -> Result<Option<Arc<ProxyDefinition>>, ProxyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ProxyError::Cache {
            path: path.to_path_buf(),
            source,
        })?;
        let definition = ProxyDefinition::from_json(&raw)?;
        if !definition.describes(interface, dapr_type) {
            warn!(
                "Ignoring proxy definition at {:?}: holds {} ({}), wanted {} ({})",
                path, definition.interface, definition.dapr_type, interface, dapr_type
            );
            return Ok(None);
        }
        debug!(
            "Loaded proxy definition for {} ({}) from {:?}",
            interface, dapr_type, path
        );
        Ok(Some(self.register(definition)))
    }
}
