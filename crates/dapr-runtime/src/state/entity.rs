use dapr_client::ConsistencyPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigError;

/// The state store an entity lives in, and the consistency its writes ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStoreDescriptor {
    pub name: String,
    #[serde(default)]
    pub consistency: ConsistencyPolicy,
}

impl StateStoreDescriptor {
    pub fn new(name: impl Into<String>, consistency: ConsistencyPolicy) -> Self {
        Self {
            name: name.into(),
            consistency,
        }
    }

    /// Builds a descriptor from a consistency policy name such as
    /// `strong-last-write`.
    pub fn parse(name: impl Into<String>, consistency: &str) -> Result<Self, ConfigError> {
        let consistency = consistency
            .parse::<ConsistencyPolicy>()
            .map_err(|_| ConfigError::UnknownConsistency(consistency.to_string()))?;
        Ok(Self::new(name, consistency))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Value used when the store has nothing for this field.
    pub default: Option<Value>,
}

/// # EntityDescriptor
///
/// Declares an entity's persistent fields and the store that holds them.
/// Only declared fields may be written through a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: String,
    pub store: Option<StateStoreDescriptor>,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: None,
            fields: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: StateStoreDescriptor) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn with_field_default(mut self, name: impl Into<String>, default: Value) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            default: Some(default),
        });
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// An entity whose state is managed by a
/// [`TransactionalState`](super::TransactionalState).
pub trait TransactionalEntity {
    fn descriptor() -> EntityDescriptor;
}
