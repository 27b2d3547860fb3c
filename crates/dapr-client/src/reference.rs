use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one actor instance hosted by the sidecar.
///
/// Every remote actor operation is routed by this pair; it is never mutated
/// once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorReference {
    actor_type: String,
    actor_id: String,
}

impl ActorReference {
    pub fn new(actor_type: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
        }
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Base path of this actor on the sidecar's actor API.
    pub fn base_path(&self) -> String {
        format!("/v1.0/actors/{}/{}", self.actor_type, self.actor_id)
    }
}

impl fmt::Display for ActorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.actor_type, self.actor_id)
    }
}
