use dapr_client::{ActorReference, ActorStateOperation, InvocationClient};
use serde_json::Value;
use tracing::debug;

use crate::errors::StateError;

/// # Transaction
///
/// Ordered log of pending state operations.
///
/// Entries are never merged: writing a key twice logs two upserts. Once
/// closed, the log accepts nothing more.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    operations: Vec<ActorStateOperation>,
    closed: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, key: impl Into<String>, value: Value) -> Result<(), StateError> {
        self.ensure_open()?;
        self.operations.push(ActorStateOperation::upsert(key, value));
        Ok(())
    }

    pub fn delete(&mut self, key: impl Into<String>) -> Result<(), StateError> {
        self.ensure_open()?;
        self.operations.push(ActorStateOperation::delete(key));
        Ok(())
    }

    /// Closes the log. Closing happens even when nothing was logged.
    pub fn close(&mut self) -> Result<(), StateError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn operations(&self) -> &[ActorStateOperation] {
        &self.operations
    }

    /// Closes the log and saves it as one actor state batch.
    ///
    /// An empty log closes without calling the sidecar.
    pub async fn commit_to_actor(
        &mut self,
        client: &dyn InvocationClient,
        actor: &ActorReference,
    ) -> Result<bool, StateError> {
        self.close()?;
        if self.operations.is_empty() {
            debug!("Nothing to save for {}", actor);
            return Ok(true);
        }
        debug!("Saving {} state operations for {}", self.operations.len(), actor);
        Ok(client.save_actor_state(actor, &self.operations).await?)
    }

    fn ensure_open(&self) -> Result<(), StateError> {
        if self.closed {
            Err(StateError::AlreadyCommitted)
        } else {
            Ok(())
        }
    }
}
