//! # Dapr Client
//!
//! This crate talks to a Dapr sidecar over HTTP. It covers the surface the
//! actor runtime needs: invoking actor methods, reading and saving actor state,
//! reminders and timers, bulk state reads and state transactions.
//!
//! Everything above the transport depends only on the [`InvocationClient`]
//! trait, so the proxy and state layers can be exercised against a recording
//! mock instead of a live sidecar.

mod builder;
mod consistency;
mod error;
mod http;
mod reference;
mod types;

pub use builder::{DaprClientBuilder, DEFAULT_DAPR_PORT};
pub use consistency::ConsistencyPolicy;
pub use error::ClientError;
pub use http::HttpInvocationClient;
pub use reference::ActorReference;
pub use types::{
    ActorStateOperation, ActorStateRequest, BulkStateItem, HttpVerb, Metadata, Reminder,
    ReturnHint, StateItem, StateOperationKind, Timer, TransactionRequest,
};

use async_trait::async_trait;
use serde_json::Value;

/// # InvocationClient
///
/// The collaborator every proxy and transactional state session talks through.
///
/// Implementations hold no per-actor state. Each method maps onto exactly one
/// request against the sidecar; nothing is retried.
#[async_trait]
pub trait InvocationClient: Send + Sync {
    /// Invokes `method` on `actor` with the given verb.
    ///
    /// `parameter` is sent as the JSON body for POST and PUT. The result is the
    /// decoded response body, or `Value::Null` when `returns` is
    /// [`ReturnHint::Void`] or the body is empty.
    async fn invoke_actor_method(
        &self,
        verb: HttpVerb,
        actor: &ActorReference,
        method: &str,
        parameter: Option<Value>,
        returns: &ReturnHint,
    ) -> Result<Value, ClientError>;

    /// Saves a batch of actor state operations. Returns true on HTTP 204.
    async fn save_actor_state(
        &self,
        actor: &ActorReference,
        operations: &[ActorStateOperation],
    ) -> Result<bool, ClientError>;

    /// Reads one actor state key. A missing key is [`ClientError::KeyNotFound`].
    async fn get_actor_state(&self, actor: &ActorReference, key: &str)
        -> Result<Value, ClientError>;

    async fn create_actor_reminder(
        &self,
        actor: &ActorReference,
        reminder: &Reminder,
    ) -> Result<bool, ClientError>;

    async fn get_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<Option<Reminder>, ClientError>;

    async fn delete_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError>;

    async fn create_actor_timer(
        &self,
        actor: &ActorReference,
        timer: &Timer,
    ) -> Result<bool, ClientError>;

    async fn delete_actor_timer(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError>;

    /// Reads several keys from a state store in one request.
    ///
    /// `parallelism` is forwarded to the sidecar as a hint.
    async fn get_bulk_state(
        &self,
        store_name: &str,
        keys: &[String],
        parallelism: u32,
        metadata: &Metadata,
    ) -> Result<Vec<BulkStateItem>, ClientError>;

    /// Executes all `operations` against `store_name` as a single transaction.
    async fn execute_state_transaction(
        &self,
        store_name: &str,
        operations: &[TransactionRequest],
        metadata: &Metadata,
    ) -> Result<(), ClientError>;
}
