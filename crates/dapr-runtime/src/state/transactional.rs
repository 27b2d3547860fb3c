use dapr_client::{
    ActorStateOperation, InvocationClient, Metadata, StateOperationKind, TransactionRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::cache::{CacheLookup, EntityCache};
use super::entity::{EntityDescriptor, StateStoreDescriptor, TransactionalEntity};
use super::transaction::Transaction;
use crate::errors::StateError;

/// State that only exists between `begin` and the end of the session.
#[derive(Debug)]
struct Session {
    cache: EntityCache,
    transaction: Transaction,
    /// Etags recorded at load, keyed by the full (prefixed) store key.
    etags: HashMap<String, String>,
    key_prefix: String,
}

impl Session {
    fn store_key(&self, field: &str) -> String {
        format!("{}{}", self.key_prefix, field)
    }
}

/// # TransactionalState
///
/// Transactional view over one entity's fields in a state store.
///
/// ## Purpose
///
/// `begin` loads every declared field in one bulk read and remembers the etag
/// of each. Reads and writes then go through a local cache, so a session always
/// sees its own writes, while every write is appended to a log. `commit` sends
/// the whole log as a single state transaction, each operation carrying the
/// etag its key had at load time. A state is good for exactly one
/// begin/commit cycle.
pub struct TransactionalState {
    descriptor: EntityDescriptor,
    client: Arc<dyn InvocationClient>,
    session: Option<Session>,
}

impl TransactionalState {
    pub fn new(descriptor: EntityDescriptor, client: Arc<dyn InvocationClient>) -> Self {
        Self {
            descriptor,
            client,
            session: None,
        }
    }

    pub fn for_entity<E: TransactionalEntity>(client: Arc<dyn InvocationClient>) -> Self {
        Self::new(E::descriptor(), client)
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    /// Loads the entity's declared fields and opens the transaction.
    ///
    /// `parallelism` is a hint for the sidecar's bulk read; `key_prefix` is
    /// prepended to every field name to form its store key.
    pub async fn begin(
        &mut self,
        parallelism: u32,
        metadata: Option<Metadata>,
        key_prefix: &str,
    ) -> Result<(), StateError> {
        if self.session.is_some() {
            return Err(StateError::AlreadyBegun);
        }
        let store = self.store()?.clone();

        let mut session = Session {
            cache: EntityCache::new(self.descriptor.name.clone()),
            transaction: Transaction::new(),
            etags: HashMap::new(),
            key_prefix: key_prefix.to_string(),
        };

        let keys: Vec<String> = self
            .descriptor
            .fields
            .iter()
            .map(|field| session.store_key(&field.name))
            .collect();

        let mut loaded = HashMap::new();
        if !keys.is_empty() {
            let items = self
                .client
                .get_bulk_state(
                    &store.name,
                    &keys,
                    parallelism,
                    &metadata.unwrap_or_default(),
                )
                .await?;
            for item in items {
                if let Some(message) = &item.error {
                    warn!("Failed to load {} from {}: {}", item.key, store.name, message);
                }
                if let Some(etag) = item.etag.as_ref().filter(|etag| !etag.is_empty()) {
                    session.etags.insert(item.key.clone(), etag.clone());
                }
                if let Some(data) = item.data {
                    loaded.insert(item.key, data);
                }
            }
        }

        for field in &self.descriptor.fields {
            match loaded.remove(&session.store_key(&field.name)) {
                Some(value) => session.cache.set_key(field.name.clone(), value),
                None => match &field.default {
                    Some(default) => session.cache.set_key(field.name.clone(), default.clone()),
                    None => session.cache.mark_absent(field.name.clone()),
                },
            }
        }

        debug!(
            "Began transaction for {} with {} fields from {}",
            self.descriptor.name,
            keys.len(),
            store.name
        );
        self.session = Some(session);
        Ok(())
    }

    /// Returns the current value of `key`, or `None` when it has no value.
    ///
    /// A stored `null` is returned as `Some(Value::Null)`.
    pub fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        let session = self.session()?;
        Ok(match session.cache.lookup(key) {
            CacheLookup::Present(value) => Some(value.clone()),
            CacheLookup::Absent | CacheLookup::NotLoaded => None,
        })
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Writes `value` to a declared field.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        let entity = self.descriptor.name.clone();
        let declared = self.descriptor.has_field(key);
        let session = self.session_mut()?;
        if session.transaction.is_closed() {
            return Err(StateError::AlreadyCommitted);
        }
        if !declared {
            error!("{} is not defined on {} and will not be stored", key, entity);
            return Err(StateError::UnknownField {
                field: key.to_string(),
                entity,
            });
        }
        session.transaction.upsert(key, value.clone())?;
        session.cache.set_key(key, value);
        Ok(())
    }

    /// Deletes `key`; later reads in this session see it as missing.
    pub fn unset(&mut self, key: &str) -> Result<(), StateError> {
        let session = self.session_mut()?;
        session.transaction.delete(key)?;
        session.cache.evict(key);
        Ok(())
    }

    /// True when `key` holds a value other than `null`.
    pub fn has(&self, key: &str) -> Result<bool, StateError> {
        let session = self.session()?;
        Ok(matches!(
            session.cache.lookup(key),
            CacheLookup::Present(value) if !value.is_null()
        ))
    }

    /// Sends every logged operation to the store as one transaction.
    ///
    /// The transaction is closed before the request goes out, so it stays
    /// closed even if the request fails. An empty log sends nothing.
    pub async fn commit(&mut self, metadata: Option<Metadata>) -> Result<(), StateError> {
        self.session()?;
        let store = self.store()?.clone();
        let session = self.session_mut()?;
        session.transaction.close()?;

        let requests: Vec<TransactionRequest> = session
            .transaction
            .operations()
            .iter()
            .map(|operation| to_request(session, &store, operation))
            .collect();

        if requests.is_empty() {
            debug!("Nothing to commit to {}", store.name);
            return Ok(());
        }

        info!(
            "Committing {} operations to {}",
            requests.len(),
            store.name
        );
        self.client
            .execute_state_transaction(&store.name, &requests, &metadata.unwrap_or_default())
            .await?;
        Ok(())
    }

    pub fn is_begun(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_committed(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.transaction.is_closed())
    }

    /// Etag recorded at load for field `key`.
    pub fn etag(&self, key: &str) -> Option<&str> {
        let session = self.session.as_ref()?;
        session.etags.get(&session.store_key(key)).map(String::as_str)
    }

    pub fn pending_operations(&self) -> &[ActorStateOperation] {
        self.session
            .as_ref()
            .map(|session| session.transaction.operations())
            .unwrap_or_default()
    }

    fn store(&self) -> Result<&StateStoreDescriptor, StateError> {
        self.descriptor
            .store
            .as_ref()
            .ok_or_else(|| StateError::MissingStateStore {
                entity: self.descriptor.name.clone(),
            })
    }

    fn session(&self) -> Result<&Session, StateError> {
        self.session.as_ref().ok_or(StateError::NotBegun)
    }

    fn session_mut(&mut self) -> Result<&mut Session, StateError> {
        self.session.as_mut().ok_or(StateError::NotBegun)
    }
}

fn to_request(
    session: &Session,
    store: &StateStoreDescriptor,
    operation: &ActorStateOperation,
) -> TransactionRequest {
    let key = session.store_key(operation.key());
    let etag = session.etags.get(&key).cloned().unwrap_or_default();
    let request = match operation.operation {
        StateOperationKind::Upsert => TransactionRequest::upsert(
            key,
            operation.request.value.clone().unwrap_or(Value::Null),
        ),
        StateOperationKind::Delete => TransactionRequest::delete(key),
    };
    request.with_etag(etag).with_consistency(store.consistency)
}

impl std::fmt::Debug for TransactionalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionalState")
            .field("entity", &self.descriptor.name)
            .field("session", &self.session)
            .finish()
    }
}
