#![allow(dead_code)]

use async_trait::async_trait;
use dapr_client::{
    ActorReference, ActorStateOperation, BulkStateItem, ClientError, HttpVerb, InvocationClient,
    Metadata, Reminder, ReturnHint, Timer, TransactionRequest,
};
use dapr_runtime::{ProxyFactory, ProxyMode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One call observed by the mock client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Invoke {
        verb: HttpVerb,
        actor: ActorReference,
        method: String,
        parameter: Option<Value>,
        returns: ReturnHint,
    },
    SaveActorState {
        actor: ActorReference,
        operations: Vec<ActorStateOperation>,
    },
    GetActorState {
        actor: ActorReference,
        key: String,
    },
    Reminder {
        actor: ActorReference,
        name: String,
    },
    Timer {
        actor: ActorReference,
        name: String,
    },
    BulkState {
        store: String,
        keys: Vec<String>,
        parallelism: u32,
        metadata: Metadata,
    },
    Transaction {
        store: String,
        operations: Vec<TransactionRequest>,
        metadata: Metadata,
    },
}

/// Recording stand-in for the sidecar client.
///
/// Invocations answer with a canned value per method (`null` by default),
/// bulk reads with the canned items, and every call is recorded in order.
#[derive(Default)]
pub struct MockInvocationClient {
    calls: Mutex<Vec<Call>>,
    results: Mutex<HashMap<String, Value>>,
    bulk_items: Mutex<Vec<BulkStateItem>>,
    fail_transactions: Mutex<bool>,
}

impl MockInvocationClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn returning(&self, method: &str, value: Value) {
        self.results
            .lock()
            .unwrap()
            .insert(method.to_string(), value);
    }

    pub fn with_bulk_item(&self, key: &str, data: Option<Value>, etag: Option<&str>) {
        self.bulk_items.lock().unwrap().push(BulkStateItem {
            key: key.to_string(),
            data,
            etag: etag.map(str::to_string),
            error: None,
        });
    }

    pub fn fail_transactions(&self) {
        *self.fail_transactions.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Invoke { .. }))
            .collect()
    }

    pub fn transactions(&self) -> Vec<(String, Vec<TransactionRequest>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Transaction {
                    store, operations, ..
                } => Some((store, operations)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InvocationClient for MockInvocationClient {
    async fn invoke_actor_method(
        &self,
        verb: HttpVerb,
        actor: &ActorReference,
        method: &str,
        parameter: Option<Value>,
        returns: &ReturnHint,
    ) -> Result<Value, ClientError> {
        self.record(Call::Invoke {
            verb,
            actor: actor.clone(),
            method: method.to_string(),
            parameter,
            returns: returns.clone(),
        });
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn save_actor_state(
        &self,
        actor: &ActorReference,
        operations: &[ActorStateOperation],
    ) -> Result<bool, ClientError> {
        self.record(Call::SaveActorState {
            actor: actor.clone(),
            operations: operations.to_vec(),
        });
        Ok(true)
    }

    async fn get_actor_state(
        &self,
        actor: &ActorReference,
        key: &str,
    ) -> Result<Value, ClientError> {
        self.record(Call::GetActorState {
            actor: actor.clone(),
            key: key.to_string(),
        });
        Err(ClientError::KeyNotFound)
    }

    async fn create_actor_reminder(
        &self,
        actor: &ActorReference,
        reminder: &Reminder,
    ) -> Result<bool, ClientError> {
        self.record(Call::Reminder {
            actor: actor.clone(),
            name: reminder.name.clone(),
        });
        Ok(true)
    }

    async fn get_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<Option<Reminder>, ClientError> {
        self.record(Call::Reminder {
            actor: actor.clone(),
            name: name.to_string(),
        });
        Ok(None)
    }

    async fn delete_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError> {
        self.record(Call::Reminder {
            actor: actor.clone(),
            name: name.to_string(),
        });
        Ok(true)
    }

    async fn create_actor_timer(
        &self,
        actor: &ActorReference,
        timer: &Timer,
    ) -> Result<bool, ClientError> {
        self.record(Call::Timer {
            actor: actor.clone(),
            name: timer.name.clone(),
        });
        Ok(true)
    }

    async fn delete_actor_timer(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError> {
        self.record(Call::Timer {
            actor: actor.clone(),
            name: name.to_string(),
        });
        Ok(true)
    }

    async fn get_bulk_state(
        &self,
        store_name: &str,
        keys: &[String],
        parallelism: u32,
        metadata: &Metadata,
    ) -> Result<Vec<BulkStateItem>, ClientError> {
        self.record(Call::BulkState {
            store: store_name.to_string(),
            keys: keys.to_vec(),
            parallelism,
            metadata: metadata.clone(),
        });
        let items = self.bulk_items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|item| keys.contains(&item.key))
            .cloned()
            .collect())
    }

    async fn execute_state_transaction(
        &self,
        store_name: &str,
        operations: &[TransactionRequest],
        metadata: &Metadata,
    ) -> Result<(), ClientError> {
        self.record(Call::Transaction {
            store: store_name.to_string(),
            operations: operations.to_vec(),
            metadata: metadata.clone(),
        });
        if *self.fail_transactions.lock().unwrap() {
            return Err(ClientError::UnexpectedStatus {
                path: format!("/v1.0/state/{}/transaction", store_name),
                status: 409,
                body: "etag mismatch".to_string(),
            });
        }
        Ok(())
    }
}

/// A factory in `mode` over `client`.
pub fn factory(mode: ProxyMode, client: Arc<MockInvocationClient>) -> ProxyFactory {
    ProxyFactory::new(mode, client)
}
