use dapr_client::{ActorReference, InvocationClient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::definition::{DispatchEntry, ProxyDefinition};
use crate::errors::ProxyError;

/// # ActorInstance
///
/// A proxy for one remote actor.
///
/// ## Purpose
///
/// Holds the actor's identity, the dispatch table compiled for its interface
/// and the shared invocation client. Every call looks up the method in the
/// table and either forwards it to the sidecar or refuses it locally.
pub struct ActorInstance {
    reference: ActorReference,
    definition: Arc<ProxyDefinition>,
    client: Arc<dyn InvocationClient>,
}

impl ActorInstance {
    pub fn new(
        id: impl Into<String>,
        definition: Arc<ProxyDefinition>,
        client: Arc<dyn InvocationClient>,
    ) -> Self {
        let reference = ActorReference::new(definition.dapr_type.clone(), id);
        Self {
            reference,
            definition,
            client,
        }
    }

    pub fn get_id(&self) -> &str {
        self.reference.actor_id()
    }

    pub fn dapr_type(&self) -> &str {
        self.reference.actor_type()
    }

    pub fn reference(&self) -> &ActorReference {
        &self.reference
    }

    pub fn definition(&self) -> &Arc<ProxyDefinition> {
        &self.definition
    }

    /// Invokes `method` on the remote actor.
    ///
    /// Host-only methods fail without touching the client. A void method
    /// yields `Value::Null`.
    pub async fn invoke(&self, method: &str, parameter: Option<Value>) -> Result<Value, ProxyError> {
        let entry = self
            .definition
            .entry(method)
            .ok_or_else(|| ProxyError::UnknownMethod {
                method: method.to_string(),
            })?;

        match entry {
            DispatchEntry::HostOnly => Err(ProxyError::NotActorContext {
                method: method.to_string(),
            }),
            DispatchEntry::Remote {
                verb,
                has_parameter,
                returns,
            } => {
                let parameter = if *has_parameter {
                    parameter
                } else {
                    if parameter.is_some() {
                        warn!(
                            "{} takes no parameter; ignoring the one supplied for {}",
                            method, self.reference
                        );
                    }
                    None
                };

                debug!("Invoking {} {} on {}", verb, method, self.reference);
                let result = self
                    .client
                    .invoke_actor_method(*verb, &self.reference, method, parameter, returns)
                    .await?;

                if returns.is_void() {
                    Ok(Value::Null)
                } else {
                    Ok(result)
                }
            }
        }
    }

    /// Typed wrapper around [`invoke`](Self::invoke).
    pub async fn call<P, R>(&self, method: &str, parameter: Option<&P>) -> Result<R, ProxyError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let parameter = parameter.map(serde_json::to_value).transpose()?;
        let result = self.invoke(method, parameter).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn call_without_args<R>(&self, method: &str) -> Result<R, ProxyError>
    where
        R: DeserializeOwned,
    {
        self.call::<Value, R>(method, None).await
    }
}

impl fmt::Debug for ActorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorInstance")
            .field("reference", &self.reference)
            .field("interface", &self.definition.interface)
            .finish()
    }
}
