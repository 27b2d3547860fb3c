//! # HTTP Invocation Client
//!
//! The reqwest-backed [`InvocationClient`] that talks to a Dapr sidecar.

use crate::consistency::ConsistencyPolicy;
use crate::error::ClientError;
use crate::reference::ActorReference;
use crate::types::{
    ActorStateOperation, BulkStateItem, HttpVerb, Metadata, Reminder, ReturnHint, StateItem,
    Timer, TransactionRequest,
};
use crate::InvocationClient;
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

/// Client for the sidecar's HTTP API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpInvocationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpInvocationClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins `segments` onto the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn actor_endpoint(
        &self,
        actor: &ActorReference,
        segments: &[&str],
    ) -> Result<Url, ClientError> {
        let mut all = vec!["v1.0", "actors", actor.actor_type(), actor.actor_id()];
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<Response, ClientError> {
        debug!("Sending {} request to {}", method, url.path());
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Turns a non-success response into [`ClientError::UnexpectedStatus`].
    async fn expect_success(response: Response) -> Result<Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let path = response.url().path().to_string();
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        error!("Sidecar returned {} for {}: {}", status, path, body);
        Err(ClientError::UnexpectedStatus { path, status, body })
    }

    async fn read_json(response: Response) -> Result<Value, ClientError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn metadata_query(metadata: &Metadata) -> Vec<(String, String)> {
        metadata
            .iter()
            .map(|(key, value)| (format!("metadata.{}", key), value.clone()))
            .collect()
    }

    /// Reads one key from a state store along with its etag.
    pub async fn get_state_and_etag(
        &self,
        store_name: &str,
        key: &str,
        consistency: Option<ConsistencyPolicy>,
        metadata: &Metadata,
    ) -> Result<(Value, Option<String>), ClientError> {
        let url = self.endpoint(&["v1.0", "state", store_name, key])?;
        let mut query = Vec::new();
        if let Some(policy) = consistency {
            query.push(("consistency".to_string(), policy.consistency().to_string()));
            query.push(("concurrency".to_string(), policy.concurrency().to_string()));
        }
        query.extend(Self::metadata_query(metadata));

        let response = self.send(Method::GET, url, None, &query).await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Err(ClientError::KeyNotFound),
            _ => {
                let response = Self::expect_success(response).await?;
                let etag = response
                    .headers()
                    .get(reqwest::header::ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let value = Self::read_json(response).await?;
                Ok((value, etag))
            }
        }
    }

    /// Saves items to a state store. Returns true only on HTTP 200.
    pub async fn save_bulk_state(
        &self,
        store_name: &str,
        items: &[StateItem],
    ) -> Result<bool, ClientError> {
        let url = self.endpoint(&["v1.0", "state", store_name])?;
        let body = Value::Array(items.iter().map(StateItem::to_wire).collect());
        let response = self.send(Method::POST, url, Some(&body), &[]).await?;
        Ok(response.status() == StatusCode::OK)
    }

    /// Deletes one key, guarded by `If-Match` when an etag is given.
    pub async fn delete_state(
        &self,
        store_name: &str,
        key: &str,
        etag: Option<&str>,
        consistency: Option<ConsistencyPolicy>,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1.0", "state", store_name, key])?;
        let mut request = self.http.delete(url);
        if let Some(policy) = consistency {
            request = request.query(&[
                ("consistency", policy.consistency()),
                ("concurrency", policy.concurrency()),
            ]);
        }
        if let Some(etag) = etag.filter(|etag| !etag.is_empty()) {
            request = request.header(reqwest::header::IF_MATCH, etag);
        }
        let response = request.send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Whether the sidecar reports itself healthy.
    pub async fn is_healthy(&self) -> bool {
        let url = match self.endpoint(&["v1.0", "healthz"]) {
            Ok(url) => url,
            Err(_) => return false,
        };
        match self.send(Method::GET, url, None, &[]).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Sidecar health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl InvocationClient for HttpInvocationClient {
    async fn invoke_actor_method(
        &self,
        verb: HttpVerb,
        actor: &ActorReference,
        method: &str,
        parameter: Option<Value>,
        returns: &ReturnHint,
    ) -> Result<Value, ClientError> {
        let url = self.actor_endpoint(actor, &["method", method])?;
        let body = if verb.carries_body() {
            Some(parameter.unwrap_or(Value::Null))
        } else {
            None
        };
        let http_method = match verb {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Delete => Method::DELETE,
        };

        let response = self.send(http_method, url, body.as_ref(), &[]).await?;
        let response = Self::expect_success(response).await?;
        if returns.is_void() {
            return Ok(Value::Null);
        }
        Self::read_json(response).await
    }

    async fn save_actor_state(
        &self,
        actor: &ActorReference,
        operations: &[ActorStateOperation],
    ) -> Result<bool, ClientError> {
        if operations.is_empty() {
            return Ok(true);
        }
        let url = self.actor_endpoint(actor, &["state"])?;
        let body = serde_json::to_value(operations)?;
        let response = self.send(Method::POST, url, Some(&body), &[]).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn get_actor_state(
        &self,
        actor: &ActorReference,
        key: &str,
    ) -> Result<Value, ClientError> {
        let url = self.actor_endpoint(actor, &["state", key])?;
        let response = self.send(Method::GET, url, None, &[]).await?;
        match response.status() {
            StatusCode::OK => Self::read_json(response).await,
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Err(ClientError::KeyNotFound),
            _ => Self::expect_success(response).await.map(|_| Value::Null),
        }
    }

    async fn create_actor_reminder(
        &self,
        actor: &ActorReference,
        reminder: &Reminder,
    ) -> Result<bool, ClientError> {
        let url = self.actor_endpoint(actor, &["reminders", &reminder.name])?;
        let body = serde_json::to_value(reminder)?;
        let response = self.send(Method::POST, url, Some(&body), &[]).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn get_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<Option<Reminder>, ClientError> {
        let url = self.actor_endpoint(actor, &["reminders", name])?;
        let response = self.send(Method::GET, url, None, &[]).await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        let mut reminder: Reminder = serde_json::from_value(Self::read_json(response).await?)?;
        reminder.name = name.to_string();
        Ok(Some(reminder))
    }

    async fn delete_actor_reminder(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError> {
        let url = self.actor_endpoint(actor, &["reminders", name])?;
        let response = self.send(Method::DELETE, url, None, &[]).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn create_actor_timer(
        &self,
        actor: &ActorReference,
        timer: &Timer,
    ) -> Result<bool, ClientError> {
        let url = self.actor_endpoint(actor, &["timers", &timer.name])?;
        let body = serde_json::to_value(timer)?;
        let response = self.send(Method::POST, url, Some(&body), &[]).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn delete_actor_timer(
        &self,
        actor: &ActorReference,
        name: &str,
    ) -> Result<bool, ClientError> {
        let url = self.actor_endpoint(actor, &["timers", name])?;
        let response = self.send(Method::DELETE, url, None, &[]).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn get_bulk_state(
        &self,
        store_name: &str,
        keys: &[String],
        parallelism: u32,
        metadata: &Metadata,
    ) -> Result<Vec<BulkStateItem>, ClientError> {
        let url = self.endpoint(&["v1.0", "state", store_name, "bulk"])?;
        let body = json!({ "keys": keys, "parallelism": parallelism });
        let query = Self::metadata_query(metadata);
        let response = self.send(Method::POST, url, Some(&body), &query).await?;
        let response = Self::expect_success(response).await?;
        match Self::read_json(response).await? {
            Value::Null => Ok(Vec::new()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    async fn execute_state_transaction(
        &self,
        store_name: &str,
        operations: &[TransactionRequest],
        metadata: &Metadata,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1.0", "state", store_name, "transaction"])?;
        let body = json!({
            "operations": operations.iter().map(TransactionRequest::to_wire).collect::<Vec<_>>(),
            "metadata": metadata,
        });
        debug!(
            "Executing transaction with {} operations on {}",
            operations.len(),
            store_name
        );
        let response = self.send(Method::POST, url, Some(&body), &[]).await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}
