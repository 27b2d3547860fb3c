//! # Wire Types
//!
//! Request and response shapes exchanged with the sidecar's actor and state
//! APIs.

use crate::consistency::ConsistencyPolicy;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Free-form metadata forwarded to the sidecar.
pub type Metadata = BTreeMap<String, String>;

/// HTTP verbs an actor method may be invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }

    /// Whether the parameter travels as a request body with this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put)
    }
}

impl FromStr for HttpVerb {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            _ => Err(ClientError::UnsupportedVerb(s.to_string())),
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller expects back from an actor method.
///
/// `Value` carries the declared type name, which is only a hint for the
/// deserializer; the client hands back untyped JSON either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum ReturnHint {
    Void,
    Value(String),
}

impl ReturnHint {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnHint::Void)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateOperationKind {
    Upsert,
    Delete,
}

impl StateOperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateOperationKind::Upsert => "upsert",
            StateOperationKind::Delete => "delete",
        }
    }
}

/// One entry of an actor state batch: `{operation, request: {key, value?}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStateOperation {
    pub operation: StateOperationKind,
    pub request: ActorStateRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStateRequest {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ActorStateOperation {
    pub fn upsert(key: impl Into<String>, value: Value) -> Self {
        Self {
            operation: StateOperationKind::Upsert,
            request: ActorStateRequest {
                key: key.into(),
                value: Some(value),
            },
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            operation: StateOperationKind::Delete,
            request: ActorStateRequest {
                key: key.into(),
                value: None,
            },
        }
    }

    pub fn key(&self) -> &str {
        &self.request.key
    }
}

/// One operation of a state store transaction.
///
/// An empty etag means "no concurrency check" and is left off the wire, as
/// are the consistency options that only matter alongside an etag.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionRequest {
    Upsert {
        key: String,
        value: Value,
        etag: String,
        metadata: Metadata,
        consistency: Option<ConsistencyPolicy>,
    },
    Delete {
        key: String,
        etag: String,
        metadata: Metadata,
        consistency: Option<ConsistencyPolicy>,
    },
}

impl TransactionRequest {
    pub fn upsert(key: impl Into<String>, value: Value) -> Self {
        TransactionRequest::Upsert {
            key: key.into(),
            value,
            etag: String::new(),
            metadata: Metadata::new(),
            consistency: None,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        TransactionRequest::Delete {
            key: key.into(),
            etag: String::new(),
            metadata: Metadata::new(),
            consistency: None,
        }
    }

    pub fn with_etag(mut self, new_etag: impl Into<String>) -> Self {
        match &mut self {
            TransactionRequest::Upsert { etag, .. } | TransactionRequest::Delete { etag, .. } => {
                *etag = new_etag.into()
            }
        }
        self
    }

    pub fn with_consistency(mut self, policy: ConsistencyPolicy) -> Self {
        match &mut self {
            TransactionRequest::Upsert { consistency, .. }
            | TransactionRequest::Delete { consistency, .. } => *consistency = Some(policy),
        }
        self
    }

    pub fn with_metadata(mut self, new_metadata: Metadata) -> Self {
        match &mut self {
            TransactionRequest::Upsert { metadata, .. }
            | TransactionRequest::Delete { metadata, .. } => *metadata = new_metadata,
        }
        self
    }

    pub fn operation(&self) -> StateOperationKind {
        match self {
            TransactionRequest::Upsert { .. } => StateOperationKind::Upsert,
            TransactionRequest::Delete { .. } => StateOperationKind::Delete,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TransactionRequest::Upsert { key, .. } | TransactionRequest::Delete { key, .. } => key,
        }
    }

    pub fn etag(&self) -> &str {
        match self {
            TransactionRequest::Upsert { etag, .. } | TransactionRequest::Delete { etag, .. } => {
                etag
            }
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            TransactionRequest::Upsert { value, .. } => Some(value),
            TransactionRequest::Delete { .. } => None,
        }
    }

    pub fn consistency(&self) -> Option<ConsistencyPolicy> {
        match self {
            TransactionRequest::Upsert { consistency, .. }
            | TransactionRequest::Delete { consistency, .. } => *consistency,
        }
    }

    fn metadata(&self) -> &Metadata {
        match self {
            TransactionRequest::Upsert { metadata, .. }
            | TransactionRequest::Delete { metadata, .. } => metadata,
        }
    }

    /// Renders `{operation, request: {key, value?, etag?, metadata?, options?}}`.
    pub fn to_wire(&self) -> Value {
        let mut request = Map::new();
        request.insert("key".to_string(), Value::String(self.key().to_string()));
        if let Some(value) = self.value() {
            request.insert("value".to_string(), value.clone());
        }
        if !self.etag().is_empty() {
            request.insert("etag".to_string(), Value::String(self.etag().to_string()));
        }
        if !self.metadata().is_empty() {
            request.insert("metadata".to_string(), json!(self.metadata()));
        }
        if let (Some(policy), false) = (self.consistency(), self.etag().is_empty()) {
            request.insert(
                "options".to_string(),
                json!({
                    "consistency": policy.consistency(),
                    "concurrency": policy.concurrency(),
                }),
            );
        }

        json!({
            "operation": self.operation().as_str(),
            "request": Value::Object(request),
        })
    }
}

/// One key as returned by the bulk state endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkStateItem {
    pub key: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A key/value pair saved directly to a state store.
#[derive(Debug, Clone, PartialEq)]
pub struct StateItem {
    pub key: String,
    pub value: Value,
    pub consistency: ConsistencyPolicy,
    pub etag: Option<String>,
    pub metadata: Metadata,
}

impl StateItem {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            consistency: ConsistencyPolicy::default(),
            etag: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyPolicy) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn to_wire(&self) -> Value {
        let mut item = Map::new();
        item.insert("key".to_string(), Value::String(self.key.clone()));
        item.insert("value".to_string(), self.value.clone());
        if let Some(etag) = self.etag.as_ref().filter(|etag| !etag.is_empty()) {
            item.insert("etag".to_string(), Value::String(etag.clone()));
            item.insert(
                "options".to_string(),
                json!({
                    "consistency": self.consistency.consistency(),
                    "concurrency": self.consistency.concurrency(),
                }),
            );
        }
        if !self.metadata.is_empty() {
            item.insert("metadata".to_string(), json!(self.metadata));
        }
        Value::Object(item)
    }
}

/// A persistent actor reminder.
///
/// The name is part of the request path, not the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "dueTime", with = "interval")]
    pub due_time: Duration,
    #[serde(default, with = "interval")]
    pub period: Duration,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Reminder {
    pub fn new(name: impl Into<String>, due_time: Duration, period: Duration) -> Self {
        Self {
            name: name.into(),
            due_time,
            period,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A volatile actor timer that calls `callback` on the actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "dueTime", with = "interval")]
    pub due_time: Duration,
    #[serde(default, with = "interval")]
    pub period: Duration,
    pub callback: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Timer {
    pub fn new(
        name: impl Into<String>,
        due_time: Duration,
        period: Duration,
        callback: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            due_time,
            period,
            callback: callback.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Dapr's `0h0m5s0ms` interval notation.
pub(crate) mod interval {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn format(duration: &Duration) -> String {
        let total_ms = duration.as_millis();
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1_000;
        let millis = total_ms % 1_000;
        format!("{}h{}m{}s{}ms", hours, minutes, seconds, millis)
    }

    pub fn parse(input: &str) -> Result<Duration, String> {
        let mut total_ms: u64 = 0;
        let mut digits = String::new();
        let mut unit = String::new();
        let mut chars = input.trim().chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            unit.push(c);
            if chars.peek().map_or(true, |next| next.is_ascii_digit()) {
                let amount: u64 = digits
                    .parse()
                    .map_err(|_| format!("missing amount before '{}' in {}", unit, input))?;
                let factor = match unit.as_str() {
                    "h" => 3_600_000,
                    "m" => 60_000,
                    "s" => 1_000,
                    "ms" => 1,
                    other => return Err(format!("unknown unit '{}' in {}", other, input)),
                };
                total_ms += amount * factor;
                digits.clear();
                unit.clear();
            }
        }

        if !digits.is_empty() {
            return Err(format!("trailing amount without unit in {}", input));
        }
        Ok(Duration::from_millis(total_ms))
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verb_parsing() {
        assert_eq!("post".parse::<HttpVerb>().unwrap(), HttpVerb::Post);
        assert_eq!("DELETE".parse::<HttpVerb>().unwrap(), HttpVerb::Delete);
        assert!(matches!(
            "PATCH".parse::<HttpVerb>(),
            Err(ClientError::UnsupportedVerb(_))
        ));
    }

    #[test]
    fn test_upsert_without_etag_omits_options() {
        let request = TransactionRequest::upsert("count", json!(2))
            .with_consistency(ConsistencyPolicy::StrongFirstWrite);

        assert_eq!(
            request.to_wire(),
            json!({"operation": "upsert", "request": {"key": "count", "value": 2}})
        );
    }

    #[test]
    fn test_delete_with_etag_carries_options() {
        let request = TransactionRequest::delete("count")
            .with_etag("e1")
            .with_consistency(ConsistencyPolicy::EventualLastWrite);

        assert_eq!(
            request.to_wire(),
            json!({
                "operation": "delete",
                "request": {
                    "key": "count",
                    "etag": "e1",
                    "options": {"consistency": "eventual", "concurrency": "last-write"}
                }
            })
        );
    }

    #[test]
    fn test_state_item_options_follow_etag() {
        let plain = StateItem::new("k", json!("v"))
            .with_consistency(ConsistencyPolicy::EventualFirstWrite);
        assert_eq!(plain.to_wire(), json!({"key": "k", "value": "v"}));

        let guarded = plain.with_etag("7");
        assert_eq!(
            guarded.to_wire(),
            json!({
                "key": "k",
                "value": "v",
                "etag": "7",
                "options": {"consistency": "eventual", "concurrency": "first-write"}
            })
        );
    }

    #[test]
    fn test_interval_format_and_parse() {
        let duration = Duration::from_millis(3_723_004);
        assert_eq!(interval::format(&duration), "1h2m3s4ms");
        assert_eq!(interval::parse("1h2m3s4ms").unwrap(), duration);
        assert_eq!(interval::parse("0h0m5s0ms").unwrap(), Duration::from_secs(5));
        assert_eq!(interval::parse("").unwrap(), Duration::ZERO);
        assert!(interval::parse("5d").is_err());
        assert!(interval::parse("12").is_err());
    }

    #[test]
    fn test_timer_body_shape() {
        let timer = Timer::new(
            "tick",
            Duration::from_secs(1),
            Duration::from_secs(10),
            "on_tick",
        )
        .with_data(json!({"n": 1}));

        assert_eq!(
            serde_json::to_value(&timer).unwrap(),
            json!({
                "dueTime": "0h0m1s0ms",
                "period": "0h0m10s0ms",
                "callback": "on_tick",
                "data": {"n": 1}
            })
        );
    }

    #[test]
    fn test_reminder_from_sidecar_body() {
        let reminder: Reminder = serde_json::from_value(json!({
            "dueTime": "0h0m2s0ms",
            "period": "0h1m0s0ms",
            "data": "payload"
        }))
        .unwrap();

        assert_eq!(reminder.due_time, Duration::from_secs(2));
        assert_eq!(reminder.period, Duration::from_secs(60));
        assert_eq!(reminder.data, Some(json!("payload")));
        assert!(reminder.name.is_empty());
    }
}
