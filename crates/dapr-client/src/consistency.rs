use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conflict and visibility semantics attached to a state write.
///
/// The policy is passed through to the state store untouched; this crate never
/// interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConsistencyPolicy {
    #[default]
    StrongLastWrite,
    StrongFirstWrite,
    EventualLastWrite,
    EventualFirstWrite,
}

impl ConsistencyPolicy {
    /// Value of the `consistency` option on the wire.
    pub fn consistency(&self) -> &'static str {
        match self {
            ConsistencyPolicy::StrongLastWrite | ConsistencyPolicy::StrongFirstWrite => "strong",
            ConsistencyPolicy::EventualLastWrite | ConsistencyPolicy::EventualFirstWrite => {
                "eventual"
            }
        }
    }

    /// Value of the `concurrency` option on the wire.
    pub fn concurrency(&self) -> &'static str {
        match self {
            ConsistencyPolicy::StrongLastWrite | ConsistencyPolicy::EventualLastWrite => {
                "last-write"
            }
            ConsistencyPolicy::StrongFirstWrite | ConsistencyPolicy::EventualFirstWrite => {
                "first-write"
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConsistencyPolicy::StrongLastWrite => "StrongLastWrite",
            ConsistencyPolicy::StrongFirstWrite => "StrongFirstWrite",
            ConsistencyPolicy::EventualLastWrite => "EventualLastWrite",
            ConsistencyPolicy::EventualFirstWrite => "EventualFirstWrite",
        }
    }
}

impl fmt::Display for ConsistencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsistencyPolicy {
    type Err = String;

    /// Accepts the policy name in either `StrongLastWrite` or
    /// `strong-last-write` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "stronglastwrite" => Ok(ConsistencyPolicy::StrongLastWrite),
            "strongfirstwrite" => Ok(ConsistencyPolicy::StrongFirstWrite),
            "eventuallastwrite" => Ok(ConsistencyPolicy::EventualLastWrite),
            "eventualfirstwrite" => Ok(ConsistencyPolicy::EventualFirstWrite),
            _ => Err(format!("unknown consistency policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(ConsistencyPolicy::StrongLastWrite.consistency(), "strong");
        assert_eq!(ConsistencyPolicy::StrongLastWrite.concurrency(), "last-write");
        assert_eq!(ConsistencyPolicy::EventualFirstWrite.consistency(), "eventual");
        assert_eq!(ConsistencyPolicy::EventualFirstWrite.concurrency(), "first-write");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "StrongFirstWrite".parse::<ConsistencyPolicy>().unwrap(),
            ConsistencyPolicy::StrongFirstWrite
        );
        assert_eq!(
            "eventual-last-write".parse::<ConsistencyPolicy>().unwrap(),
            ConsistencyPolicy::EventualLastWrite
        );
        assert!("linearizable".parse::<ConsistencyPolicy>().is_err());
    }
}
