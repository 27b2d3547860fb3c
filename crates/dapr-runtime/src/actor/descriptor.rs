//! # Interface Descriptors
//!
//! Declarative descriptions of remote actor interfaces: the remote type name,
//! and per method its parameter shape, return type and verb hint.

use dapr_client::{HttpVerb, ReturnHint};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::instance::ActorInstance;

/// Explicit verb requested for a method, or `Inferred` to derive it from the
/// parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerbHint {
    #[default]
    Inferred,
    Get,
    Post,
    Put,
    Delete,
}

impl VerbHint {
    /// An explicit hint always wins; otherwise POST with a parameter, GET
    /// without.
    pub fn resolve(&self, has_parameter: bool) -> HttpVerb {
        match self {
            VerbHint::Get => HttpVerb::Get,
            VerbHint::Post => HttpVerb::Post,
            VerbHint::Put => HttpVerb::Put,
            VerbHint::Delete => HttpVerb::Delete,
            VerbHint::Inferred if has_parameter => HttpVerb::Post,
            VerbHint::Inferred => HttpVerb::Get,
        }
    }
}

/// The single logical parameter of an actor method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Parameter {
    #[default]
    None,
    ByValue(String),
    /// Shared-memory parameter; proxies refuse to generate such methods.
    ByReference(String),
}

impl Parameter {
    pub fn by_value(type_name: impl Into<String>) -> Self {
        Parameter::ByValue(type_name.into())
    }

    pub fn by_reference(type_name: impl Into<String>) -> Self {
        Parameter::ByReference(type_name.into())
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Parameter::None)
    }
}

/// Declared return type as a list of union members.
///
/// No members means the return type was left unspecified and the result is
/// passed through untyped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnType {
    members: Vec<String>,
}

impl ReturnType {
    const VOID: &'static str = "void";
    const UNSPECIFIED: &'static str = "mixed";

    pub fn void() -> Self {
        Self::of(Self::VOID)
    }

    pub fn of(type_name: impl Into<String>) -> Self {
        Self {
            members: vec![type_name.into()],
        }
    }

    pub fn union<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Reduces the union to its first non-void member.
    pub fn to_hint(&self) -> ReturnHint {
        if self.members.is_empty() {
            return ReturnHint::Value(Self::UNSPECIFIED.to_string());
        }
        self.members
            .iter()
            .map(|member| member.trim())
            .find(|member| *member != Self::VOID && *member != "()")
            .map(|member| ReturnHint::Value(member.to_string()))
            .unwrap_or(ReturnHint::Void)
    }
}

/// One method of an actor interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub parameter: Parameter,
    pub returns: ReturnType,
    pub verb: VerbHint,
    /// Lifecycle hooks that only make sense inside the hosted actor.
    pub host_only: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::None,
            returns: ReturnType::default(),
            verb: VerbHint::Inferred,
            host_only: false,
        }
    }

    /// A method that can only run inside the hosted actor, such as an
    /// activation hook.
    pub fn host_only(name: impl Into<String>) -> Self {
        Self::new(name).host_only_if(true)
    }

    pub fn with_parameter(self, type_name: impl Into<String>) -> Self {
        self.with_parameter_kind(Parameter::by_value(type_name))
    }

    pub fn with_reference_parameter(self, type_name: impl Into<String>) -> Self {
        self.with_parameter_kind(Parameter::by_reference(type_name))
    }

    pub fn with_parameter_kind(mut self, parameter: Parameter) -> Self {
        self.parameter = parameter;
        self
    }

    pub fn returning(self, type_name: impl Into<String>) -> Self {
        self.with_return_type(ReturnType::of(type_name))
    }

    pub fn with_return_type(mut self, returns: ReturnType) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_verb(mut self, verb: VerbHint) -> Self {
        self.verb = verb;
        self
    }

    pub fn host_only_if(mut self, host_only: bool) -> Self {
        self.host_only = host_only;
        self
    }
}

/// Describes a remote actor interface.
///
/// Attach the remote actor type here, or supply an override when asking for a
/// proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    name: String,
    dapr_type: Option<String>,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dapr_type: None,
            methods: Vec::new(),
        }
    }

    pub fn with_dapr_type(mut self, dapr_type: impl Into<String>) -> Self {
        self.dapr_type = Some(dapr_type.into());
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dapr_type(&self) -> Option<&str> {
        self.dapr_type.as_deref().filter(|t| !t.is_empty())
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// A typed proxy over a remote actor interface.
///
/// Usually implemented by [`actor_interface!`](crate::actor_interface).
pub trait ActorInterface: Sized {
    fn descriptor() -> InterfaceDescriptor;

    fn from_instance(instance: Arc<ActorInstance>) -> Self;
}
