//! Aspect descriptors and their typed, resolved form.
//!
//! # Responsibilities
//! - Deserialize aspect lists (`[[aspect]] method = "this.model.login"`)
//! - Resolve each method reference to a dispatcher operation or a model
//!   action registered on the route's model
//! - Reject references that match neither

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::exception::{AppResult, Exception, ExceptionKind};

use super::model::ModelDefinition;

/// One configured aspect, as written in an aspect list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AspectDescriptor {
    /// `this.xxx` for dispatcher operations, `this.model.xxx` for model actions.
    pub method: String,
    /// Positional arguments; absent means none.
    #[serde(default)]
    pub arguments: Option<Vec<Value>>,
}

/// Aspect list file of a resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AspectList {
    #[serde(rename = "aspect")]
    pub aspects: Vec<AspectDescriptor>,
}

/// Operations the dispatcher exposes to aspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherOp {
    /// Validate parameters; optional argument: redirect target.
    CheckParameters,
    /// Raise a taxonomy exception; arguments: kind name, optional message.
    ThrowException,
    /// Append a message to the error log.
    Log,
}

impl DispatcherOp {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "checkParameters" => Some(DispatcherOp::CheckParameters),
            "throwException" => Some(DispatcherOp::ThrowException),
            "log" => Some(DispatcherOp::Log),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DispatcherOp::CheckParameters => "checkParameters",
            DispatcherOp::ThrowException => "throwException",
            DispatcherOp::Log => "log",
        }
    }
}

/// What an aspect invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspectTarget {
    Dispatcher(DispatcherOp),
    /// Action registered on the route's model.
    Model(String),
}

/// A resolved unit of the execution chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Aspect {
    pub target: AspectTarget,
    pub arguments: Vec<Value>,
}

impl Aspect {
    /// Aspect running a model action without arguments.
    pub fn model_action(action: impl Into<String>) -> Self {
        Self {
            target: AspectTarget::Model(action.into()),
            arguments: Vec::new(),
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            AspectTarget::Dispatcher(op) => write!(f, "this.{}", op.name()),
            AspectTarget::Model(action) => write!(f, "this.model.{}", action),
        }
    }
}

impl AspectDescriptor {
    /// Resolve the method reference against the dispatcher and `model`.
    pub fn resolve(&self, model: Option<&ModelDefinition>) -> AppResult<Aspect> {
        let method = self.method.trim();
        let method = method.strip_prefix("this.").unwrap_or(method);

        let target = match method.strip_prefix("model.") {
            Some(action) => match model {
                Some(m) if m.has_action(action) => AspectTarget::Model(action.to_string()),
                Some(m) => {
                    return Err(Exception::internal(format!(
                        "Aspect {} references unknown action of model {}",
                        self.method,
                        m.name()
                    )))
                }
                None => {
                    return Err(Exception::internal(format!(
                        "Aspect {} requires a model but none is registered",
                        self.method
                    )))
                }
            },
            None => DispatcherOp::from_name(method)
                .map(AspectTarget::Dispatcher)
                .ok_or_else(|| Exception::internal(format!("Unknown aspect method: {}", self.method)))?,
        };

        Ok(Aspect {
            target,
            arguments: self.arguments.clone().unwrap_or_default(),
        })
    }
}

/// Parse an aspect list file and resolve every entry.
pub fn resolve_aspects(text: &str, model: Option<&ModelDefinition>) -> AppResult<Vec<Aspect>> {
    let list: AspectList = toml::from_str(text)?;
    list.aspects.iter().map(|d| d.resolve(model)).collect()
}

/// Build the exception raised by a `throwException` aspect.
pub fn exception_from_arguments(arguments: &[Value]) -> Exception {
    let name = arguments.first().and_then(Value::as_str).unwrap_or_default();
    let message = arguments.get(1).and_then(Value::as_str).map(str::to_owned);
    match ExceptionKind::from_name(name) {
        Some(kind) => Exception::new(kind, message),
        None => Exception::internal(format!("Unknown exception: {}", name)),
    }
}
