//! Exception taxonomy driving error responses.
//!
//! # Design Decisions
//! - Closed tagged union `{kind, status, message}` instead of a class hierarchy
//! - `Unknown` captures anything raised outside the taxonomy (I/O, parse,
//!   template errors) and is normalized before rendering
//! - `FormData` carries the structured violation alongside its JSON message

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of an [`Exception`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionKind {
    /// Client input fault.
    FormData,
    /// Missing route, resource or view.
    NotFound,
    /// Catch-all server fault.
    InternalServerError,
    /// Error raised outside the taxonomy.
    Unknown,
}

impl ExceptionKind {
    /// HTTP status bound to the kind.
    pub fn status(self) -> u16 {
        match self {
            ExceptionKind::FormData => 412,
            ExceptionKind::NotFound => 404,
            ExceptionKind::InternalServerError | ExceptionKind::Unknown => 500,
        }
    }

    /// Message used when none is supplied.
    pub fn default_message(self) -> &'static str {
        match self {
            ExceptionKind::FormData => "Precondition Failed",
            ExceptionKind::NotFound => "Not found",
            ExceptionKind::InternalServerError | ExceptionKind::Unknown => "Internal Server Error",
        }
    }

    /// Look up a kind by its exception name, e.g. `NotFoundException`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_end_matches("Exception") {
            "FormData" => Some(ExceptionKind::FormData),
            "NotFound" => Some(ExceptionKind::NotFound),
            "InternalServerError" => Some(ExceptionKind::InternalServerError),
            _ => None,
        }
    }
}

/// A single form field violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field_id: String,
    /// Violated constraint: `required`, `minLength`, `maxLength`, `format`, `min` or `max`.
    #[serde(rename = "type")]
    pub constraint: String,
    pub message: String,
    pub label: String,
}

/// Error value propagated through the dispatch pipeline.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Exception {
    kind: ExceptionKind,
    message: String,
    violation: Option<FieldViolation>,
}

impl Exception {
    /// Create an exception; `None` selects the kind's default message.
    pub fn new(kind: ExceptionKind, message: Option<String>) -> Self {
        Self {
            kind,
            message: message.unwrap_or_else(|| kind.default_message().to_string()),
            violation: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::NotFound, Some(message.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::InternalServerError, Some(message.into()))
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Unknown, Some(message.into()))
    }

    /// Form data exception whose message is the JSON encoding of the violation.
    pub fn form_data(violation: FieldViolation) -> Self {
        let message = serde_json::to_string(&violation)
            .unwrap_or_else(|_| ExceptionKind::FormData.default_message().to_string());
        Self {
            kind: ExceptionKind::FormData,
            message,
            violation: Some(violation),
        }
    }

    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violation(&self) -> Option<&FieldViolation> {
        self.violation.as_ref()
    }

    pub fn is_form_data(&self) -> bool {
        self.kind == ExceptionKind::FormData
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ExceptionKind::NotFound
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == ExceptionKind::Unknown
    }

    /// Whether the dispatcher writes this exception to the error log.
    pub fn should_log(&self) -> bool {
        !self.is_form_data()
    }

    /// Replace an `Unknown` exception with a generic internal server error.
    pub fn normalize(self) -> Self {
        if self.is_unknown() {
            Self::new(ExceptionKind::InternalServerError, None)
        } else {
            self
        }
    }
}

/// Result type for dispatch operations.
pub type AppResult<T> = Result<T, Exception>;

impl From<std::io::Error> for Exception {
    fn from(e: std::io::Error) -> Self {
        Exception::unknown(format!("IO error: {}", e))
    }
}

impl From<toml::de::Error> for Exception {
    fn from(e: toml::de::Error) -> Self {
        Exception::unknown(format!("Definition parse error: {}", e))
    }
}

impl From<serde_json::Error> for Exception {
    fn from(e: serde_json::Error) -> Self {
        Exception::unknown(format!("JSON error: {}", e))
    }
}

impl From<tera::Error> for Exception {
    fn from(e: tera::Error) -> Self {
        // Tera nests the useful detail in the source chain.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Exception::unknown(format!("Template error: {}", message))
    }
}
