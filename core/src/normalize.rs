//! Translation of failed HTTP calls into user-facing messages.
//!
//! # Design
//! Every service describes its status-to-message mapping as an
//! `ErrorCatalog` value instead of hand-writing a `match` on status codes.
//! `ErrorCatalog::normalize` is the only place where that mapping is applied.
//! Resolution order for a failure with a response:
//!
//! 1. the per-call `MessageMap` override for the status,
//! 2. the catalog's fixed message for the status,
//! 3. the validation rule for 422,
//! 4. the unmapped policy: body fields in catalog order, then the fallback
//!    message, or pass the raw error through.
//!
//! Without a response the low-level message is used, then the fallback.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::{ApiError, RawApiError};

/// Per-call override table from HTTP status to message.
pub type MessageMap = HashMap<u16, String>;

pub const VALIDATION_STATUS: u16 = 422;
pub const CONNECTION_ERROR: &str = "Error de conexión";
pub const INVALID_DATA: &str = "Datos inválidos";

/// How a 422 body is turned into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStyle {
    /// `data.errors`, a string or a list of strings joined with ", ".
    ErrorList,
    /// `data.details`, one `"<field>: <messages>"` line per field whose value
    /// is a list, under a `"<default>:"` heading.
    FieldDetails,
}

/// A string field of the error body that may carry the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyField {
    Error,
    Message,
}

impl BodyField {
    fn key(self) -> &'static str {
        match self {
            BodyField::Error => "error",
            BodyField::Message => "message",
        }
    }
}

/// What happens to a failure no rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmapped {
    BodyThenFallback,
    PassThrough,
}

#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    fixed: BTreeMap<u16, String>,
    validation_style: ValidationStyle,
    validation_default: String,
    body_fields: Vec<BodyField>,
    fallback: String,
    unmapped: Unmapped,
}

impl Default for ErrorCatalog {
    /// A catalog with no fixed messages.
    fn default() -> Self {
        Self {
            fixed: BTreeMap::new(),
            validation_style: ValidationStyle::ErrorList,
            validation_default: INVALID_DATA.to_string(),
            body_fields: vec![BodyField::Error, BodyField::Message],
            fallback: CONNECTION_ERROR.to_string(),
            unmapped: Unmapped::BodyThenFallback,
        }
    }
}

impl ErrorCatalog {
    /// The shared mapping used by every service without a catalog of its own.
    pub fn standard() -> &'static ErrorCatalog {
        static STANDARD: OnceLock<ErrorCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| {
            ErrorCatalog::default()
                .with_status(401, "No estás autorizado")
                .with_status(403, "No tienes permisos para realizar esta acción")
                .with_status(404, "Recurso no encontrado")
                .with_status(409, "Conflicto en el recurso")
        })
    }

    pub fn with_status(mut self, status: u16, message: impl Into<String>) -> Self {
        self.fixed.insert(status, message.into());
        self
    }

    pub fn with_validation(mut self, style: ValidationStyle, default: impl Into<String>) -> Self {
        self.validation_style = style;
        self.validation_default = default.into();
        self
    }

    pub fn with_body_fields(mut self, fields: &[BodyField]) -> Self {
        self.body_fields = fields.to_vec();
        self
    }

    pub fn with_fallback(mut self, message: impl Into<String>) -> Self {
        self.fallback = message.into();
        self
    }

    pub fn with_unmapped(mut self, unmapped: Unmapped) -> Self {
        self.unmapped = unmapped;
        self
    }

    /// Convert a failed call into the error surfaced to callers.
    pub fn normalize(&self, raw: RawApiError, custom: &MessageMap) -> ApiError {
        let err = self.resolve(raw, custom);
        tracing::debug!(status = ?err.status(), error = %err, "normalized API error");
        err
    }

    fn resolve(&self, raw: RawApiError, custom: &MessageMap) -> ApiError {
        let Some(response) = raw.response.as_ref() else {
            return match self.unmapped {
                Unmapped::PassThrough => ApiError::Raw(raw),
                Unmapped::BodyThenFallback => {
                    let message = non_empty(raw.message.as_deref()).unwrap_or(&self.fallback);
                    ApiError::normalized(None, message)
                }
            };
        };
        let status = response.status;

        if let Some(message) = non_empty(custom.get(&status).map(String::as_str)) {
            return ApiError::normalized(Some(status), message);
        }
        if let Some(message) = self.fixed.get(&status) {
            return ApiError::normalized(Some(status), message.as_str());
        }
        if status == VALIDATION_STATUS {
            return ApiError::normalized(Some(status), self.validation_message(&response.data));
        }

        match self.unmapped {
            Unmapped::PassThrough => ApiError::Raw(raw),
            Unmapped::BodyThenFallback => {
                let message = self
                    .body_fields
                    .iter()
                    .find_map(|field| non_empty(response.data.get(field.key()).and_then(Value::as_str)))
                    .unwrap_or(&self.fallback);
                ApiError::normalized(Some(status), message)
            }
        }
    }

    fn validation_message(&self, data: &Value) -> String {
        match self.validation_style {
            ValidationStyle::ErrorList => match data.get("errors") {
                Some(Value::Array(items)) => join_messages(items),
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                _ => self.validation_default.clone(),
            },
            ValidationStyle::FieldDetails => match data.get("details").and_then(Value::as_object) {
                Some(details) => {
                    let mut message = format!("{}:", self.validation_default);
                    for (field, value) in details {
                        if let Value::Array(items) = value {
                            message.push('\n');
                            message.push_str(field);
                            message.push_str(": ");
                            message.push_str(&join_messages(items));
                        }
                    }
                    message
                }
                None => self.validation_default.clone(),
            },
        }
    }
}

/// Normalize with the shared mapping.
pub fn handle_api_error(raw: RawApiError, custom: &MessageMap) -> ApiError {
    ErrorCatalog::standard().normalize(raw, custom)
}

/// Build a `MessageMap` from literal pairs.
pub fn messages<const N: usize>(pairs: [(u16, &str); N]) -> MessageMap {
    pairs.into_iter().map(|(status, message)| (status, message.to_string())).collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn join_messages(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
