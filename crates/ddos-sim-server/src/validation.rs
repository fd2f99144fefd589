//! Structured request validation.
//!
//! Bodies go through two stages: a JSON decode into the insert shape
//! (catching missing fields and wrong types) and then the shape's
//! `validator` rules (catching empty strings and out-of-range numbers).
//! Both stages report a list of [`FieldViolation`]s so clients see the
//! same error structure either way. The realtime channel reuses
//! [`violations_from_validator`] to describe rejected payloads.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::ApiError;

/// One field-level problem with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// camelCase path of the offending field, or `body` when the problem
    /// cannot be pinned to a field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Decode `bytes` as JSON into `T` and run its validation rules.
///
/// # Errors
///
/// Returns every violation found. A decode failure yields exactly one
/// violation since decoding stops at the first problem.
pub fn decode_and_validate<T>(bytes: &[u8]) -> Result<T, Vec<FieldViolation>>
where
    T: DeserializeOwned + Validate,
{
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value: T = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| vec![violation_from_path_error(&e)])?;
    de.end().map_err(|e| vec![violation_from_serde(&e)])?;
    validate(&value)?;
    Ok(value)
}

fn validate<T: Validate>(value: &T) -> Result<(), Vec<FieldViolation>> {
    value.validate().map_err(|e| violations_from_validator(&e))
}

/// Translate a decode error that carries the JSON path where it happened.
///
/// Missing and unknown fields are named by serde itself and reported at
/// the enclosing object, so the message wins there; wrong-typed values
/// (`"packetSize": "x"`) are named by their path.
pub fn violation_from_path_error(
    err: &serde_path_to_error::Error<serde_json::Error>,
) -> FieldViolation {
    let violation = violation_from_serde(err.inner());
    let path = err.path().to_string();
    if violation.field != "body" || path == "." {
        return violation;
    }
    FieldViolation {
        field: path,
        ..violation
    }
}

/// Translate a `serde_json` error into a violation, naming the field when
/// the message says which one.
pub fn violation_from_serde(err: &serde_json::Error) -> FieldViolation {
    let message = err.to_string();
    let field = quoted_field(&message).unwrap_or("body").to_owned();
    FieldViolation { field, message }
}

/// Pull the first backtick-quoted token out of a serde message such as
/// ``missing field `testId` at line 1 column 2``.
fn quoted_field(message: &str) -> Option<&str> {
    if !message.starts_with("missing field") && !message.starts_with("unknown field") {
        return None;
    }
    let (_, rest) = message.split_once('`')?;
    let (field, _) = rest.split_once('`')?;
    Some(field)
}

/// Flatten `validator` errors into violations, field names in camelCase.
pub fn violations_from_validator(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (field, kind) in fields {
        if let ValidationErrorsKind::Field(list) = kind {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                out.push(FieldViolation::new(camel_case(field), message));
            }
        }
    }
    out
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// JSON body extractor that decodes and validates `T`.
///
/// Rejects with [`ApiError::Validation`].
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid("body", e.body_text()))?;
        decode_and_validate(&bytes)
            .map(Self)
            .map_err(ApiError::Validation)
    }
}
