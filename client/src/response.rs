//! Upstream response normalization.
//!
//! The service has shipped two wire formats: a legacy flat JSON body and a
//! JSON:API-style document with top-level `errors`/`data`/`meta`. The
//! normalizer maps recognized JSON:API documents onto [`CheckResult`] and
//! passes everything else through verbatim, so integrators on either wire
//! format keep working.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overall status of a login check.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The login attempt passed the check.
    Success,
    /// The check failed or the service reported an error.
    Error,
}

/// Normalized login check result.
///
/// The stable client-facing shape regardless of which wire format the
/// service replied with.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    /// Overall status.
    pub status: CheckStatus,
    /// Human-readable message from the service.
    pub message: String,
    /// Risk codes attached to the attempt; see
    /// [`risk_codes`](crate::types::risk_codes).
    pub codes: Vec<String>,
    /// Numeric risk score; 0 when the service reported none.
    pub risk_score: i64,
    /// Service environment that produced the reply.
    pub environment: String,
    /// Error code, present when `status` is [`CheckStatus::Error`] because
    /// the service returned an error document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the device had not been seen for this identity before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unrecognized_device: Option<bool>,
    /// Authentication outcome echoed back by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_outcome: Option<String>,
    /// Whether the service sent a notification email for this attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    /// Opaque metadata from the reply's `meta` document.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

/// Reply of a login check.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckResponse {
    /// A recognized JSON:API document, mapped to the stable client shape.
    Normalized(CheckResult),
    /// An unrecognized or legacy flat body, passed through unchanged.
    Raw(Value),
}

impl CheckResponse {
    /// The normalized result, when the upstream shape was recognized.
    #[must_use]
    pub const fn normalized(&self) -> Option<&CheckResult> {
        match self {
            Self::Normalized(result) => Some(result),
            Self::Raw(_) => None,
        }
    }

    /// Consume the reply, yielding the normalized result if there is one.
    #[must_use]
    pub fn into_normalized(self) -> Option<CheckResult> {
        match self {
            Self::Normalized(result) => Some(result),
            Self::Raw(_) => None,
        }
    }
}

/// Map a raw upstream reply onto the stable client shape.
///
/// Rules, in order: non-object bodies pass through; a non-empty `errors`
/// array maps to an error result; a structured `data.attributes` document
/// maps to a full result; anything else passes through verbatim.
#[must_use]
pub fn normalize(raw: Value) -> CheckResponse {
    let Some(object) = raw.as_object() else {
        tracing::debug!("non-object upstream body, passing through");
        return CheckResponse::Raw(raw);
    };

    let meta = object.get("meta").and_then(Value::as_object);

    if let Some(error) = object
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        return CheckResponse::Normalized(normalize_error(error, meta));
    }

    if let Some(attributes) = object
        .get("data")
        .and_then(|data| data.get("attributes"))
        .and_then(Value::as_object)
    {
        return CheckResponse::Normalized(normalize_attributes(attributes, meta));
    }

    tracing::debug!("legacy or unrecognized upstream shape, passing through");
    CheckResponse::Raw(raw)
}

/// First element of a JSON:API `errors` document.
fn normalize_error(error: &Value, meta: Option<&Map<String, Value>>) -> CheckResult {
    let message = string_field(error, "detail")
        .or_else(|| string_field(error, "title"))
        .unwrap_or_else(|| "Unknown error".to_string());
    let code = string_field(error, "code").unwrap_or_else(|| "unknown_error".to_string());

    CheckResult {
        status: CheckStatus::Error,
        message,
        codes: Vec::new(),
        risk_score: 0,
        environment: meta_string(meta, "environment").unwrap_or_else(|| "unknown".to_string()),
        error: Some(code),
        unrecognized_device: None,
        authentication_outcome: None,
        email_sent: None,
        meta: meta.cloned().unwrap_or_default(),
    }
}

/// JSON:API `data.attributes` resource document.
///
/// The missing-`environment` default here is `"production"`, not the error
/// arm's `"unknown"`; the service has always been asymmetric about this.
fn normalize_attributes(
    attributes: &Map<String, Value>,
    meta: Option<&Map<String, Value>>,
) -> CheckResult {
    let status = if attributes.get("status").and_then(Value::as_str) == Some("pass") {
        CheckStatus::Success
    } else {
        CheckStatus::Error
    };

    let codes = attributes
        .get("risk_codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    CheckResult {
        status,
        message: attributes
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        codes,
        risk_score: attributes
            .get("risk_score")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        environment: meta_string(meta, "environment").unwrap_or_else(|| "production".to_string()),
        error: None,
        unrecognized_device: attributes.get("unrecognized_device").and_then(Value::as_bool),
        authentication_outcome: attributes
            .get("authentication_outcome")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        email_sent: meta
            .and_then(|meta| meta.get("email_sent"))
            .and_then(Value::as_bool),
        meta: meta.cloned().unwrap_or_default(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(ToString::to_string)
}

fn meta_string(meta: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    meta.and_then(|meta| meta.get(key))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
