//! Feedback payload decoding.
//!
//! The feed carries two payload generations on every topic: legacy devices
//! publish a bare scalar (`"1234.5"`), newer ones a structured object
//! carrying the field under its short key (`{"speed": 1234.5}`). The
//! decoder must accept both and never fail hard on either — a malformed
//! payload degrades to a zero value, it does not block the pipeline.

use chrono::Utc;
use serde_json::Value;
use std::convert::TryFrom;

use crate::fields::FieldKind;
use crate::state::{FieldUpdate, FieldValue, MotorStatus};

/// How the raw payload was interpreted.
///
/// `Structured` only when the payload parses as a JSON object that carries
/// the field's own short key; everything else — parse failure, a
/// non-object document, an object missing the key — is the raw text taken
/// as the literal scalar. The fallback is an explicit branch, not a caught
/// error path.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    Structured(Value),
    RawScalar(String),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("no field mapping for topic '{0}'")]
    UnknownTopic(String),
}

/// Decode one raw feed message into a typed field update.
///
/// Pure function of its inputs apart from the receive timestamp. The only
/// failure is an unmapped topic; payload content never errors.
pub fn decode(topic: &str, payload: &[u8]) -> Result<FieldUpdate, DecodeError> {
    let field = FieldKind::try_from(topic)
        .map_err(|_| DecodeError::UnknownTopic(topic.to_owned()))?;
    let text = String::from_utf8_lossy(payload);
    let decoded = classify(field, &text);

    let value = match field {
        FieldKind::Status => FieldValue::Status(parse_status(&scalar_text(&decoded))),
        _ => FieldValue::Number(coerce_number(&decoded)),
    };

    Ok(FieldUpdate {
        field,
        value,
        received_at: Utc::now(),
    })
}

fn classify(field: FieldKind, text: &str) -> DecodedPayload {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text)
        && let Some(value) = map.get(field.short_key())
    {
        return DecodedPayload::Structured(value.clone());
    }
    DecodedPayload::RawScalar(text.to_owned())
}

/// Best-effort numeric coercion: anything that does not parse as a finite
/// number (including NaN) becomes 0.0.
fn coerce_number(decoded: &DecodedPayload) -> f64 {
    match decoded {
        DecodedPayload::Structured(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        DecodedPayload::Structured(Value::String(s)) => parse_scalar(s),
        DecodedPayload::Structured(_) => 0.0,
        DecodedPayload::RawScalar(s) => parse_scalar(s),
    }
}

fn parse_scalar(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_nan() => 0.0,
        Ok(v) => v,
        Err(_) => 0.0,
    }
}

fn scalar_text(decoded: &DecodedPayload) -> String {
    match decoded {
        DecodedPayload::Structured(Value::String(s)) => s.clone(),
        DecodedPayload::Structured(Value::Bool(b)) => b.to_string(),
        DecodedPayload::Structured(Value::Number(n)) => n.to_string(),
        DecodedPayload::Structured(_) => String::new(),
        DecodedPayload::RawScalar(s) => s.clone(),
    }
}

/// Status matching against the accepted truthy set; anything else is OFF.
fn parse_status(s: &str) -> MotorStatus {
    match s.trim().to_lowercase().as_str() {
        "on" | "1" | "true" => MotorStatus::On,
        _ => MotorStatus::Off,
    }
}
