//! Snapshot and update value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::FieldKind;

/// Reported on/off state of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotorStatus {
    On,
    Off,
    #[default]
    Unknown,
}

impl MotorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MotorStatus::On => "ON",
            MotorStatus::Off => "OFF",
            MotorStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// PID controller gains as reported by the drive.
///
/// Each gain arrives on its own topic and is stored independently; nothing
/// here couples the three. Consumers that need a complete triad should
/// gate on [`crate::reconciler::Reconciler::pid_observed`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// The consolidated snapshot of the monitored motor.
///
/// Every field defaults to zero / UNKNOWN until its first feedback message
/// arrives, and is only ever overwritten by a message for that specific
/// field. Exactly one live instance exists per backend process, owned by
/// the reconciler; everyone else works on value copies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorState {
    pub speed: f64,
    pub voltage: f64,
    pub frequency: f64,
    pub power: f64,
    pub status: MotorStatus,
    pub target_rpm: f64,
    pub pid: PidGains,
}

/// A decoded value for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Status(MotorStatus),
}

/// A single decoded feedback message.
///
/// Created by the decoder, merged into the snapshot by the reconciler,
/// then discarded — updates are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field: FieldKind,
    pub value: FieldValue,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_to_zero_and_unknown() {
        let state = MotorState::default();
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.voltage, 0.0);
        assert_eq!(state.frequency, 0.0);
        assert_eq!(state.power, 0.0);
        assert_eq!(state.status, MotorStatus::Unknown);
        assert_eq!(state.target_rpm, 0.0);
        assert_eq!(state.pid, PidGains::default());
    }

    #[test]
    fn snapshot_serializes_with_api_field_names() {
        let json = serde_json::to_value(MotorState::default()).unwrap();
        assert!(json.get("targetRpm").is_some());
        assert_eq!(json["status"], "UNKNOWN");
        assert_eq!(json["pid"]["kp"], 0.0);
    }

    #[test]
    fn status_round_trips_as_uppercase() {
        let on: MotorStatus = serde_json::from_str("\"ON\"").unwrap();
        assert_eq!(on, MotorStatus::On);
        assert_eq!(serde_json::to_string(&MotorStatus::Off).unwrap(), "\"OFF\"");
        assert_eq!(MotorStatus::Unknown.to_string(), "UNKNOWN");
    }
}
