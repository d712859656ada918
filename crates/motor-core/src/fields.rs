//! Feedback topic to field mapping.
//!
//! Every feedback topic carries exactly one scalar field. The mapping is
//! fixed configuration: a topic never changes meaning, and no message
//! updates more than one field.

use std::convert::TryFrom;
use std::fmt;
use std::time::Duration;

/// One independently reported field of the motor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    Speed,
    Voltage,
    Frequency,
    Power,
    Kp,
    Ki,
    Kd,
    TargetRpm,
    Status,
}

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Speed,
        FieldKind::Voltage,
        FieldKind::Frequency,
        FieldKind::Power,
        FieldKind::Kp,
        FieldKind::Ki,
        FieldKind::Kd,
        FieldKind::TargetRpm,
        FieldKind::Status,
    ];

    /// The feedback topic that carries this field.
    pub fn topic(self) -> &'static str {
        match self {
            FieldKind::Speed => "fb/speed",
            FieldKind::Voltage => "fb/vol",
            FieldKind::Frequency => "fb/freq",
            FieldKind::Power => "fb/power",
            FieldKind::Kp => "fb/kp",
            FieldKind::Ki => "fb/ki",
            FieldKind::Kd => "fb/kd",
            FieldKind::TargetRpm => "fb/sp",
            FieldKind::Status => "fb/status",
        }
    }

    /// The key under which structured payloads carry this field's value.
    pub fn short_key(self) -> &'static str {
        match self {
            FieldKind::Speed => "speed",
            FieldKind::Voltage => "vol",
            FieldKind::Frequency => "freq",
            FieldKind::Power => "power",
            FieldKind::Kp => "kp",
            FieldKind::Ki => "ki",
            FieldKind::Kd => "kd",
            FieldKind::TargetRpm => "sp",
            FieldKind::Status => "status",
        }
    }

    /// Debounce delay between a change to this field and the snapshot
    /// flush it triggers. Staggered per field so one physical event that
    /// moves several fields lands as few rows as possible.
    pub fn debounce_delay(self) -> Duration {
        let millis = match self {
            FieldKind::Speed | FieldKind::TargetRpm => 100,
            FieldKind::Voltage | FieldKind::Kp => 150,
            FieldKind::Frequency | FieldKind::Ki => 200,
            FieldKind::Power | FieldKind::Kd => 250,
            FieldKind::Status => 300,
        };
        Duration::from_millis(millis)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.short_key())
    }
}

impl TryFrom<&str> for FieldKind {
    type Error = &'static str;

    fn try_from(topic: &str) -> Result<Self, Self::Error> {
        FieldKind::ALL
            .into_iter()
            .find(|field| field.topic() == topic)
            .ok_or("Unknown feedback topic")
    }
}
