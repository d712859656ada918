//! Single-writer consolidation of per-field updates into one snapshot.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fields::FieldKind;
use crate::state::{FieldUpdate, FieldValue, MotorState};

/// Outcome of applying one field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyResult {
    pub changed: bool,
    /// Revision of the snapshot after this apply; increments only on an
    /// actual change.
    pub revision: u64,
}

/// Owns the canonical in-memory snapshot and applies one decoded update at
/// a time.
///
/// Values are compared with exact equality: the drives quantize before
/// publishing, so a republished identical value is a no-op, which makes
/// duplicate delivery from the bus idempotent. The feed carries no
/// sequence numbers, so a stale value for a field that has since moved on
/// is indistinguishable from a real change and will revert the field —
/// a known gap, not silently corrected here.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: MotorState,
    revision: u64,
    seen_kp: bool,
    seen_ki: bool,
    seen_kd: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one update into the snapshot, reporting whether it changed
    /// anything. No mutation happens for an identical value.
    #[allow(clippy::float_cmp)]
    pub fn apply(&mut self, update: &FieldUpdate) -> ApplyResult {
        match update.field {
            FieldKind::Kp => self.seen_kp = true,
            FieldKind::Ki => self.seen_ki = true,
            FieldKind::Kd => self.seen_kd = true,
            _ => {}
        }

        let changed = match update.value {
            FieldValue::Status(new) => {
                if update.field == FieldKind::Status && self.state.status != new {
                    self.state.status = new;
                    true
                } else {
                    false
                }
            }
            FieldValue::Number(new) => match self.numeric_slot(update.field) {
                Some(slot) if *slot != new => {
                    *slot = new;
                    true
                }
                _ => false,
            },
        };

        if changed {
            self.revision += 1;
        }
        ApplyResult {
            changed,
            revision: self.revision,
        }
    }

    /// A value copy of the current snapshot.
    pub fn snapshot(&self) -> MotorState {
        self.state.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether all three PID gains have been reported at least once since
    /// process start. Gates "complete triad" consumers such as a gains
    /// display; persistence never waits for it, so a flush may legitimately
    /// carry zero-default gains.
    pub fn pid_observed(&self) -> bool {
        self.seen_kp && self.seen_ki && self.seen_kd
    }

    fn numeric_slot(&mut self, field: FieldKind) -> Option<&mut f64> {
        match field {
            FieldKind::Speed => Some(&mut self.state.speed),
            FieldKind::Voltage => Some(&mut self.state.voltage),
            FieldKind::Frequency => Some(&mut self.state.frequency),
            FieldKind::Power => Some(&mut self.state.power),
            FieldKind::Kp => Some(&mut self.state.pid.kp),
            FieldKind::Ki => Some(&mut self.state.pid.ki),
            FieldKind::Kd => Some(&mut self.state.pid.kd),
            FieldKind::TargetRpm => Some(&mut self.state.target_rpm),
            FieldKind::Status => None,
        }
    }
}

/// Shared handle enforcing the single-writer discipline on the snapshot.
///
/// `apply` serializes concurrent callers through the write lock; readers
/// get a consistent value copy and never see a live reference.
#[derive(Debug, Clone, Default)]
pub struct SharedReconciler(Arc<RwLock<Reconciler>>);

impl SharedReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn apply(&self, update: &FieldUpdate) -> ApplyResult {
        self.0.write().await.apply(update)
    }

    pub async fn snapshot(&self) -> MotorState {
        self.0.read().await.snapshot()
    }

    pub async fn pid_observed(&self) -> bool {
        self.0.read().await.pid_observed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MotorStatus;
    use chrono::Utc;

    fn number(field: FieldKind, value: f64) -> FieldUpdate {
        FieldUpdate {
            field,
            value: FieldValue::Number(value),
            received_at: Utc::now(),
        }
    }

    fn status(value: MotorStatus) -> FieldUpdate {
        FieldUpdate {
            field: FieldKind::Status,
            value: FieldValue::Status(value),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn applying_the_same_value_twice_is_a_no_op_the_second_time() {
        let mut reconciler = Reconciler::new();
        let first = reconciler.apply(&number(FieldKind::Speed, 1500.0));
        assert!(first.changed);
        assert_eq!(first.revision, 1);

        let second = reconciler.apply(&number(FieldKind::Speed, 1500.0));
        assert!(!second.changed);
        assert_eq!(second.revision, 1);
    }

    #[test]
    fn a_change_to_one_field_never_touches_the_others() {
        let mut reconciler = Reconciler::new();
        reconciler.apply(&number(FieldKind::Voltage, 220.0));
        reconciler.apply(&status(MotorStatus::On));

        reconciler.apply(&number(FieldKind::Speed, 2500.0));

        let snapshot = reconciler.snapshot();
        assert_eq!(snapshot.speed, 2500.0);
        assert_eq!(snapshot.voltage, 220.0);
        assert_eq!(snapshot.status, MotorStatus::On);
        assert_eq!(snapshot.frequency, 0.0);
        assert_eq!(snapshot.power, 0.0);
        assert_eq!(snapshot.target_rpm, 0.0);
    }

    #[test]
    fn revision_increments_only_on_actual_change() {
        let mut reconciler = Reconciler::new();
        assert_eq!(reconciler.revision(), 0);
        reconciler.apply(&number(FieldKind::Power, 740.0));
        reconciler.apply(&number(FieldKind::Power, 740.0));
        reconciler.apply(&number(FieldKind::Power, 741.0));
        assert_eq!(reconciler.revision(), 2);
    }

    #[test]
    fn status_transitions_are_change_detected() {
        let mut reconciler = Reconciler::new();
        assert!(reconciler.apply(&status(MotorStatus::On)).changed);
        assert!(!reconciler.apply(&status(MotorStatus::On)).changed);
        assert!(reconciler.apply(&status(MotorStatus::Off)).changed);
    }

    #[test]
    fn pid_triad_is_observed_only_after_all_three_gains() {
        let mut reconciler = Reconciler::new();
        assert!(!reconciler.pid_observed());
        reconciler.apply(&number(FieldKind::Kp, 1.2));
        reconciler.apply(&number(FieldKind::Ki, 0.4));
        assert!(!reconciler.pid_observed());
        reconciler.apply(&number(FieldKind::Kd, 0.05));
        assert!(reconciler.pid_observed());
    }

    #[test]
    fn an_unchanged_gain_still_counts_as_observed() {
        // A drive reporting the zero default is still a report.
        let mut reconciler = Reconciler::new();
        let result = reconciler.apply(&number(FieldKind::Kp, 0.0));
        assert!(!result.changed);
        reconciler.apply(&number(FieldKind::Ki, 0.0));
        reconciler.apply(&number(FieldKind::Kd, 0.0));
        assert!(reconciler.pid_observed());
    }

    #[test]
    fn pid_gains_are_stored_independently() {
        let mut reconciler = Reconciler::new();
        reconciler.apply(&number(FieldKind::Ki, 0.4));
        let snapshot = reconciler.snapshot();
        assert_eq!(snapshot.pid.ki, 0.4);
        assert_eq!(snapshot.pid.kp, 0.0);
        assert_eq!(snapshot.pid.kd, 0.0);
    }

    #[tokio::test]
    async fn shared_handle_serializes_applies_and_copies_snapshots() {
        let shared = SharedReconciler::new();
        let mut handles = Vec::new();
        for i in 0..16u32 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                shared
                    .apply(&number(FieldKind::Speed, f64::from(i % 2)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let snapshot = shared.snapshot().await;
        assert!(snapshot.speed == 0.0 || snapshot.speed == 1.0);
    }
}
