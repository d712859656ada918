//! Bridge from raw feed messages to the reconciler and scheduler.

use motor_core::decode::{self, DecodeError};
use motor_core::reconciler::SharedReconciler;
use motor_core::scheduler::FieldChange;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Ingestor {
    reconciler: SharedReconciler,
    changes: mpsc::Sender<FieldChange>,
}

impl Ingestor {
    pub fn new(reconciler: SharedReconciler, changes: mpsc::Sender<FieldChange>) -> Self {
        Self {
            reconciler,
            changes,
        }
    }

    /// Decode one message, apply it, and notify the scheduler if the
    /// snapshot actually changed. Undecodable messages are dropped with a
    /// warning; a full change queue drops only the notification, never the
    /// state update itself.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let update = match decode::decode(topic, payload) {
            Ok(update) => update,
            Err(DecodeError::UnknownTopic(topic)) => {
                warn!(topic, "message on unrecognized topic dropped");
                return;
            }
        };

        let result = self.reconciler.apply(&update).await;
        if !result.changed {
            debug!(field = %update.field, "update matched current value, no-op");
            return;
        }

        let change = FieldChange {
            field: update.field,
            revision: result.revision,
        };
        if self.changes.try_send(change).is_err() {
            warn!(field = %update.field, "change queue full; change will ride a later flush");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_core::fields::FieldKind;
    use motor_core::state::MotorStatus;

    fn make_ingestor(capacity: usize) -> (Ingestor, mpsc::Receiver<FieldChange>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Ingestor::new(SharedReconciler::new(), tx), rx)
    }

    #[tokio::test]
    async fn a_changed_field_reaches_both_the_snapshot_and_the_queue() {
        let (ingestor, mut changes) = make_ingestor(4);

        ingestor.handle_message("fb/speed", b"1450.5").await;

        let change = changes.try_recv().expect("change notification");
        assert_eq!(change.field, FieldKind::Speed);
        assert_eq!(ingestor.reconciler.snapshot().await.speed, 1450.5);
    }

    #[tokio::test]
    async fn repeated_values_do_not_queue_changes() {
        let (ingestor, mut changes) = make_ingestor(4);

        ingestor.handle_message("fb/vol", b"220.0").await;
        ingestor.handle_message("fb/vol", b"220.0").await;

        assert!(changes.try_recv().is_ok());
        assert!(changes.try_recv().is_err(), "duplicate must not notify");
    }

    #[tokio::test]
    async fn unknown_topics_are_ignored() {
        let (ingestor, mut changes) = make_ingestor(4);

        ingestor.handle_message("fb/unknown", b"1.0").await;

        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn a_full_queue_still_updates_the_snapshot() {
        let (ingestor, mut changes) = make_ingestor(1);

        ingestor.handle_message("fb/status", b"1").await;
        ingestor.handle_message("fb/speed", b"900.0").await;

        let snapshot = ingestor.reconciler.snapshot().await;
        assert_eq!(snapshot.status, MotorStatus::On);
        assert_eq!(snapshot.speed, 900.0);
        // Only the first notification fit.
        assert_eq!(changes.try_recv().unwrap().field, FieldKind::Status);
        assert!(changes.try_recv().is_err());
    }
}
