//! Debounced, watchdog-guarded write-back of snapshots.
//!
//! Two independent triggers produce flushes:
//!
//! - a changed field arms a short per-field debounce deadline, so a burst
//!   of updates from one physical event lands as a single row rather than
//!   one row per message;
//! - a watchdog forces a flush whenever nothing has been written for the
//!   idle threshold, bounding the staleness of the durable log under a
//!   completely quiescent feed.
//!
//! Every flush writes the full current snapshot, never a per-field diff,
//! so overlapping triggers coalesce at the store. A failed flush is logged
//! and left for the next trigger; there is no immediate retry.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::fields::FieldKind;
use crate::reconciler::SharedReconciler;
use crate::state::MotorState;

/// Destination of snapshot flushes.
pub trait FlushSink: Send {
    type Error: std::fmt::Display + Send;

    fn flush(
        &mut self,
        snapshot: MotorState,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A change notification from the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    pub field: FieldKind,
    pub revision: u64,
}

/// Timing knobs for the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    /// How often the watchdog checks the idle clock.
    pub watchdog_poll: Duration,
    /// Forced-flush threshold for a quiescent feed.
    pub idle_threshold: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            watchdog_poll: Duration::from_secs(35),
            idle_threshold: Duration::from_secs(30),
        }
    }
}

/// Run the write scheduler until the change channel closes.
///
/// The snapshot written is always a value copy taken at flush time, so an
/// in-flight write is unaffected by later applies.
pub async fn run_write_scheduler<S: FlushSink>(
    mut changes: mpsc::Receiver<FieldChange>,
    reconciler: SharedReconciler,
    mut sink: S,
    config: ScheduleConfig,
) {
    // At most one armed deadline per field; a re-trigger while armed rides
    // the existing deadline, which is what coalesces a burst.
    let mut pending: BTreeMap<FieldKind, Instant> = BTreeMap::new();
    let mut watchdog = time::interval(config.watchdog_poll);
    watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_flush = Instant::now();

    loop {
        let next_due = pending.values().min().copied();
        let debounce_elapsed = async {
            match next_due {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            change = changes.recv() => match change {
                None => break,
                Some(change) => {
                    pending
                        .entry(change.field)
                        .or_insert_with(|| Instant::now() + change.field.debounce_delay());
                    debug!(field = %change.field, revision = change.revision, "debounce armed");
                }
            },

            () = debounce_elapsed => {
                let now = Instant::now();
                pending.retain(|_, deadline| *deadline > now);
                flush(&reconciler, &mut sink).await;
                last_flush = Instant::now();
            }

            _ = watchdog.tick() => {
                if last_flush.elapsed() >= config.idle_threshold {
                    debug!("idle threshold exceeded, forcing flush");
                    flush(&reconciler, &mut sink).await;
                    last_flush = Instant::now();
                }
            }
        }
    }

    // Change channel closed: write anything still armed so shutdown does
    // not drop the tail of a burst.
    if !pending.is_empty() {
        flush(&reconciler, &mut sink).await;
    }
}

async fn flush<S: FlushSink>(reconciler: &SharedReconciler, sink: &mut S) {
    let snapshot = reconciler.snapshot().await;
    if let Err(e) = sink.flush(snapshot).await {
        warn!(error = %e, "snapshot flush failed; will retry on next trigger");
    }
}
