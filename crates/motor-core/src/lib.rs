//! Shared motor-telemetry core: feedback decoding, state reconciliation,
//! and write scheduling.
//!
//! This crate holds everything both the backend logger and a live client
//! mirror need to turn the per-field feedback stream into one coherent
//! snapshot: the topic/field mapping, the dual-format payload decoder, the
//! single-writer reconciler, and the debounce + watchdog write scheduler.
//! Persistence and transport live in the consuming service.

pub mod decode;
pub mod fields;
pub mod reconciler;
pub mod scheduler;
pub mod state;

pub use decode::{DecodeError, DecodedPayload, decode};
pub use fields::FieldKind;
pub use reconciler::{ApplyResult, Reconciler, SharedReconciler};
pub use scheduler::{FieldChange, FlushSink, ScheduleConfig, run_write_scheduler};
pub use state::{FieldUpdate, FieldValue, MotorState, MotorStatus, PidGains};
