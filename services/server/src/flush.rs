use motor_core::scheduler::FlushSink;
use motor_core::state::MotorState;
use sqlx::PgPool;

use crate::repo::motor_logs;

/// Scheduler sink that appends snapshots to the Postgres log.
#[derive(Clone)]
pub struct PgFlushSink {
    pool: PgPool,
}

impl PgFlushSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl FlushSink for PgFlushSink {
    type Error = sqlx::Error;

    async fn flush(&mut self, snapshot: MotorState) -> Result<(), Self::Error> {
        motor_logs::insert_snapshot(&self.pool, &snapshot).await?;
        Ok(())
    }
}
