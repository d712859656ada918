use motor_core::reconciler::SharedReconciler;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Owner of the live snapshot; HTTP readers take value copies from it.
    pub reconciler: SharedReconciler,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            reconciler: SharedReconciler::new(),
        }
    }

    /// Build state around an existing reconciler (shared with the
    /// ingestion pipeline).
    pub fn with_reconciler(pool: PgPool, reconciler: SharedReconciler) -> Self {
        Self { pool, reconciler }
    }
}
