//! Append-only snapshot log: the durable store contract.
//!
//! The core depends on exactly three operations — insert (store assigns
//! the timestamp), select-all newest-first, and select-latest — and
//! assumes nothing about the engine beyond durability of a successful
//! insert and read-your-writes on the latest row.

use chrono::{DateTime, Utc};
use motor_core::state::MotorState;
use sqlx::{PgPool, Row};

/// One persisted snapshot. Immutable once written.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MotorLogRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub speed: f64,
    pub voltage: f64,
    pub frequency: f64,
    pub power: f64,
    pub status: String,
    pub target_rpm: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

pub async fn insert_snapshot(
    pool: &PgPool,
    snapshot: &MotorState,
) -> Result<MotorLogRow, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO motor_logs (speed, voltage, frequency, power, status, target_rpm, kp, ki, kd)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
           RETURNING id, timestamp, speed, voltage, frequency, power, status, target_rpm, kp, ki, kd"#,
    )
    .bind(snapshot.speed)
    .bind(snapshot.voltage)
    .bind(snapshot.frequency)
    .bind(snapshot.power)
    .bind(snapshot.status.as_str())
    .bind(snapshot.target_rpm)
    .bind(snapshot.pid.kp)
    .bind(snapshot.pid.ki)
    .bind(snapshot.pid.kd)
    .fetch_one(pool)
    .await?;
    Ok(map_row(&row))
}

/// All log rows, newest first. The id tiebreak keeps ordering stable when
/// two rows share a timestamp.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<MotorLogRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, timestamp, speed, voltage, frequency, power, status, target_rpm, kp, ki, kd
           FROM motor_logs
           ORDER BY timestamp DESC, id DESC"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(map_row).collect())
}

pub async fn fetch_latest(pool: &PgPool) -> Result<Option<MotorLogRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, timestamp, speed, voltage, frequency, power, status, target_rpm, kp, ki, kd
           FROM motor_logs
           ORDER BY timestamp DESC, id DESC
           LIMIT 1"#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(map_row))
}

fn map_row(row: &sqlx::postgres::PgRow) -> MotorLogRow {
    MotorLogRow {
        id: row.get("id"),
        timestamp: row.get("timestamp"),
        speed: row.get("speed"),
        voltage: row.get("voltage"),
        frequency: row.get("frequency"),
        power: row.get("power"),
        status: row.get("status"),
        target_rpm: row.get("target_rpm"),
        kp: row.get("kp"),
        ki: row.get("ki"),
        kd: row.get("kd"),
    }
}
