use crate::http::response::{bad_request, internal_error};
use crate::repo::motor_logs;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use motor_core::state::{MotorState, MotorStatus, PidGains};
use serde::Deserialize;

/// GET /api/logs — all records, newest first.
pub async fn get_logs(State(state): State<AppState>) -> axum::response::Response {
    match motor_logs::fetch_all(&state.pool).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/logs/latest — most recent record, or JSON null when the log
/// is empty.
pub async fn get_latest(State(state): State<AppState>) -> axum::response::Response {
    match motor_logs::fetch_latest(&state.pool).await {
        Ok(row) => Json(row).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ManualLogBody {
    pub speed: Option<f64>,
    pub voltage: Option<f64>,
    pub frequency: Option<f64>,
    pub power: Option<f64>,
    pub status: Option<String>,
    #[serde(rename = "targetRpm")]
    pub target_rpm: Option<f64>,
    pub pid: Option<ManualPidBody>,
}

#[derive(Debug, Deserialize)]
pub struct ManualPidBody {
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
}

impl ManualLogBody {
    /// All fields present (an empty status string counts as missing),
    /// otherwise None.
    fn into_snapshot(self) -> Option<MotorState> {
        let status_text = self.status.filter(|s| !s.is_empty())?;
        let pid = self.pid?;
        Some(MotorState {
            speed: self.speed?,
            voltage: self.voltage?,
            frequency: self.frequency?,
            power: self.power?,
            status: parse_status(&status_text),
            target_rpm: self.target_rpm?,
            pid: PidGains {
                kp: pid.kp?,
                ki: pid.ki?,
                kd: pid.kd?,
            },
        })
    }
}

fn parse_status(text: &str) -> MotorStatus {
    match text.trim().to_uppercase().as_str() {
        "ON" => MotorStatus::On,
        "OFF" => MotorStatus::Off,
        _ => MotorStatus::Unknown,
    }
}

/// POST /api/logs — manual record insertion.
pub async fn post_log(
    State(state): State<AppState>,
    Json(body): Json<ManualLogBody>,
) -> axum::response::Response {
    let Some(snapshot) = body.into_snapshot() else {
        return bad_request("Missing required fields");
    };
    match motor_logs::insert_snapshot(&state.pool, &snapshot).await {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => internal_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_body() -> ManualLogBody {
        ManualLogBody {
            speed: Some(1450.0),
            voltage: Some(220.0),
            frequency: Some(50.0),
            power: Some(740.0),
            status: Some("ON".to_owned()),
            target_rpm: Some(1500.0),
            pid: Some(ManualPidBody {
                kp: Some(1.2),
                ki: Some(0.4),
                kd: Some(0.05),
            }),
        }
    }

    #[test]
    fn complete_body_converts_to_a_snapshot() {
        let snapshot = full_body().into_snapshot().expect("complete body");
        assert_eq!(snapshot.speed, 1450.0);
        assert_eq!(snapshot.status, MotorStatus::On);
        assert_eq!(snapshot.pid.ki, 0.4);
    }

    #[test]
    fn missing_pid_is_rejected() {
        let body = ManualLogBody {
            pid: None,
            ..full_body()
        };
        assert!(body.into_snapshot().is_none());
    }

    #[test]
    fn missing_gain_inside_pid_is_rejected() {
        let body = ManualLogBody {
            pid: Some(ManualPidBody {
                kp: Some(1.0),
                ki: None,
                kd: Some(0.1),
            }),
            ..full_body()
        };
        assert!(body.into_snapshot().is_none());
    }

    #[test]
    fn empty_status_counts_as_missing() {
        let body = ManualLogBody {
            status: Some(String::new()),
            ..full_body()
        };
        assert!(body.into_snapshot().is_none());
    }

    #[test]
    fn unrecognized_status_text_maps_to_unknown() {
        let body = ManualLogBody {
            status: Some("standby".to_owned()),
            ..full_body()
        };
        assert_eq!(
            body.into_snapshot().unwrap().status,
            MotorStatus::Unknown
        );
    }
}
