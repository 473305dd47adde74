//! Health & readiness handlers.
//!
//! - GET /q/health/live   -> liveness, never performs I/O
//! - GET /q/health/ready  -> readiness, checks database connectivity
//! - GET /q/health        -> both checks combined
//!
//! Bodies follow the MicroProfile Health layout:
//! `{"status":"UP","checks":[{"name":"...","status":"UP"}]}`.

use crate::services::device_service::DeviceService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;

const LIVENESS_CHECK: &str = "Devices API is alive";
const READINESS_CHECK: &str = "Database connection";

/// `GET /q/health/live`
pub async fn live() -> impl IntoResponse {
    HealthReport::from_checks(vec![CheckStatus::up(LIVENESS_CHECK)])
}

/// `GET /q/health/ready`
///
/// HTTP 200 while the database answers `SELECT 1`, HTTP 503 otherwise.
pub async fn ready(State(service): State<DeviceService>) -> impl IntoResponse {
    HealthReport::from_checks(vec![database_check(&service).await])
}

/// `GET /q/health`
pub async fn health(State(service): State<DeviceService>) -> impl IntoResponse {
    HealthReport::from_checks(vec![
        CheckStatus::up(LIVENESS_CHECK),
        database_check(&service).await,
    ])
}

async fn database_check(service: &DeviceService) -> CheckStatus {
    match service.ping().await {
        Ok(()) => CheckStatus::up(READINESS_CHECK),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            CheckStatus::down(READINESS_CHECK, e.to_string())
        }
    }
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
enum Status {
    Up,
    Down,
}

#[derive(Serialize)]
struct HealthReport {
    status: Status,
    checks: Vec<CheckStatus>,
}

impl HealthReport {
    fn from_checks(checks: Vec<CheckStatus>) -> (StatusCode, Json<HealthReport>) {
        let overall = if checks.iter().all(|c| c.status == Status::Up) {
            Status::Up
        } else {
            Status::Down
        };
        let code = match overall {
            Status::Up => StatusCode::OK,
            Status::Down => StatusCode::SERVICE_UNAVAILABLE,
        };

        (
            code,
            Json(HealthReport {
                status: overall,
                checks,
            }),
        )
    }
}

#[derive(Serialize)]
struct CheckStatus {
    name: &'static str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<BTreeMap<&'static str, String>>,
}

impl CheckStatus {
    fn up(name: &'static str) -> Self {
        Self {
            name,
            status: Status::Up,
            data: None,
        }
    }

    fn down(name: &'static str, error: String) -> Self {
        Self {
            name,
            status: Status::Down,
            data: Some(BTreeMap::from([("error", error)])),
        }
    }
}
