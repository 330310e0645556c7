use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::LedgerService;
use crate::domain::{DEFAULT_USER, DailyPoints, Points, PointsRecord};

use super::error::ApiError;

/// Window used by the history endpoint when `days` is absent or unparseable.
const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Body accepted by the add/reduce endpoints. `points` stays a raw JSON value
/// until coercion so the API can tell "not an integer" apart from
/// "not positive".
#[derive(Debug, Deserialize)]
pub struct PointsMutation {
    #[serde(default)]
    points: Option<Value>,
    description: Option<String>,
    user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PointsSummaryBody {
    total_points: Points,
    records: Vec<PointsRecord>,
}

#[derive(Debug, Serialize)]
pub struct MutationBody {
    message: String,
    record: PointsRecord,
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    days: Option<String>,
    user: Option<String>,
}

/// GET /api/points - derived balance and full history for a user.
pub async fn get_points(
    State(service): State<Arc<LedgerService>>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<PointsSummaryBody>, ApiError> {
    let user = params.user.as_deref().unwrap_or(DEFAULT_USER);
    let summary = service.points_summary(user).await?;

    Ok(Json(PointsSummaryBody {
        total_points: summary.total_points,
        records: summary.records,
    }))
}

/// POST /api/points/add - record a points gain.
pub async fn add_points(
    State(service): State<Arc<LedgerService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationBody>, ApiError> {
    let mutation = parse_mutation(body)?;
    let points = coerce_points(mutation.points.as_ref())?;
    let user = mutation.user.as_deref().unwrap_or(DEFAULT_USER);

    let record = service.add_points(user, points, mutation.description).await?;

    Ok(Json(MutationBody {
        message: "points added".to_string(),
        record,
    }))
}

/// POST /api/points/reduce - record a points reduction.
/// Callers submit the magnitude; the stored delta is negated.
pub async fn reduce_points(
    State(service): State<Arc<LedgerService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MutationBody>, ApiError> {
    let mutation = parse_mutation(body)?;
    let points = coerce_points(mutation.points.as_ref())?;
    let user = mutation.user.as_deref().unwrap_or(DEFAULT_USER);

    let record = service
        .reduce_points(user, points, mutation.description)
        .await?;

    Ok(Json(MutationBody {
        message: "points reduced".to_string(),
        record,
    }))
}

/// GET /api/points/history - daily buckets over the trailing window.
pub async fn points_history(
    State(service): State<Arc<LedgerService>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<DailyPoints>>, ApiError> {
    let user = params.user.as_deref().unwrap_or(DEFAULT_USER);
    let days = params
        .days
        .and_then(|d| d.parse().ok())
        .unwrap_or(DEFAULT_HISTORY_DAYS);

    Ok(Json(service.daily_history(user, days).await?))
}

/// GET /api/users - distinct user identifiers in the ledger.
pub async fn list_users(
    State(service): State<Arc<LedgerService>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(service.list_users().await?))
}

/// Reject absent, malformed, non-object, or empty bodies before reading any
/// field out of them.
fn parse_mutation(body: Result<Json<Value>, JsonRejection>) -> Result<PointsMutation, ApiError> {
    let Json(value) = body.map_err(|_| ApiError::InvalidBody)?;

    match value.as_object() {
        Some(map) if !map.is_empty() => {}
        _ => return Err(ApiError::InvalidBody),
    }

    serde_json::from_value(value).map_err(|_| ApiError::InvalidBody)
}

/// Coerce the raw `points` value to an integer. JSON integers and strings
/// that parse as integers are accepted; a missing value coerces to 0 and is
/// rejected downstream as non-positive.
fn coerce_points(value: Option<&Value>) -> Result<Points, ApiError> {
    match value {
        None => Ok(0),
        Some(Value::Number(n)) => n.as_i64().ok_or(ApiError::PointsNotInteger),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| ApiError::PointsNotInteger),
        Some(_) => Err(ApiError::PointsNotInteger),
    }
}
