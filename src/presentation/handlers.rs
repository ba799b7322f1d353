// HTTP request handlers
use crate::application::dashboard_service::{DashboardQuery, DeviceDashboard};
use crate::application::error::ServiceError;
use crate::application::reading_service::{DeviceLatest, DeviceReadings, ListWindow};
use crate::application::telemetry_repository::NewReading;
use crate::application::weather_service::WeatherReport;
use crate::domain::device_stats::DeviceStats;
use crate::domain::reading::{Measurements, MeasurementsPayload, ReadingRecord};
use crate::domain::time_range::RangeToken;
use crate::infrastructure::http_response::{ApiResult, MessageBody};
use crate::presentation::app_state::AppState;
use crate::presentation::extract::{ValidJson, ValidQuery};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub device_id: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReadingBody {
    pub device_id: String,
    pub measurements: MeasurementsPayload,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReadingBody {
    pub device_id: String,
    pub measurements: MeasurementsPayload,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub range: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub days: Option<u32>,
}

fn validate_measurements(payload: MeasurementsPayload) -> Result<Measurements, ServiceError> {
    Measurements::try_from(payload).map_err(|e| ServiceError::validation(e.to_string()))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List readings, newest first, optionally for one device
pub async fn list_readings(
    ValidQuery(query): ValidQuery<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ReadingRecord>>> {
    let window = ListWindow::new(query.limit, query.skip)?;
    let readings = state
        .reading_service
        .list_readings(query.device_id.as_deref(), window)
        .await?;
    Ok(Json(readings))
}

pub async fn get_reading(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ReadingRecord>> {
    Ok(Json(state.reading_service.get_reading(&id).await?))
}

pub async fn create_reading(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<CreateReadingBody>,
) -> ApiResult<(StatusCode, Json<ReadingRecord>)> {
    let measurements = validate_measurements(body.measurements)?;
    let record = state
        .reading_service
        .create_reading(body.device_id, measurements, body.timestamp, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_reading(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<UpdateReadingBody>,
) -> ApiResult<Json<ReadingRecord>> {
    let measurements = validate_measurements(body.measurements)?;
    let record = state
        .reading_service
        .update_reading(
            &id,
            NewReading {
                device_id: body.device_id,
                timestamp: body.timestamp,
                measurements,
            },
        )
        .await?;
    Ok(Json(record))
}

pub async fn delete_reading(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MessageBody>> {
    state.reading_service.delete_reading(&id).await?;
    Ok(Json(MessageBody {
        message: "Sensor data deleted successfully!".to_string(),
    }))
}

pub async fn device_readings(
    Path(device_id): Path<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeviceReadings>> {
    let window = ListWindow::new(query.limit, query.skip)?;
    Ok(Json(
        state
            .reading_service
            .device_readings(&device_id, window)
            .await?,
    ))
}

pub async fn device_latest(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeviceLatest>> {
    Ok(Json(
        state
            .reading_service
            .device_latest(&device_id, Utc::now())
            .await?,
    ))
}

/// Chart, table page and summary for one device over a time range
pub async fn device_dashboard(
    Path(device_id): Path<String>,
    ValidQuery(params): ValidQuery<DashboardParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeviceDashboard>> {
    let token = params.range.as_deref().unwrap_or(&state.default_range);
    if token == "custom" {
        if let (Some(start), Some(end)) = (params.start, params.end) {
            if start > end {
                return Err(ServiceError::validation("start must not be after end").into());
            }
        }
    }

    let query = DashboardQuery {
        range: RangeToken::parse(token, params.start, params.end),
        page: params.page.unwrap_or(1),
    };

    let dashboard = state
        .dashboard_service
        .get_dashboard(&device_id, &query, Utc::now())
        .await?;
    Ok(Json(dashboard))
}

/// Reading counts, latest values and online state for every device
pub async fn fleet_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DeviceStats>>> {
    Ok(Json(state.fleet_service.fleet_stats(Utc::now()).await?))
}

pub async fn weather(
    ValidQuery(params): ValidQuery<WeatherParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WeatherReport>> {
    let report = state
        .weather_service
        .lookup(params.lat.as_deref(), params.lon.as_deref(), params.days)
        .await?;
    Ok(Json(report))
}
