// Dashboard service - Use case for building a device's chart, table and summary
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::telemetry_repository::{DeviceRegistry, ReadingRepository};
use crate::domain::device::Device;
use crate::domain::pagination::{paginate, Page};
use crate::domain::reading::{FrequencyStatus, Reading};
use crate::domain::series::{downsample, filter_readings, max_chart_points, ChartPoint};
use crate::domain::summary::{summarize, ReadingSummary};
use crate::domain::time_range::{resolve_range, Interval, RangeToken};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DashboardQuery {
    /// `None` disables time filtering.
    pub range: Option<RangeToken>,
    pub page: i64,
}

/// A table row: the reading plus its frequency band.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub reading: Reading,
    pub frequency_status: FrequencyStatus,
}

impl From<&Reading> for TableRow {
    fn from(reading: &Reading) -> Self {
        Self {
            reading: reading.clone(),
            frequency_status: FrequencyStatus::classify(reading.measurements.frequency),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDashboard {
    pub device: Device,
    pub range: Option<&'static str>,
    pub interval: Option<Interval>,
    pub chart: Vec<ChartPoint>,
    pub table: Page<TableRow>,
    pub summary: ReadingSummary,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn ReadingRepository>,
    registry: Arc<dyn DeviceRegistry>,
    page_size: usize,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        registry: Arc<dyn DeviceRegistry>,
        page_size: usize,
    ) -> Self {
        Self {
            repository,
            registry,
            page_size: page_size.max(1),
        }
    }

    pub async fn get_dashboard(
        &self,
        device_id: &str,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> ServiceResult<DeviceDashboard> {
        let device = self
            .registry
            .get_device(device_id)
            .await?
            .ok_or_else(|| ServiceError::device_not_found(device_id))?;

        let readings = self.repository.device_readings(device_id).await?;
        let interval = resolve_range(query.range.as_ref(), now);
        let filtered = filter_readings(&readings, interval.as_ref());

        tracing::debug!(
            "Dashboard for {}: range={:?} matched {} of {} readings",
            device_id,
            query.range.as_ref().map(RangeToken::as_str),
            filtered.len(),
            readings.len()
        );

        let ascending = filtered.ascending();
        let chart = downsample(&ascending, max_chart_points(query.range.as_ref()))
            .iter()
            .map(|r| ChartPoint::from(*r))
            .collect();

        let descending = filtered.descending();
        let table = paginate(&descending, query.page, self.page_size).map(TableRow::from);

        let summary = summarize(filtered.as_slice().iter().copied());

        Ok(DeviceDashboard {
            device,
            range: query.range.as_ref().map(RangeToken::as_str),
            interval,
            chart,
            table,
            summary,
        })
    }
}
