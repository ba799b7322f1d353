// Reading service - Use cases for ingesting and querying readings
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::telemetry_repository::{DeviceRegistry, NewReading, ReadingRepository};
use crate::domain::device::Device;
use crate::domain::freshness::is_online;
use crate::domain::reading::{Measurements, Reading, ReadingRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Validated `limit`/`skip` pair for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    pub limit: usize,
    pub skip: usize,
}

impl ListWindow {
    pub fn new(limit: Option<i64>, skip: Option<i64>) -> ServiceResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let skip = skip.unwrap_or(0);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ServiceError::validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if skip < 0 {
            return Err(ServiceError::validation("skip must not be negative"));
        }
        Ok(Self {
            limit: limit as usize,
            skip: skip as usize,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReadings {
    pub device: Device,
    pub readings: Vec<ReadingRecord>,
    pub total_records: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceLatest {
    pub device: Device,
    pub latest_reading: Option<Reading>,
    pub has_data: bool,
    pub is_online: bool,
}

#[derive(Clone)]
pub struct ReadingService {
    repository: Arc<dyn ReadingRepository>,
    registry: Arc<dyn DeviceRegistry>,
}

impl ReadingService {
    pub fn new(repository: Arc<dyn ReadingRepository>, registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn list_readings(
        &self,
        device_id: Option<&str>,
        window: ListWindow,
    ) -> ServiceResult<Vec<ReadingRecord>> {
        Ok(self
            .repository
            .query_readings(device_id, window.limit, window.skip)
            .await?)
    }

    pub async fn get_reading(&self, id: &str) -> ServiceResult<ReadingRecord> {
        self.repository
            .get_reading(id)
            .await?
            .ok_or_else(|| ServiceError::reading_not_found(id))
    }

    /// Store a new reading. The timestamp defaults to `now` (ingestion time).
    pub async fn create_reading(
        &self,
        device_id: String,
        measurements: Measurements,
        timestamp: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ServiceResult<ReadingRecord> {
        self.ensure_device_exists(&device_id).await?;
        let record = self
            .repository
            .insert_reading(NewReading {
                device_id,
                timestamp: timestamp.unwrap_or(now),
                measurements,
            })
            .await?;
        tracing::debug!(
            "Stored reading {} for device {}",
            record.reading.id,
            record.reading.device_id
        );
        Ok(record)
    }

    /// Replace every field of an existing reading.
    pub async fn update_reading(&self, id: &str, reading: NewReading) -> ServiceResult<ReadingRecord> {
        self.ensure_device_exists(&reading.device_id).await?;
        self.repository
            .replace_reading(id, reading)
            .await?
            .ok_or_else(|| ServiceError::reading_not_found(id))
    }

    pub async fn delete_reading(&self, id: &str) -> ServiceResult<()> {
        if self.repository.delete_reading(id).await? {
            Ok(())
        } else {
            Err(ServiceError::reading_not_found(id))
        }
    }

    pub async fn device_readings(&self, device_id: &str, window: ListWindow) -> ServiceResult<DeviceReadings> {
        let device = self.require_device(device_id).await?;
        let readings = self
            .repository
            .query_readings(Some(device_id), window.limit, window.skip)
            .await?;
        let total_records = self.repository.count_readings(device_id).await?;
        Ok(DeviceReadings {
            device,
            readings,
            total_records,
        })
    }

    pub async fn device_latest(&self, device_id: &str, now: DateTime<Utc>) -> ServiceResult<DeviceLatest> {
        let device = self.require_device(device_id).await?;
        let latest_reading = self.repository.latest_reading(device_id).await?;
        let is_online = is_online(latest_reading.as_ref().map(|r| r.timestamp), now);
        Ok(DeviceLatest {
            device,
            has_data: latest_reading.is_some(),
            latest_reading,
            is_online,
        })
    }

    async fn require_device(&self, device_id: &str) -> ServiceResult<Device> {
        self.registry
            .get_device(device_id)
            .await?
            .ok_or_else(|| ServiceError::device_not_found(device_id))
    }

    async fn ensure_device_exists(&self, device_id: &str) -> ServiceResult<()> {
        match self.registry.get_device(device_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::UnknownDevice(device_id.to_string())),
        }
    }
}
