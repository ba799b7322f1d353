// Repository traits for device and reading data access
use crate::domain::device::Device;
use crate::domain::reading::{Measurements, Reading, ReadingRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields of a reading supplied by a caller; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub measurements: Measurements,
}

#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn get_device(&self, id: &str) -> anyhow::Result<Option<Device>>;

    /// All registered devices, most recently created first.
    async fn list_devices(&self) -> anyhow::Result<Vec<Device>>;
}

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Readings ordered newest first, each joined with its device summary.
    async fn query_readings(
        &self,
        device_id: Option<&str>,
        limit: usize,
        skip: usize,
    ) -> anyhow::Result<Vec<ReadingRecord>>;

    async fn get_reading(&self, id: &str) -> anyhow::Result<Option<ReadingRecord>>;

    /// Every reading of one device, in no particular order.
    async fn device_readings(&self, device_id: &str) -> anyhow::Result<Vec<Reading>>;

    async fn count_readings(&self, device_id: &str) -> anyhow::Result<u64>;

    async fn latest_reading(&self, device_id: &str) -> anyhow::Result<Option<Reading>>;

    async fn insert_reading(&self, reading: NewReading) -> anyhow::Result<ReadingRecord>;

    /// Replace a whole reading. `None` when the id is unknown.
    async fn replace_reading(&self, id: &str, reading: NewReading) -> anyhow::Result<Option<ReadingRecord>>;

    /// Remove one reading. `false` when the id is unknown.
    async fn delete_reading(&self, id: &str) -> anyhow::Result<bool>;
}
