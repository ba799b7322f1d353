// Fleet service - Concurrent per-device statistics for the fleet overview
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::telemetry_repository::{DeviceRegistry, ReadingRepository};
use crate::domain::device::Device;
use crate::domain::device_stats::DeviceStats;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FanoutSettings {
    /// Upper bound on per-device lookups in flight at once.
    pub max_concurrency: usize,
    pub per_device_timeout: Duration,
    /// Fail the whole request on the first failed lookup instead of
    /// degrading that device's record.
    pub fail_fast: bool,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            per_device_timeout: Duration::from_secs(2),
            fail_fast: false,
        }
    }
}

#[derive(Clone)]
pub struct FleetService {
    repository: Arc<dyn ReadingRepository>,
    registry: Arc<dyn DeviceRegistry>,
    settings: FanoutSettings,
}

impl FleetService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        registry: Arc<dyn DeviceRegistry>,
        settings: FanoutSettings,
    ) -> Self {
        Self {
            repository,
            registry,
            settings,
        }
    }

    /// Stats for every registered device, in registry order.
    pub async fn fleet_stats(&self, now: DateTime<Utc>) -> ServiceResult<Vec<DeviceStats>> {
        let devices = self.registry.list_devices().await?;
        self.collect_stats(devices, now).await
    }

    /// Run the count + latest lookups for each device with bounded
    /// concurrency and reassemble the results in input order.
    ///
    /// Lookups run inside the returned future, so dropping it (e.g. when the
    /// client disconnects) cancels whatever is still outstanding.
    pub async fn collect_stats(
        &self,
        devices: Vec<Device>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<DeviceStats>> {
        let total = devices.len();
        let mut slots: Vec<Option<DeviceStats>> = vec![None; total];

        let mut lookups = stream::iter(devices.into_iter().enumerate())
            .map(move |(index, device)| async move {
                let outcome = self.lookup(&device, now).await;
                (index, device, outcome)
            })
            .buffer_unordered(self.settings.max_concurrency.max(1));

        while let Some((index, device, outcome)) = lookups.next().await {
            let stats = match outcome {
                Ok(stats) => stats,
                Err(e) if self.settings.fail_fast => {
                    tracing::error!("Stats lookup failed for device {}: {:#}", device.id, e);
                    return Err(ServiceError::Internal(e));
                }
                Err(e) => {
                    tracing::warn!(
                        "Stats lookup failed for device {}, reporting it offline: {:#}",
                        device.id,
                        e
                    );
                    DeviceStats::degraded(device)
                }
            };
            slots[index] = Some(stats);
        }

        tracing::debug!("Collected stats for {} devices", total);
        Ok(slots.into_iter().flatten().collect())
    }

    async fn lookup(&self, device: &Device, now: DateTime<Utc>) -> anyhow::Result<DeviceStats> {
        let queries = async {
            let (count, latest) = tokio::try_join!(
                self.repository.count_readings(&device.id),
                self.repository.latest_reading(&device.id),
            )?;
            anyhow::Ok(DeviceStats::new(device.clone(), count, latest.as_ref(), now))
        };

        match tokio::time::timeout(self.settings.per_device_timeout, queries).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "timed out after {}ms",
                self.settings.per_device_timeout.as_millis()
            )),
        }
    }
}
