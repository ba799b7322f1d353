// In-memory device registry and reading store
use crate::application::telemetry_repository::{DeviceRegistry, NewReading, ReadingRepository};
use crate::domain::device::Device;
use crate::domain::reading::{Reading, ReadingRecord};
use crate::domain::series::chronological;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Initial contents for the store, usually loaded from a JSON file.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    devices: RwLock<Vec<Device>>,
    readings: RwLock<HashMap<String, Reading>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let readings = seed
            .readings
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        Self {
            devices: RwLock::new(seed.devices),
            readings: RwLock::new(readings),
        }
    }

    pub async fn load_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: Seed = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
        tracing::info!(
            "Seeded store with {} devices and {} readings",
            seed.devices.len(),
            seed.readings.len()
        );
        Ok(Self::from_seed(seed))
    }

    #[cfg(test)]
    pub async fn insert_device(&self, device: Device) {
        self.devices.write().await.push(device);
    }

    fn join(devices: &[Device], reading: Reading) -> ReadingRecord {
        let device = devices
            .iter()
            .find(|d| d.id == reading.device_id)
            .map(Device::summary);
        ReadingRecord { reading, device }
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryStore {
    async fn get_device(&self, id: &str) -> Result<Option<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.iter().find(|d| d.id == id).cloned())
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        let mut devices = self.devices.read().await.clone();
        devices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(devices)
    }
}

#[async_trait]
impl ReadingRepository for InMemoryStore {
    async fn query_readings(
        &self,
        device_id: Option<&str>,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<ReadingRecord>> {
        let readings = self.readings.read().await;
        let mut selected: Vec<&Reading> = readings
            .values()
            .filter(|r| device_id.is_none_or(|id| r.device_id == id))
            .collect();
        selected.sort_by(|a, b| chronological(b, a));

        tracing::debug!(
            "query_readings device={:?} limit={} skip={} matched={}",
            device_id,
            limit,
            skip,
            selected.len()
        );

        let devices = self.devices.read().await;
        Ok(selected
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|r| Self::join(&devices, r.clone()))
            .collect())
    }

    async fn get_reading(&self, id: &str) -> Result<Option<ReadingRecord>> {
        let reading = self.readings.read().await.get(id).cloned();
        let devices = self.devices.read().await;
        Ok(reading.map(|r| Self::join(&devices, r)))
    }

    async fn device_readings(&self, device_id: &str) -> Result<Vec<Reading>> {
        let readings = self.readings.read().await;
        Ok(readings
            .values()
            .filter(|r| r.device_id == device_id)
            .cloned()
            .collect())
    }

    async fn count_readings(&self, device_id: &str) -> Result<u64> {
        let readings = self.readings.read().await;
        Ok(readings.values().filter(|r| r.device_id == device_id).count() as u64)
    }

    async fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>> {
        let readings = self.readings.read().await;
        Ok(readings
            .values()
            .filter(|r| r.device_id == device_id)
            .max_by(|a, b| chronological(a, b))
            .cloned())
    }

    async fn insert_reading(&self, new: NewReading) -> Result<ReadingRecord> {
        let reading = Reading {
            id: uuid::Uuid::new_v4().to_string(),
            device_id: new.device_id,
            timestamp: new.timestamp,
            measurements: new.measurements,
        };
        self.readings
            .write()
            .await
            .insert(reading.id.clone(), reading.clone());

        let devices = self.devices.read().await;
        Ok(Self::join(&devices, reading))
    }

    async fn replace_reading(&self, id: &str, new: NewReading) -> Result<Option<ReadingRecord>> {
        let replaced = {
            let mut readings = self.readings.write().await;
            match readings.get_mut(id) {
                Some(existing) => {
                    *existing = Reading {
                        id: id.to_string(),
                        device_id: new.device_id,
                        timestamp: new.timestamp,
                        measurements: new.measurements,
                    };
                    Some(existing.clone())
                }
                None => None,
            }
        };

        let devices = self.devices.read().await;
        Ok(replaced.map(|r| Self::join(&devices, r)))
    }

    async fn delete_reading(&self, id: &str) -> Result<bool> {
        Ok(self.readings.write().await.remove(id).is_some())
    }
}
