// Per-device statistics for the fleet overview
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::Device;
use super::freshness::is_online;
use super::reading::Reading;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStats {
    #[serde(flatten)]
    pub device: Device,
    pub reading_count: u64,
    pub latest_timestamp: Option<DateTime<Utc>>,
    pub latest_frequency: Option<f64>,
    pub is_online: bool,
}

impl DeviceStats {
    pub fn new(device: Device, reading_count: u64, latest: Option<&Reading>, now: DateTime<Utc>) -> Self {
        let latest_timestamp = latest.map(|r| r.timestamp);
        Self {
            device,
            reading_count,
            latest_timestamp,
            latest_frequency: latest.map(|r| r.measurements.frequency),
            is_online: is_online(latest_timestamp, now),
        }
    }

    /// Record used when the per-device lookup failed or timed out.
    pub fn degraded(device: Device) -> Self {
        Self {
            device,
            reading_count: 0,
            latest_timestamp: None,
            latest_frequency: None,
            is_online: false,
        }
    }
}
