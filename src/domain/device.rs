// Device domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    /// Build a location, rejecting coordinates outside the WGS84 ranges.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, String> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {} is outside [-180, 180]", longitude));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} is outside [-90, 90]", latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub substation: String,
    pub location: Location,
    pub created_at: DateTime<Utc>,
}

impl Device {
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            name: self.name.clone(),
            substation: self.substation.clone(),
            location: self.location,
        }
    }
}

/// The device fields joined onto every reading returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub name: String,
    pub substation: String,
    pub location: Location,
}
