// Weather service - Validates coordinates and delegates to the weather provider
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::device::Location;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const MAX_FORECAST_DAYS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: Option<f64>,
    pub cloudiness: Option<f64>,
    /// Kilometres.
    pub visibility: Option<f64>,
    pub description: String,
    pub icon: String,
    pub location: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: i64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeatherReport {
    Current(CurrentWeather),
    Forecast { days: u32, entries: Vec<ForecastEntry> },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: Location) -> ServiceResult<CurrentWeather>;

    async fn forecast(&self, location: Location, days: u32) -> ServiceResult<Vec<ForecastEntry>>;
}

#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Look up weather for raw `lat`/`lon` query values. With `days` the
    /// multi-day forecast is returned instead of current conditions.
    pub async fn lookup(
        &self,
        lat: Option<&str>,
        lon: Option<&str>,
        days: Option<u32>,
    ) -> ServiceResult<WeatherReport> {
        let location = parse_coordinates(lat, lon)?;
        match days {
            None => Ok(WeatherReport::Current(self.provider.current(location).await?)),
            Some(days) if (1..=MAX_FORECAST_DAYS).contains(&days) => {
                let entries = self.provider.forecast(location, days).await?;
                Ok(WeatherReport::Forecast { days, entries })
            }
            Some(_) => Err(ServiceError::validation(format!(
                "days must be between 1 and {}",
                MAX_FORECAST_DAYS
            ))),
        }
    }
}

fn parse_coordinates(lat: Option<&str>, lon: Option<&str>) -> ServiceResult<Location> {
    let (Some(lat), Some(lon)) = (lat.filter(|s| !s.is_empty()), lon.filter(|s| !s.is_empty())) else {
        return Err(ServiceError::validation("Latitude and longitude are required"));
    };
    let (Ok(latitude), Ok(longitude)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) else {
        return Err(ServiceError::validation("Invalid latitude or longitude values"));
    };
    Location::new(longitude, latitude).map_err(ServiceError::Validation)
}
