// OpenWeatherMap client implementing the weather provider port
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::weather_service::{CurrentWeather, ForecastEntry, WeatherProvider};
use crate::domain::device::Location;
use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// OpenWeatherMap returns forecasts in three-hour steps.
const FORECAST_STEPS_PER_DAY: u32 = 8;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct CloudBlock {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct SysBlock {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    name: String,
    main: MainBlock,
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    sys: Option<SysBlock>,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    clouds: Option<CloudBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainBlock,
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn condition(weather: &[ConditionBlock]) -> (String, String) {
    weather
        .first()
        .map(|c| (c.description.clone(), c.icon.clone()))
        .unwrap_or_default()
}

impl From<CurrentResponse> for CurrentWeather {
    fn from(data: CurrentResponse) -> Self {
        let (description, icon) = condition(&data.weather);
        Self {
            temperature: data.main.temp.round() as i64,
            feels_like: data.main.feels_like.round() as i64,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            wind_speed: data.wind.speed,
            wind_direction: data.wind.deg,
            cloudiness: data.clouds.map(|c| c.all),
            visibility: data.visibility.map(|metres| metres / 1000.0),
            description,
            icon,
            location: data.name,
            country: data.sys.and_then(|s| s.country),
        }
    }
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn build_url(&self, endpoint: &str, location: Location, api_key: &str, extra: &str) -> String {
        format!(
            "{}/{}?lat={}&lon={}&appid={}&units=metric{}",
            self.base_url,
            endpoint,
            location.latitude,
            location.longitude,
            urlencoding::encode(api_key),
            extra
        )
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, location: Location, extra: &str) -> ServiceResult<T> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ServiceError::Upstream {
            status: 500,
            message: "Weather API key not configured".to_string(),
        })?;
        let url = self.build_url(endpoint, location, api_key, extra);

        tracing::debug!("Requesting weather {} for {:?}", endpoint, location);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to weather provider")?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Failed to fetch weather data".to_string());
            tracing::warn!("Weather provider returned {}: {}", status, message);
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response
            .json::<T>()
            .await
            .context("Failed to parse weather provider response")?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, location: Location) -> ServiceResult<CurrentWeather> {
        let data: CurrentResponse = self.fetch("weather", location, "").await?;
        Ok(data.into())
    }

    async fn forecast(&self, location: Location, days: u32) -> ServiceResult<Vec<ForecastEntry>> {
        let extra = format!("&cnt={}", days * FORECAST_STEPS_PER_DAY);
        let data: ForecastResponse = self.fetch("forecast", location, &extra).await?;
        Ok(data
            .list
            .into_iter()
            .filter_map(|item| {
                let timestamp = DateTime::from_timestamp(item.dt, 0)?;
                let (description, icon) = condition(&item.weather);
                Some(ForecastEntry {
                    timestamp,
                    temperature: item.main.temp.round() as i64,
                    humidity: item.main.humidity,
                    wind_speed: item.wind.speed,
                    description,
                    icon,
                })
            })
            .collect())
    }
}
