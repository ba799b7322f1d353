// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_reading, delete_reading, device_dashboard, device_latest, device_readings, fleet_stats,
    get_reading, health_check, list_readings, update_reading, weather,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/sensor-data", get(list_readings).post(create_reading))
        .route("/sensor-data/devices/stats", get(fleet_stats))
        .route("/sensor-data/device/:device_id", get(device_readings))
        .route("/sensor-data/device/:device_id/latest", get(device_latest))
        .route("/sensor-data/device/:device_id/dashboard", get(device_dashboard))
        .route(
            "/sensor-data/:id",
            get(get_reading).put(update_reading).delete(delete_reading),
        )
        .route("/weather", get(weather))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::fleet_service::{FanoutSettings, FleetService};
    use crate::application::reading_service::ReadingService;
    use crate::application::weather_service::WeatherService;
    use crate::domain::device::{Device, Location};
    use crate::domain::reading::Reading;
    use crate::infrastructure::memory_store::{InMemoryStore, Seed};
    use crate::infrastructure::openweather::OpenWeatherClient;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn device(id: &str, created_minutes_ago: i64) -> Device {
        Device {
            id: id.to_string(),
            name: format!("PMU {}", id),
            substation: "West".to_string(),
            location: Location {
                longitude: 72.88,
                latitude: 19.07,
            },
            created_at: Utc::now() - Duration::minutes(created_minutes_ago),
        }
    }

    fn reading(device_id: &str, id: &str, minutes_ago: i64, frequency: f64) -> Reading {
        serde_json::from_value(json!({
            "id": id,
            "device_id": device_id,
            "timestamp": Utc::now() - Duration::minutes(minutes_ago),
            "measurements": {
                "voltage_phasors": [
                    {"channel": "VA", "magnitude": 230.0, "angle": 0.0},
                    {"channel": "VB", "magnitude": 231.0, "angle": -120.0}
                ],
                "current_phasors": [{"channel": "IA", "magnitude": 10.0, "angle": -5.0}],
                "frequency": frequency
            }
        }))
        .unwrap()
    }

    fn app() -> Router {
        let mut readings: Vec<Reading> = (0..25)
            .map(|m| reading("d1", &format!("r{:02}", m), m + 1, 50.0))
            .collect();
        readings[0].measurements.frequency = 50.02;
        let store = Arc::new(InMemoryStore::from_seed(Seed {
            devices: vec![device("d2", 5), device("d1", 30)],
            readings,
        }));
        let weather = OpenWeatherClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            std::time::Duration::from_millis(100),
        )
        .unwrap();

        let state = Arc::new(AppState {
            reading_service: ReadingService::new(store.clone(), store.clone()),
            dashboard_service: DashboardService::new(store.clone(), store.clone(), 20),
            fleet_service: FleetService::new(store.clone(), store, FanoutSettings::default()),
            weather_service: WeatherService::new(Arc::new(weather)),
            default_range: "1w".to_string(),
        });
        build_router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fleet_stats_preserve_registry_order() {
        let (status, body) = send(app(), get("/sensor-data/devices/stats")).await;
        assert_eq!(status, StatusCode::OK);

        let stats = body.as_array().unwrap();
        assert_eq!(stats[0]["id"], "d2");
        assert_eq!(stats[0]["reading_count"], 0);
        assert_eq!(stats[0]["is_online"], false);
        assert_eq!(stats[0]["latest_timestamp"], Value::Null);

        assert_eq!(stats[1]["id"], "d1");
        assert_eq!(stats[1]["reading_count"], 25);
        assert_eq!(stats[1]["is_online"], true);
        assert_eq!(stats[1]["latest_frequency"], 50.02);
    }

    #[tokio::test]
    async fn test_list_validates_limit() {
        let (status, body) = send(app(), get("/sensor-data?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(app(), get("/sensor-data?device_id=d1&limit=5&skip=1")).await;
        assert_eq!(status, StatusCode::OK);
        let readings = body.as_array().unwrap();
        assert_eq!(readings.len(), 5);
        assert_eq!(readings[0]["id"], "r01");
        assert_eq!(readings[0]["device"]["substation"], "West");
    }

    #[tokio::test]
    async fn test_dashboard_pages_and_summarises() {
        let (status, body) = send(
            app(),
            get("/sensor-data/device/d1/dashboard?range=1h&page=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "1h");
        assert_eq!(body["table"]["total_items"], 25);
        assert_eq!(body["table"]["page"], 2);
        assert_eq!(body["table"]["items"].as_array().unwrap().len(), 5);
        assert_eq!(body["chart"].as_array().unwrap().len(), 25);
        assert_eq!(body["chart"][0]["vc_voltage"], Value::Null);
        assert_eq!(body["summary"]["max_frequency"], 50.02);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_inverted_custom_range() {
        let uri = "/sensor-data/device/d1/dashboard?range=custom&start=2024-03-10T12:00:00Z&end=2024-03-10T11:00:00Z";
        let (status, _) = send(app(), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_named_range_ignores_inverted_custom_bounds() {
        let uri = "/sensor-data/device/d1/dashboard?range=1h&start=2024-03-10T12:00:00Z&end=2024-03-10T11:00:00Z";
        let (status, body) = send(app(), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "1h");
        assert_eq!(body["table"]["total_items"], 25);
    }

    #[tokio::test]
    async fn test_unparseable_input_returns_json_validation_error() {
        let (status, body) = send(app(), get("/sensor-data?limit=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/sensor-data")
            .header("content-type", "application/json")
            .body(Body::from("{\"device_id\": \"d1\""))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            app(),
            json_request("POST", "/sensor-data", json!({"device_id": "d1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("measurements"));
    }

    #[tokio::test]
    async fn test_create_requires_known_device_and_valid_channels() {
        let measurements = json!({
            "voltage_phasors": [{"channel": "VA", "magnitude": 230.0, "angle": 0.0}],
            "current_phasors": [],
            "frequency": 50.0
        });
        let (status, _) = send(
            app(),
            json_request("POST", "/sensor-data", json!({"device_id": "ghost", "measurements": measurements})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let bad_channel = json!({
            "voltage_phasors": [{"channel": "VX", "magnitude": 230.0, "angle": 0.0}],
            "frequency": 50.0
        });
        let (status, body) = send(
            app(),
            json_request("POST", "/sensor-data", json!({"device_id": "d1", "measurements": bad_channel})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("VX"));

        let (status, body) = send(
            app(),
            json_request("POST", "/sensor-data", json!({"device_id": "d1", "measurements": measurements})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["device_id"], "d1");
        assert_eq!(body["measurements"]["voltage_phasors"][0]["channel"], "VA");
    }

    #[tokio::test]
    async fn test_missing_reading_is_not_found() {
        let (status, _) = send(app(), get("/sensor-data/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::builder()
            .method("DELETE")
            .uri("/sensor-data/nope")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app(), get("/sensor-data/device/ghost/latest")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_weather_surfaces_validation_and_missing_key() {
        let (status, body) = send(app(), get("/weather?lat=12.9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Latitude and longitude are required");

        let (status, body) = send(app(), get("/weather?lat=12.9&lon=77.6")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Weather API key not configured");
    }
}
