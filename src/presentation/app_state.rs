// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::fleet_service::FleetService;
use crate::application::reading_service::ReadingService;
use crate::application::weather_service::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub reading_service: ReadingService,
    pub dashboard_service: DashboardService,
    pub fleet_service: FleetService,
    pub weather_service: WeatherService,
    /// Range token used by dashboards when the request names none.
    pub default_range: String,
}
