// Application layer - Use cases and the ports they depend on
pub mod dashboard_service;
pub mod error;
pub mod fleet_service;
pub mod reading_service;
pub mod telemetry_repository;
pub mod weather_service;
