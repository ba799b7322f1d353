// Presentation layer - HTTP surface
pub mod app_state;
pub mod extract;
pub mod handlers;
pub mod router;
