// Domain layer - Pure models and time-series computations
pub mod device;
pub mod device_stats;
pub mod freshness;
pub mod pagination;
pub mod reading;
pub mod series;
pub mod summary;
pub mod time_range;
