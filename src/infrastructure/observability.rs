use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` takes precedence over the
/// crate-level default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("grid_telemetry=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
