//! DDoS simulator server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ddos-sim.yaml` plus environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Build the empty entity store, session store, and broadcast channel
//! 4. Serve HTTP and `WebSocket` traffic until `Ctrl-C`

use std::path::Path;
use std::sync::Arc;

use ddos_sim_server::config::{AppConfig, DEFAULT_CONFIG_FILE, LoggingConfig};
use ddos_sim_server::{AppState, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report the source afterwards.
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let config = AppConfig::load(config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config_file = %config_path.display(),
        config_file_present = config_path.exists(),
        host = %config.server.host,
        port = config.server.port,
        session_ttl_secs = config.session.ttl_secs,
        strict_log_references = config.store.strict_log_references,
        "Configuration loaded"
    );

    // 3. Build shared state.
    let state = Arc::new(AppState::from_config(&config));

    // 4. Serve.
    start_server(&config.server, state).await?;
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
