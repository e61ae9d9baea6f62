//! Startup initialization.
//!
//! Fail-fast: configuration is validated before anything else runs, and the
//! caller decides how to terminate when it is missing. Network reachability
//! is not checked here; use the connectivity probe for that.

use tracing::{debug, info};

use crate::client::ClientHandle;
use crate::config::{BackendConfig, ConfigError};

/// Build the client from `VITE_SUPABASE_URL` / `VITE_SUPABASE_ANON_KEY`.
///
/// Each call builds a new handle. Use [`crate::runtime::install`] to share
/// one per process.
pub fn initialize() -> Result<ClientHandle, ConfigError> {
    initialize_with(None)
}

/// Like [`initialize`], keeping the session under `cache_dir` instead of ~/.vibex
pub fn initialize_with(cache_dir: Option<String>) -> Result<ClientHandle, ConfigError> {
    debug!("Checking Supabase configuration...");
    let config = BackendConfig::from_env()?;

    let client = ClientHandle::with_cache_dir(config, cache_dir);
    info!("Supabase client configured for {}", client.config().url());
    debug!(
        "   Flow: {}, realtime: {} events/s",
        client.options().auth().flow_type().as_str(),
        client.options().realtime().events_per_second()
    );

    Ok(client)
}
