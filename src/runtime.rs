//! Process-wide client slot.
//!
//! Startup builds the handle explicitly and may install it here so code
//! without access to the injected handle can still reach it:
//!
//! ```ignore
//! // At startup:
//! let client = startup::initialize()?;
//! runtime::install(client);
//!
//! // Anywhere else:
//! if let Some(client) = runtime::client() {
//!     client.check_connection().await;
//! }
//! ```

use std::sync::OnceLock;

use tracing::warn;

use crate::client::ClientHandle;

static CLIENT: OnceLock<ClientHandle> = OnceLock::new();

/// Install the process-wide client.
///
/// The first installed handle wins for the life of the process; later calls
/// are ignored with a warning and get the existing handle back.
pub fn install(client: ClientHandle) -> &'static ClientHandle {
    let mut installed = false;
    let current = CLIENT.get_or_init(|| {
        installed = true;
        client
    });

    if !installed {
        warn!("Attempting to install a client when one is already configured. Keeping existing.");
    }

    current
}

/// The installed client, or `None` before `install()`
pub fn client() -> Option<&'static ClientHandle> {
    CLIENT.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use tempfile::TempDir;

    fn handle(url: &str, cache: &TempDir) -> ClientHandle {
        let config =
            BackendConfig::from_values(Some(url.to_string()), Some("anon-key".to_string()))
                .unwrap();
        ClientHandle::with_cache_dir(config, Some(cache.path().to_string_lossy().to_string()))
    }

    #[test]
    fn test_install_keeps_first_handle() {
        let cache = TempDir::new().unwrap();

        let first = install(handle("https://first.supabase.co", &cache));
        let second = install(handle("https://second.supabase.co", &cache));

        assert_eq!(first.config().url(), "https://first.supabase.co");
        assert_eq!(second.config().url(), "https://first.supabase.co");
        assert_eq!(
            client().map(|c| c.config().url()),
            Some("https://first.supabase.co")
        );
    }
}
