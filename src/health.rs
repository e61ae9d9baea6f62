//! Connectivity probe.
//!
//! A diagnostic convenience: one minimal read against a reference table.
//! Every failure is logged and folded into the returned status; nothing is
//! raised to the caller and nothing is retried.

use tracing::{error, info};

use crate::client::ClientHandle;
use crate::query::QueryError;

/// Table read by the probe
pub const REFERENCE_TABLE: &str = "profiles";

/// Only column requested by the probe
pub const REFERENCE_COLUMN: &str = "id";

/// Outcome of a connectivity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    ok: bool,
    message: Option<String>,
}

impl ConnectionStatus {
    fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            ok: false,
            message: Some(message),
        }
    }

    /// Whether the backend answered the probe without error
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Error detail when the probe failed
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<ConnectionStatus> for bool {
    fn from(status: ConnectionStatus) -> bool {
        status.ok
    }
}

/// Fetch at most one `id` from `profiles` and report whether it worked.
pub async fn check_connection(client: &ClientHandle) -> ConnectionStatus {
    let result = client
        .from(REFERENCE_TABLE)
        .select(REFERENCE_COLUMN)
        .limit(1)
        .execute()
        .await;

    match result {
        Ok(_) => {
            info!("✓ Supabase connection verified");
            ConnectionStatus::ok()
        }
        Err(QueryError::Service { error: service, .. }) => {
            error!("Supabase connection check failed: {}", service.message);
            ConnectionStatus::failed(service.message)
        }
        Err(e) => {
            error!("Supabase connection check error: {}", e);
            ConnectionStatus::failed(e.to_string())
        }
    }
}
