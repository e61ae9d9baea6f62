//! Session storage for authenticated users.
//!
//! Persists the current auth session in ~/.vibex/session.json (or a custom
//! cache directory) so it survives process restarts.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default cache directory name under the home directory
const CACHE_DIR_NAME: &str = ".vibex";

/// Session file name inside the cache directory
const SESSION_FILE_NAME: &str = "session.json";

/// Seconds shaved off `expires_in` so a token is not used right at its expiry
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Upper bound for a server-supplied `expires_in` (one year)
const MAX_EXPIRES_IN_SECS: i64 = 365 * 24 * 60 * 60;

/// Authenticated session as returned by the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthSession {
    /// Compute the expiry timestamp for a token valid for `expires_in` seconds.
    ///
    /// Values outside `0..=one year` are clamped.
    pub fn expiry_from_now(expires_in: i64) -> DateTime<Utc> {
        let secs = expires_in
            .min(MAX_EXPIRES_IN_SECS)
            .saturating_sub(EXPIRY_MARGIN_SECS)
            .max(0);
        Utc::now() + Duration::seconds(secs)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Resolve the cache directory, defaulting to ~/.vibex
pub fn resolve_cache_dir(cache_dir: Option<String>) -> Result<PathBuf> {
    match cache_dir {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(dirs::home_dir()
            .context("Could not determine home directory")?
            .join(CACHE_DIR_NAME)),
    }
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    base_dir: PathBuf,
    session_path: PathBuf,
}

impl SessionStore {
    /// Create a new session store
    ///
    /// # Arguments
    /// * `cache_dir` - Optional custom cache directory. Defaults to ~/.vibex
    pub fn new(cache_dir: Option<String>) -> Result<Self> {
        let base_dir = resolve_cache_dir(cache_dir)?;
        let session_path = base_dir.join(SESSION_FILE_NAME);

        Ok(Self {
            base_dir,
            session_path,
        })
    }

    /// Directory holding the session and flow state files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Load the persisted session
    ///
    /// An unreadable or invalid file is removed and treated as no session.
    pub fn load(&self) -> Result<Option<AuthSession>> {
        if !self.session_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.session_path)
            .with_context(|| format!("Failed to read session file: {:?}", self.session_path))?;

        match serde_json::from_str::<AuthSession>(&content) {
            Ok(session) if session.is_valid() => {
                debug!("Loaded session from {:?}", self.session_path);
                Ok(Some(session))
            }
            Ok(_) => {
                warn!("Session validation failed: missing tokens, removing session file");
                self.remove()?;
                Ok(None)
            }
            Err(e) => {
                warn!("Failed to parse session JSON: {}, removing session file", e);
                self.remove()?;
                Ok(None)
            }
        }
    }

    /// Persist a session, replacing any existing one
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", self.base_dir))?;

        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session data")?;

        std::fs::write(&self.session_path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.session_path))?;

        info!("Session saved successfully");
        debug!("Session saved to {:?}", self.session_path);

        Ok(())
    }

    /// Remove the persisted session
    pub fn remove(&self) -> Result<()> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path).with_context(|| {
                format!("Failed to remove session file: {:?}", self.session_path)
            })?;
            info!("Session removed successfully");
        }

        Ok(())
    }
}
