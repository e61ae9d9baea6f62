//! Configured backend client handle.
//!
//! `ClientHandle` is created once at startup and then shared by every part
//! of the application. Clones are cheap and share the same HTTP client
//! (connection reuse) and the same auth session slot.

use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::health::{self, ConnectionStatus};
use crate::options::ClientOptions;
use crate::query::TableQuery;
use crate::realtime::{self, EventThrottle};
use crate::session::{AuthSession, SessionStore};

struct Inner {
    http: Client,
    config: BackendConfig,
    options: ClientOptions,
    session_store: Option<SessionStore>,
    session: RwLock<Option<AuthSession>>,
    throttle: EventThrottle,
}

/// Handle to the configured backend service.
///
/// Configuration and options are fixed at construction and cannot be
/// changed afterwards.
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<Inner>,
}

impl ClientHandle {
    /// Create a handle using the default session cache directory (~/.vibex).
    pub fn new(config: BackendConfig) -> Self {
        Self::with_cache_dir(config, None)
    }

    /// Create a handle storing its session under `cache_dir`.
    ///
    /// Does no network I/O. A previously persisted session is loaded when
    /// session persistence is on; failures there are logged and ignored.
    pub fn with_cache_dir(config: BackendConfig, cache_dir: Option<String>) -> Self {
        let options = ClientOptions::fixed();

        let session_store = if options.auth().persist_session() {
            match SessionStore::new(cache_dir) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!("Session persistence unavailable: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let session = session_store
            .as_ref()
            .and_then(|store| match store.load() {
                Ok(session) => session,
                Err(e) => {
                    warn!("Failed to load persisted session: {:#}", e);
                    None
                }
            });

        if session.is_some() {
            debug!("Restored persisted session");
        }

        let throttle = EventThrottle::new(options.realtime().events_per_second());

        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                config,
                options,
                session_store,
                session: RwLock::new(session),
                throttle,
            }),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Store used for session persistence, if any
    pub fn session_store(&self) -> Option<&SessionStore> {
        self.inner.session_store.as_ref()
    }

    /// Current auth session, if signed in
    pub fn current_session(&self) -> Option<AuthSession> {
        self.inner
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the current session, persisting it when persistence is on
    pub(crate) fn set_session(&self, session: Option<AuthSession>) -> anyhow::Result<()> {
        if let Some(store) = self.session_store() {
            match &session {
                Some(s) => store.save(s)?,
                None => store.remove()?,
            }
        }

        *self
            .inner
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
        Ok(())
    }

    /// Token sent as bearer: an unexpired session token, else the anon key
    fn bearer_token(&self) -> String {
        match self.current_session() {
            Some(session) if !session.is_expired() => session.access_token,
            Some(_) => {
                debug!("Session expired, falling back to anon key");
                self.inner.config.anon_key().to_string()
            }
            None => self.inner.config.anon_key().to_string(),
        }
    }

    /// Build an absolute URL for a service path such as `rest/v1/profiles`
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = Url::parse(&format!("{}/", self.inner.config.url()))?;
        base.join(path)
    }

    /// Start a request carrying the API key, bearer token and global headers
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self
            .inner
            .http
            .request(method, url)
            .header("apikey", self.inner.config.anon_key())
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
            .header("x-request-id", Uuid::new_v4().to_string());

        for (name, value) in self.inner.options.global().headers() {
            request = request.header(*name, *value);
        }

        request
    }

    /// Start a read query on `table`
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery::new(self.clone(), table)
    }

    /// Run the connectivity probe. See [`health::check_connection`].
    pub async fn check_connection(&self) -> ConnectionStatus {
        health::check_connection(self).await
    }

    /// Websocket URL for realtime subscriptions
    pub fn realtime_endpoint(&self) -> Result<Url, url::ParseError> {
        realtime::realtime_endpoint(&self.inner.config, self.inner.options.realtime())
    }

    /// Per-channel rate ceiling for realtime events
    pub fn realtime_throttle(&self) -> &EventThrottle {
        &self.inner.throttle
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("config", &self.inner.config)
            .field("options", &self.inner.options)
            .field("signed_in", &self.current_session().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FlowType;
    use tempfile::tempdir;

    fn test_config(url: &str) -> BackendConfig {
        BackendConfig::from_values(Some(url.to_string()), Some("anon-key".to_string())).unwrap()
    }

    fn sample_session(expires_in: i64) -> AuthSession {
        AuthSession {
            access_token: "user-token".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_at: AuthSession::expiry_from_now(expires_in),
            user_id: None,
            user_email: None,
        }
    }

    #[test]
    fn test_handle_carries_fixed_options() {
        let tmp = tempdir().unwrap();
        let client = ClientHandle::with_cache_dir(
            test_config("https://abc.supabase.co"),
            Some(tmp.path().to_string_lossy().to_string()),
        );

        let auth = client.options().auth();
        assert!(auth.auto_refresh_token());
        assert!(auth.persist_session());
        assert!(auth.detect_session_in_url());
        assert_eq!(auth.flow_type(), FlowType::Pkce);
        assert_eq!(
            client.options().global().headers(),
            &[("x-client-info", "vibex-app")]
        );
        assert_eq!(client.options().realtime().events_per_second(), 10);
        assert!(client.session_store().is_some());
    }

    #[test]
    fn test_endpoint() {
        let tmp = tempdir().unwrap();
        let client = ClientHandle::with_cache_dir(
            test_config("https://abc.supabase.co/"),
            Some(tmp.path().to_string_lossy().to_string()),
        );
        let url = client.endpoint("rest/v1/profiles").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/profiles");
    }

    #[test]
    fn test_bearer_token_prefers_live_session() {
        let tmp = tempdir().unwrap();
        let client = ClientHandle::with_cache_dir(
            test_config("https://abc.supabase.co"),
            Some(tmp.path().to_string_lossy().to_string()),
        );
        assert_eq!(client.bearer_token(), "anon-key");

        client.set_session(Some(sample_session(3600))).unwrap();
        assert_eq!(client.bearer_token(), "user-token");

        client.set_session(Some(sample_session(0))).unwrap();
        assert_eq!(client.bearer_token(), "anon-key");
    }

    #[test]
    fn test_persisted_session_is_restored() {
        let tmp = tempdir().unwrap();
        let dir = Some(tmp.path().to_string_lossy().to_string());

        let first = ClientHandle::with_cache_dir(test_config("https://abc.supabase.co"), dir.clone());
        first.set_session(Some(sample_session(3600))).unwrap();

        let second = ClientHandle::with_cache_dir(test_config("https://abc.supabase.co"), dir);
        let restored = second.current_session().unwrap();
        assert_eq!(restored.access_token, "user-token");

        second.set_session(None).unwrap();
        let third = ClientHandle::with_cache_dir(
            test_config("https://abc.supabase.co"),
            Some(tmp.path().to_string_lossy().to_string()),
        );
        assert!(third.current_session().is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let tmp = tempdir().unwrap();
        let client = ClientHandle::with_cache_dir(
            test_config("https://abc.supabase.co"),
            Some(tmp.path().to_string_lossy().to_string()),
        );
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("anon-key"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
