//! PKCE sign-in flow and session detection in callback URLs.
//!
//! The flow follows RFC 7636:
//! 1. `start_sign_in` generates a verifier/challenge pair, saves the flow
//!    state and returns the provider authorize URL.
//! 2. The provider redirects the browser to the callback URL with `?code=`.
//! 3. `detect_session_in_url` exchanges the code plus the saved verifier for
//!    a session, which is stored on the handle (and persisted).

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::client::ClientHandle;
use crate::query::ServiceError;
use crate::session::AuthSession;

/// PKCE state file name inside the cache directory
const PKCE_STATE_FILE_NAME: &str = "pkce-state.json";

/// PKCE state TTL in minutes
const STATE_TTL_MINUTES: u64 = 10;

/// Errors from the sign-in flow
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth request failed: {0}")]
    Provider(String),
    #[error("No pending sign-in found (expired or never started)")]
    MissingState,
    #[error("Token exchange failed (HTTP {status}): {error}")]
    Exchange { status: u16, error: ServiceError },
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode token response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Session storage failed: {0:#}")]
    Storage(anyhow::Error),
}

/// Flow state saved between starting the sign-in and handling the callback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkceState {
    pub code_verifier: String,
    pub code_challenge: String,
    pub creation_time: u64,
}

#[derive(Debug, Serialize)]
struct PkceTokenRequest<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponseUser {
    id: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    user: Option<TokenResponseUser>,
}

impl From<TokenResponse> for AuthSession {
    fn from(tok: TokenResponse) -> Self {
        let (user_id, user_email) = match tok.user {
            Some(user) => (user.id, user.email),
            None => (None, None),
        };
        AuthSession {
            access_token: tok.access_token,
            refresh_token: tok.refresh_token,
            token_type: tok.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: AuthSession::expiry_from_now(tok.expires_in),
            user_id,
            user_email,
        }
    }
}

/// Generate base64url encoded random bytes
fn generate_random_base64url(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// base64url(SHA-256(verifier))
pub fn code_challenge(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a verifier (32 random bytes, 43 chars) and its S256 challenge
pub fn generate_pkce_pair() -> (String, String) {
    let verifier = generate_random_base64url(32);
    let challenge = code_challenge(&verifier);
    (verifier, challenge)
}

fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl ClientHandle {
    fn pkce_state_path(&self) -> Result<PathBuf, AuthError> {
        self.session_store()
            .map(|store| store.base_dir().join(PKCE_STATE_FILE_NAME))
            .ok_or_else(|| AuthError::Storage(anyhow::anyhow!("no cache directory available")))
    }

    fn save_pkce_state(&self, state: &PkceState) -> Result<(), AuthError> {
        let path = self.pkce_state_path()?;
        let write = || -> anyhow::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, serde_json::to_string_pretty(state)?)?;
            Ok(())
        };
        write().map_err(AuthError::Storage)?;
        debug!("PKCE state saved to {:?}", path);
        Ok(())
    }

    /// Read and remove the saved flow state; `None` if absent or expired
    fn take_pkce_state(&self) -> Result<Option<PkceState>, AuthError> {
        let path = self.pkce_state_path()?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path);
        if let Err(e) = std::fs::remove_file(&path) {
            error!("Failed to remove PKCE state: {}", e);
        }

        let state = match content.map(|c| serde_json::from_str::<PkceState>(&c)) {
            Ok(Ok(state)) => state,
            Ok(Err(e)) => {
                error!("Failed to parse PKCE state: {}", e);
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to read PKCE state: {}", e);
                return Ok(None);
            }
        };

        let age_ms = current_time_millis().saturating_sub(state.creation_time);
        if age_ms < STATE_TTL_MINUTES * 60 * 1000 {
            Ok(Some(state))
        } else {
            debug!("PKCE state expired");
            Ok(None)
        }
    }

    /// Begin an OAuth sign-in with `provider` and return the URL to open
    pub fn start_sign_in(&self, provider: &str, redirect_to: &str) -> Result<String, AuthError> {
        info!("Creating PKCE sign-in state");
        let (code_verifier, code_challenge) = generate_pkce_pair();
        let state = PkceState {
            code_verifier,
            code_challenge,
            creation_time: current_time_millis(),
        };
        self.save_pkce_state(&state)?;

        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", &state.code_challenge)
            .append_pair("code_challenge_method", "s256");

        Ok(url.to_string())
    }

    /// Inspect a callback URL and, if it carries an auth code, sign in with it.
    ///
    /// Returns `Ok(None)` when the URL holds nothing auth related.
    pub async fn detect_session_in_url(
        &self,
        callback_url: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let url = Url::parse(callback_url)?;
        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        if let Some(fragment) = url.fragment() {
            params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
        }
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        if let Some(err) = param("error") {
            let description = param("error_description").unwrap_or_default();
            let mut parts = vec![format!("({})", err)];
            if !description.is_empty() {
                parts.push(description);
            }
            return Err(AuthError::Provider(parts.join(" ")));
        }

        match param("code").filter(|c| !c.is_empty()) {
            Some(code) => self.exchange_code_for_session(&code).await.map(Some),
            None => {
                debug!("No auth code in callback URL");
                Ok(None)
            }
        }
    }

    /// Exchange an authorization code for a session using the saved verifier
    pub async fn exchange_code_for_session(&self, auth_code: &str) -> Result<AuthSession, AuthError> {
        let state = self.take_pkce_state()?.ok_or(AuthError::MissingState)?;

        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        debug!("=== Token Request ===");
        debug!("URL: {}", url);

        let response = self
            .request(Method::POST, url)
            .json(&PkceTokenRequest {
                auth_code,
                code_verifier: &state.code_verifier,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = ServiceError::from_body(status.as_u16(), &body);
            error!("Token exchange failed with status {}: {}", status, error);
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                error,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        if token
            .token_type
            .as_deref()
            .is_some_and(|t| !t.eq_ignore_ascii_case("bearer"))
        {
            warn!("Unexpected token_type: {:?}", token.token_type);
        }

        let session = AuthSession::from(token);
        self.set_session(Some(session.clone()))
            .map_err(AuthError::Storage)?;
        info!("Signed in successfully");

        Ok(session)
    }

    /// Forget the current session, in memory and on disk
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.set_session(None).map_err(AuthError::Storage)?;
        info!("Signed out");
        Ok(())
    }
}
