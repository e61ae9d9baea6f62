//! Backend configuration read from the process environment.
//!
//! Two values are required and have no defaults:
//! - `VITE_SUPABASE_URL`: service base URL
//! - `VITE_SUPABASE_ANON_KEY`: public anonymous API key
//!
//! The anon key is not a secret; access is restricted server-side by row
//! level security. It is still redacted from `Debug` output.

use thiserror::Error;
use tracing::error;

/// Environment variable holding the service base URL
pub const URL_ENV: &str = "VITE_SUPABASE_URL";

/// Environment variable holding the anonymous API key
pub const ANON_KEY_ENV: &str = "VITE_SUPABASE_ANON_KEY";

/// Startup configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or both required values are absent or empty
    #[error(
        "Supabase credentials not found (missing: {}). Please set VITE_SUPABASE_URL and VITE_SUPABASE_ANON_KEY in your environment.",
        missing_names(.url, .anon_key)
    )]
    MissingCredentials { url: bool, anon_key: bool },
}

impl ConfigError {
    /// Names of the variables that were missing
    pub fn missing_vars(&self) -> Vec<&'static str> {
        match self {
            ConfigError::MissingCredentials { url, anon_key } => {
                let mut vars = Vec::new();
                if *url {
                    vars.push(URL_ENV);
                }
                if *anon_key {
                    vars.push(ANON_KEY_ENV);
                }
                vars
            }
        }
    }
}

fn missing_names(url: &bool, anon_key: &bool) -> String {
    ConfigError::MissingCredentials {
        url: *url,
        anon_key: *anon_key,
    }
    .missing_vars()
    .join(", ")
}

/// Validated endpoint URL and anon key
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    url: String,
    anon_key: String,
}

impl BackendConfig {
    /// Read and validate both values from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(std::env::var(URL_ENV).ok(), std::env::var(ANON_KEY_ENV).ok())
    }

    /// Validate raw values. Absent, empty and whitespace-only values count as missing.
    ///
    /// On failure, logs one line per variable before returning the error.
    pub fn from_values(url: Option<String>, anon_key: Option<String>) -> Result<Self, ConfigError> {
        let url = present(url.map(|u| u.trim().trim_end_matches('/').to_string()));
        let anon_key = present(anon_key);

        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self { url, anon_key }),
            (url, anon_key) => {
                error!("Missing Supabase credentials!");
                error!("{}: {}", URL_ENV, set_marker(url.is_some()));
                error!("{}: {}", ANON_KEY_ENV, set_marker(anon_key.is_some()));
                Err(ConfigError::MissingCredentials {
                    url: url.is_none(),
                    anon_key: anon_key.is_none(),
                })
            }
        }
    }

    /// Service base URL without a trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Anonymous API key
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn set_marker(is_set: bool) -> &'static str {
    if is_set {
        "✓ Set"
    } else {
        "✗ Missing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_values() {
        let cfg = BackendConfig::from_values(
            Some("https://abc.supabase.co/".to_string()),
            Some("anon-key".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.url(), "https://abc.supabase.co");
        assert_eq!(cfg.anon_key(), "anon-key");
    }

    #[test]
    fn test_missing_combinations() {
        let url = || Some("https://abc.supabase.co".to_string());
        let key = || Some("anon-key".to_string());

        let cases = [
            (None, key(), true, false),
            (Some(String::new()), key(), true, false),
            (url(), None, false, true),
            (url(), Some("".to_string()), false, true),
            (None, None, true, true),
            (Some("".to_string()), Some("".to_string()), true, true),
        ];

        for (u, k, url_missing, key_missing) in cases {
            let err = BackendConfig::from_values(u, k).unwrap_err();
            assert_eq!(
                err,
                ConfigError::MissingCredentials {
                    url: url_missing,
                    anon_key: key_missing
                }
            );
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_missing_variable_is_logged() {
        BackendConfig::from_values(None, Some("anon-key".to_string())).unwrap_err();

        assert!(logs_contain("Missing Supabase credentials!"));
        assert!(logs_contain("VITE_SUPABASE_URL: ✗ Missing"));
        assert!(logs_contain("VITE_SUPABASE_ANON_KEY: ✓ Set"));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let err = BackendConfig::from_values(Some("   ".to_string()), Some("key".to_string()))
            .unwrap_err();
        assert_eq!(err.missing_vars(), vec![URL_ENV]);
    }

    #[test]
    fn test_error_message_names_variables() {
        let err = ConfigError::MissingCredentials {
            url: true,
            anon_key: true,
        };
        let msg = err.to_string();
        assert!(msg.contains("missing: VITE_SUPABASE_URL, VITE_SUPABASE_ANON_KEY"));

        let err = ConfigError::MissingCredentials {
            url: false,
            anon_key: true,
        };
        assert_eq!(err.missing_vars(), vec![ANON_KEY_ENV]);
    }

    #[test]
    fn test_debug_redacts_key() {
        let cfg = BackendConfig::from_values(
            Some("https://abc.supabase.co".to_string()),
            Some("secret-anon".to_string()),
        )
        .unwrap();
        let debug_str = format!("{:?}", cfg);
        assert!(!debug_str.contains("secret-anon"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
