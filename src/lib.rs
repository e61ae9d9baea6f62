//! Vibex backend client.
//!
//! Configures the single handle the application uses to talk to its hosted
//! backend (auth, database, realtime) and provides a connectivity probe.
//!
//! ```ignore
//! let client = vibex_backend::initialize()?;
//! if !client.check_connection().await.is_ok() {
//!     // diagnostic only; the details were already logged
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod health;
pub mod options;
pub mod query;
pub mod realtime;
pub mod runtime;
pub mod session;
pub mod startup;

pub use auth::AuthError;
pub use client::ClientHandle;
pub use config::{BackendConfig, ConfigError};
pub use health::{check_connection, ConnectionStatus};
pub use options::{ClientOptions, FlowType};
pub use query::{QueryError, TableQuery};
pub use session::{AuthSession, SessionStore};
pub use startup::{initialize, initialize_with};
