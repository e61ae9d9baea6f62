use clap::{Parser, Subcommand};

/// Default OAuth provider for `vibex login`
pub const DEFAULT_PROVIDER: &str = "github";

/// Default callback URL the provider redirects to after sign-in
pub const DEFAULT_REDIRECT_TO: &str = "http://localhost:5173/auth/callback";

/// Vibex backend client - configuration and connectivity checks
#[derive(Parser)]
#[command(name = "vibex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to store session data. Defaults to ~/.vibex
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify the backend is reachable (exit code 1 if not)
    Check,
    /// Show configuration, client options and session status
    Status,
    /// Sign in with an OAuth provider using the PKCE flow
    Login {
        /// OAuth provider name
        #[arg(long, default_value = DEFAULT_PROVIDER)]
        provider: String,

        /// Callback URL registered with the backend
        #[arg(long, default_value = DEFAULT_REDIRECT_TO)]
        redirect_to: String,
    },
    /// Sign out and remove the stored session
    Logout,
}
