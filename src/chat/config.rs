//! Configuration for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and resolution of
//! arguments against the environment into a runnable configuration.

use std::env;

use arrrg_derive::CommandLine;
use uuid::Uuid;

use crate::config::{BASE_URL_VAR, CoachConfig, PUBLISHABLE_KEY_VAR};
use crate::{Error, Result};

/// Default SQLite database path.
pub const DEFAULT_DB_PATH: &str = "levelup.db";

/// Command-line arguments for the levelup-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: $LEVELUP_BASE_URL)", "URL")]
    pub base_url: Option<String>,

    /// Publishable client key.
    #[arrrg(
        optional,
        "Publishable client key (default: $LEVELUP_PUBLISHABLE_KEY)",
        "KEY"
    )]
    pub key: Option<String>,

    /// SQLite database path.
    #[arrrg(optional, "SQLite database path (default: levelup.db)", "PATH")]
    pub db: Option<String>,

    /// User id to scope history to.
    #[arrrg(optional, "User id (UUID) to scope history to", "UUID")]
    pub user: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Client configuration for the coach endpoint.
    pub coach: CoachConfig,

    /// Path of the local SQLite database.
    pub db_path: String,

    /// The user id to sign in as, when supplied.
    pub user: Option<Uuid>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Resolves arguments against the environment.
    ///
    /// The base URL and key fall back to `LEVELUP_BASE_URL` and
    /// `LEVELUP_PUBLISHABLE_KEY`; a value available from neither place is a
    /// configuration error.
    pub fn resolve(args: ChatArgs) -> Result<Self> {
        let base_url = match args.base_url {
            Some(base_url) => base_url,
            None => env::var(BASE_URL_VAR).map_err(|_| {
                Error::config(
                    format!("--base-url not given and {BASE_URL_VAR} not set"),
                    Some("base_url".to_string()),
                )
            })?,
        };
        let key = match args.key {
            Some(key) => key,
            None => env::var(PUBLISHABLE_KEY_VAR).map_err(|_| {
                Error::config(
                    format!("--key not given and {PUBLISHABLE_KEY_VAR} not set"),
                    Some("api_key".to_string()),
                )
            })?,
        };
        let user = args
            .user
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|e| {
                    Error::config(format!("invalid --user id: {e}"), Some("user".to_string()))
                })
            })
            .transpose()?;

        Ok(Self {
            coach: CoachConfig::new(base_url, key)?,
            db_path: args.db.unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            user,
            use_color: !args.no_color,
        })
    }
}
