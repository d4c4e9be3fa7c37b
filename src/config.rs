//! Process-wide configuration, resolved once at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::auth::JwtSecret;
use crate::db::Database;
use crate::reaper::DEFAULT_REAP_INTERVAL;

/// Options for `cloudnote serve`. Every flag falls back to an environment
/// variable.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port for the HTTP API
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "CLOUDNOTE_BIND")]
    pub bind: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Secret used to sign identity tokens
    #[arg(long, env = "JWT_TOKEN_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Seconds between expired-note sweeps
    #[arg(long, env = "CLOUDNOTE_REAP_INTERVAL_SECS")]
    pub reap_interval_secs: Option<u64>,

    /// Allowed CORS origins, comma-separated. Permissive when unset.
    #[arg(long, env = "CLOUDNOTE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Path to the SQLite database. Defaults to the platform data directory.
    #[arg(long, env = "DATABASE")]
    pub database: Option<PathBuf>,
}

impl StoreArgs {
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Database::default_path(),
        }
    }
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub database_path: PathBuf,
    pub jwt_secret: JwtSecret,
    pub reap_interval: Duration,
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_args(args: ServeArgs) -> Result<Self> {
        let jwt_secret = JwtSecret::new(args.jwt_secret)
            .context("JWT_TOKEN_SECRET must be set to a non-empty value")?;
        if jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT secret is short ({} chars). Use at least 32 characters.",
                jwt_secret.len()
            );
        }

        let reap_interval = match args.reap_interval_secs {
            Some(0) => anyhow::bail!("reap interval must be at least one second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REAP_INTERVAL,
        };

        let cors_origins: Vec<String> = args
            .cors_origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            port: args.port,
            bind: args.bind,
            database_path: args.store.database_path()?,
            jwt_secret,
            reap_interval,
            cors_origins: (!cors_origins.is_empty()).then_some(cors_origins),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
