//! Configuration management for the sync client.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which conflict policy the client runs with.
///
/// Selected by static configuration, not discovered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// Remote content always wins
    RemoteWins,
    /// Ask the operator, falling back to remote-wins when no prompt exists
    Interactive,
}

impl FromStr for PolicyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote-wins" => Ok(PolicyMode::RemoteWins),
            "interactive" => Ok(PolicyMode::Interactive),
            _ => Err(()),
        }
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint for the remote quote list (GET) and push-back (POST)
    pub remote_url: String,
    /// Directory for the JSON file storage
    pub data_dir: PathBuf,
    /// Period between sync cycles
    pub poll_interval: Duration,
    /// Bounded prefix of the remote list considered per cycle
    pub fetch_cap: usize,
    /// Conflict policy variant
    pub policy: PolicyMode,
    /// Push the local version upstream when the operator keeps it
    pub push_on_local_win: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let remote_url = env::var("REMOTE_URL").map_err(|_| ConfigError::MissingRemoteUrl)?;

        let data_dir = env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let poll_interval_secs: u64 = parse_var("POLL_INTERVAL_SECS", "20")?;
        let fetch_cap: usize = parse_var("FETCH_CAP", "10")?;

        let policy = env::var("CONFLICT_POLICY").unwrap_or_else(|_| "remote-wins".to_string());
        let policy = policy.parse().map_err(|_| ConfigError::InvalidValue {
            name: "CONFLICT_POLICY",
            value: policy,
        })?;

        let push_on_local_win: bool = parse_var("PUSH_ON_LOCAL_WIN", "false")?;

        Ok(Self {
            remote_url,
            data_dir,
            poll_interval: Duration::from_secs(poll_interval_secs),
            fetch_cap,
            policy,
            push_on_local_win,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("REMOTE_URL environment variable is required")]
    MissingRemoteUrl,

    #[error("invalid {name} value: {value}")]
    InvalidValue { name: &'static str, value: String },
}
