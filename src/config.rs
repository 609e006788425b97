//! Server configuration read from the environment (and `.env`).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::jurisdiction::{Jurisdiction, JurisdictionError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TYPST_BIN: &str = "typst";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("failed to load jurisdiction: {0}")]
    Jurisdiction(#[from] JurisdictionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub typst_bin: PathBuf,
    /// Sessions idle for longer than this are discarded.
    pub session_ttl: Duration,
    pub max_sessions: u64,
    pub allowed_origins: Vec<String>,
    pub jurisdiction_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            typst_bin: PathBuf::from(DEFAULT_TYPST_BIN),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            jurisdiction_file: None,
        }
    }
}

fn parse<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(default),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ttl_secs = parse(
            "RXPAD_SESSION_TTL_SECS",
            lookup("RXPAD_SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        if ttl_secs == 0 {
            return Err(ConfigError::Zero("RXPAD_SESSION_TTL_SECS"));
        }

        let max_sessions = parse(
            "RXPAD_MAX_SESSIONS",
            lookup("RXPAD_MAX_SESSIONS"),
            DEFAULT_MAX_SESSIONS,
        )?;
        if max_sessions == 0 {
            return Err(ConfigError::Zero("RXPAD_MAX_SESSIONS"));
        }

        let allowed_origins = match non_empty(lookup("RXPAD_ALLOWED_ORIGINS")) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_origins,
        };

        Ok(Self {
            host: non_empty(lookup("RXPAD_HOST")).unwrap_or(defaults.host),
            port: parse("RXPAD_PORT", lookup("RXPAD_PORT"), DEFAULT_PORT)?,
            typst_bin: non_empty(lookup("RXPAD_TYPST_BIN"))
                .map(PathBuf::from)
                .unwrap_or(defaults.typst_bin),
            session_ttl: Duration::from_secs(ttl_secs),
            max_sessions,
            allowed_origins,
            jurisdiction_file: non_empty(lookup("RXPAD_JURISDICTION_FILE")).map(PathBuf::from),
        })
    }

    /// The configured jurisdiction file, or Arizona when none is set.
    pub fn load_jurisdiction(&self) -> Result<Jurisdiction, ConfigError> {
        match &self.jurisdiction_file {
            Some(path) => {
                let jurisdiction = Jurisdiction::from_json_file(path)?;
                log::info!(
                    "Loaded jurisdiction {} from {}",
                    jurisdiction.rules.state,
                    path.display()
                );
                Ok(jurisdiction)
            }
            None => Ok(Jurisdiction::arizona()),
        }
    }
}
