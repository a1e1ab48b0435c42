//! Server configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it; flags win. A `.env` file in the working directory is
//! read into the environment first, without overriding variables already set.

use crate::services::history::{DEFAULT_HISTORY_FILE, DEFAULT_HISTORY_LIMIT};
use crate::services::provider::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

use clap::{Parser, ValueEnum};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Cloud API when credentials are available, web endpoint otherwise
    Auto,
    GoogleCloud,
    GoogleWeb,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Swedish to English translation service", long_about = None)]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "BIND_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// JSON file holding the translation history
    #[arg(long, env = "HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    pub history_file: PathBuf,

    /// Maximum number of history entries kept
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT, value_parser = parse_positive)]
    pub history_limit: usize,

    /// Directory with the static UI
    #[arg(long, env = "PUBLIC_DIR", default_value = DEFAULT_PUBLIC_DIR)]
    pub public_dir: PathBuf,

    #[arg(long, env = "TRANSLATION_PROVIDER", value_enum, default_value_t = ProviderKind::Auto)]
    pub provider: ProviderKind,

    /// Per-attempt timeout for provider calls
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub provider_timeout_secs: u64,

    /// Attempts per translation, including the first
    #[arg(long, env = "PROVIDER_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES, value_parser = parse_positive)]
    pub provider_max_retries: usize,

    /// Override the provider endpoint (proxies, tests)
    #[arg(long, env = "PROVIDER_BASE_URL")]
    pub provider_base_url: Option<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.provider_max_retries,
            timeout: Duration::from_secs(self.provider_timeout_secs),
            ..RetryPolicy::default()
        }
    }
}

/// Outcome of reading a `.env` file. Loading happens before logging is set
/// up, so the result is kept and reported afterwards.
#[derive(Debug)]
pub enum DotEnv {
    Loaded(PathBuf),
    Missing,
    Failed(dotenvy::Error),
}

impl DotEnv {
    pub fn log(&self) {
        match self {
            DotEnv::Loaded(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            DotEnv::Missing => tracing::debug!("no .env file found"),
            DotEnv::Failed(e) => tracing::warn!(error = %e, "failed to load .env"),
        }
    }
}

/// Looks for `.env` in the working directory and its parents.
pub fn load_dotenv() -> DotEnv {
    classify(dotenvy::dotenv())
}

pub fn load_dotenv_from(path: &Path) -> DotEnv {
    classify(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn classify(result: Result<PathBuf, dotenvy::Error>) -> DotEnv {
    match result {
        Ok(path) => DotEnv::Loaded(path),
        Err(e) if e.not_found() => DotEnv::Missing,
        Err(e) => DotEnv::Failed(e),
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
