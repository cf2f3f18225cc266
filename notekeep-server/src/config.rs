//! Command-line and environment configuration

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use notekeep_core::auth::{SigningKey, TokenService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Resolved server settings
#[derive(Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    /// Secret the signing key is derived from; random per process when absent
    pub token_secret: Option<String>,
    pub token_ttl: Duration,
    pub log_json: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("data_dir", &self.data_dir)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .field("log_json", &self.log_json)
            .finish()
    }
}

pub fn command() -> Command {
    Command::new("notekeep-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal notes backend with bearer-token authentication")
        .arg(
            Arg::new("bind")
                .long("bind")
                .env("NOTEKEEP_BIND")
                .value_name("ADDR")
                .help("Bind address")
                .default_value("127.0.0.1:8080")
                .value_parser(value_parser!(SocketAddr)),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .env("NOTEKEEP_DATA_DIR")
                .value_name("PATH")
                .help("Data directory path")
                .default_value("./data")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("token-secret")
                .long("token-secret")
                .env("NOTEKEEP_TOKEN_SECRET")
                .hide_env_values(true)
                .value_name("SECRET")
                .help("Secret the token signing key is derived from (at least 16 bytes)"),
        )
        .arg(
            Arg::new("token-ttl-minutes")
                .long("token-ttl-minutes")
                .env("NOTEKEEP_TOKEN_TTL_MINUTES")
                .value_name("MINUTES")
                .help("Lifetime of issued access tokens")
                .default_value("30")
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .env("NOTEKEEP_LOG_JSON")
                .help("Emit logs as JSON lines")
                .action(ArgAction::SetTrue),
        )
}

impl ServerConfig {
    /// Parse the process arguments and environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let bind = matches
            .get_one::<SocketAddr>("bind")
            .copied()
            .ok_or_else(|| anyhow!("missing bind address"))?;

        let data_dir = matches
            .get_one::<PathBuf>("data-dir")
            .cloned()
            .ok_or_else(|| anyhow!("missing data directory"))?;

        let ttl_minutes = matches
            .get_one::<u64>("token-ttl-minutes")
            .copied()
            .ok_or_else(|| anyhow!("missing token TTL"))?;

        Ok(ServerConfig {
            bind,
            data_dir,
            token_secret: matches.get_one::<String>("token-secret").cloned(),
            token_ttl: Duration::from_secs(ttl_minutes.saturating_mul(60)),
            log_json: matches.get_flag("log-json"),
        })
    }

    /// Build the process-wide token service
    pub fn token_service(&self) -> anyhow::Result<TokenService> {
        let key = match &self.token_secret {
            Some(secret) => SigningKey::from_secret(secret.as_bytes())
                .context("invalid token secret")?,
            None => {
                warn!("No token secret configured; generated a random key, tokens will not survive a restart");
                SigningKey::generate()
            }
        };

        let tokens = TokenService::new(key, self.token_ttl).context("invalid token settings")?;
        info!(
            "Token signing key {} (ttl {}s)",
            tokens.signing_key().fingerprint(),
            tokens.ttl().as_secs()
        );

        Ok(tokens)
    }
}
