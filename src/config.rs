use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// One year.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub completion: CompletionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let host: IpAddr = parse_or(&lookup, "APP_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&lookup, "APP_PORT", 8080)?;
        let database_url = required("DATABASE_URL")?;

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => parse_hmac_algorithm(&raw)?,
            None => Algorithm::HS256,
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            algorithm,
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 30)?,
        };
        if !(1..=MAX_TTL_MINUTES).contains(&jwt.ttl_minutes) {
            bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
        }

        let timeout_secs: u64 = parse_or(&lookup, "COMPLETION_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            bail!("COMPLETION_TIMEOUT_SECS must be positive");
        }

        let completion = CompletionConfig {
            base_url: required("COMPLETION_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            api_key: required("COMPLETION_API_KEY")?,
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            database_url,
            jwt,
            completion,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

/// Tokens are signed with a shared secret, so only the HMAC family is usable.
fn parse_hmac_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let algorithm: Algorithm = raw
        .trim()
        .parse()
        .with_context(|| format!("unknown JWT_ALGORITHM: {raw}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM {other:?} needs a key pair; use HS256, HS384 or HS512"),
    }
}
