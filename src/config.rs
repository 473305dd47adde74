use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Device inventory REST API")]
pub struct Args {
    /// Host to bind to (overrides DEVICES_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DEVICES_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides DEVICES_API_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections (overrides DEVICES_API_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://./data/devices.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::resolve(args, |key| env::var(key))?, migrate))
    }

    /// Merge CLI arguments over the values `lookup` yields for the
    /// `DEVICES_API_*` variables, then over the defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let env_host = lookup("DEVICES_API_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let env_port = parse_var(&lookup, "DEVICES_API_PORT", DEFAULT_PORT)?;
        let env_db =
            lookup("DEVICES_API_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let env_max =
            parse_var(&lookup, "DEVICES_API_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max).max(1),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_flags() {
        let cfg = AppConfig::resolve(Args::default(), lookup_from(&[])).unwrap();

        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_url, "sqlite://./data/devices.db");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn flags_override_environment() {
        let args = Args {
            port: Some(9000),
            ..Default::default()
        };
        let cfg = AppConfig::resolve(
            args,
            lookup_from(&[("DEVICES_API_PORT", "7000"), ("DEVICES_API_HOST", "127.0.0.1")]),
        )
        .unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = AppConfig::resolve(
            Args::default(),
            lookup_from(&[("DEVICES_API_PORT", "eighty")]),
        )
        .unwrap_err();

        assert!(format!("{:#}", err).contains("DEVICES_API_PORT"));
    }
}
