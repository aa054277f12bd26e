use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub sim_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let port = var("MINITWIT_PORT", "8000");
        let metrics_port = var("MINITWIT_METRICS_PORT", "2112");
        let timeout = var("MINITWIT_REQUEST_TIMEOUT_SECS", "10");

        Ok(Self {
            sim_secret: var("SIM_AUTH", ""),
            db_path: var("MINITWIT_DB_PATH", "minitwit.db").into(),
            host: var("MINITWIT_HOST", "0.0.0.0"),
            port: port
                .parse()
                .with_context(|| format!("invalid MINITWIT_PORT {port:?}"))?,
            metrics_port: metrics_port
                .parse()
                .with_context(|| format!("invalid MINITWIT_METRICS_PORT {metrics_port:?}"))?,
            request_timeout: Duration::from_secs(
                timeout
                    .parse()
                    .with_context(|| format!("invalid MINITWIT_REQUEST_TIMEOUT_SECS {timeout:?}"))?,
            ),
        })
    }

    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn metrics_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.metrics_port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.metrics_port, 2112);
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert!(cfg.sim_secret.is_empty());
        assert_eq!(cfg.api_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("SIM_AUTH", "Basic abc"),
            ("MINITWIT_HOST", "127.0.0.1"),
            ("MINITWIT_METRICS_PORT", "9100"),
        ])
        .unwrap();
        assert_eq!(cfg.sim_secret, "Basic abc");
        assert_eq!(cfg.metrics_addr().unwrap().to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(config(&[("MINITWIT_PORT", "eighty")]).is_err());
        assert!(config(&[("MINITWIT_REQUEST_TIMEOUT_SECS", "-1")]).is_err());
    }
}
