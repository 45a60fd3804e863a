use std::{env, time::Duration};

use crate::services::rate_limit::Quota;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub get_quota: Quota,
    pub post_quota: Quota,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?;

        let get_quota = parse_quota(&lookup, "GET_RATE_LIMIT", Quota::per_minute(5))?;
        let post_quota = parse_quota(&lookup, "POST_RATE_LIMIT", Quota::per_minute(10))?;

        let sweep_secs = lookup("RATE_LIMIT_SWEEP_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid RATE_LIMIT_SWEEP_SECS value"))?;

        Ok(Config {
            host,
            port,
            get_quota,
            post_quota,
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_quota(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: Quota,
) -> anyhow::Result<Quota> {
    match lookup(key) {
        Some(raw) => raw
            .parse::<Quota>()
            .map_err(|e| anyhow::anyhow!("Invalid {} value: {}", key, e)),
        None => Ok(default),
    }
}
