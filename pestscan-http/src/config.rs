use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// `PESTSCAN_BIND`, default `0.0.0.0:5000`.
    pub bind: SocketAddr,
    /// `PESTSCAN_SEED_FILE`: YAML catalog replacing the built-in pests/agrovets.
    pub seed_file: Option<PathBuf>,
    /// `PESTSCAN_LOG_JSON`: emit JSON log lines.
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = get("PESTSCAN_BIND")
            .unwrap_or_else(|| "0.0.0.0:5000".into())
            .parse()?;
        let seed_file = get("PESTSCAN_SEED_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let log_json = get("PESTSCAN_LOG_JSON")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        Ok(Self {
            bind,
            seed_file,
            log_json,
        })
    }
}
