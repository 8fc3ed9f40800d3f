use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use regatta_common::Url;

use crate::poll::DEFAULT_INTERVAL;

pub const DEFAULT_API_URL: &str = "https://amanda.capraworks.com/api/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_base: Url,
    pub poll_interval: Duration,
    pub session_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: Url::new(DEFAULT_API_URL),
            poll_interval: DEFAULT_INTERVAL,
            session_dir: default_session_dir(),
            log_filter: String::from("info"),
        }
    }
}

impl Config {
    /// Reads `REGATTA_*` variables, after loading a `.env` file if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(base) = var("REGATTA_API_URL") {
            config.api_base = Url::new(base);
        }
        if let Some(ms) = var("REGATTA_POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("REGATTA_POLL_INTERVAL_MS must be milliseconds, got `{ms}`"))?;
            anyhow::ensure!(ms > 0, "REGATTA_POLL_INTERVAL_MS must be positive");
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(dir) = var("REGATTA_SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        if let Some(filter) = var("REGATTA_LOG") {
            config.log_filter = filter;
        }
        Ok(config)
    }
}

fn default_session_dir() -> PathBuf {
    ProjectDirs::from("com", "capraworks", "regatta")
        .map(|dirs| dirs.data_dir().join("session"))
        .unwrap_or_else(|| PathBuf::from("regatta-session"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_mobile_app() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.api_base.0, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_vars(vars(&[
            ("REGATTA_API_URL", "http://127.0.0.1:8000/api"),
            ("REGATTA_POLL_INTERVAL_MS", "250"),
            ("REGATTA_SESSION_DIR", "/tmp/regatta"),
            ("REGATTA_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_base.0, "http://127.0.0.1:8000/api/");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.session_dir, PathBuf::from("/tmp/regatta"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn bad_interval_is_rejected() {
        assert!(Config::from_vars(vars(&[("REGATTA_POLL_INTERVAL_MS", "soon")])).is_err());
        assert!(Config::from_vars(vars(&[("REGATTA_POLL_INTERVAL_MS", "0")])).is_err());
    }
}
