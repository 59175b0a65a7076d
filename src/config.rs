use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::{info, warn};
use reqwest::blocking::Client;

pub const DEFAULT_STORAGE_URL: &str = "https://{bucket}.s3.amazonaws.com/{key}";
pub const DEFAULT_OUTPUT_KEY: &str = "processed_client_data.csv";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Runtime settings, read once at startup from `CLIENT_DESK_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Analysis function endpoint. Empty means not configured.
    pub analyze_url: String,
    /// Recommendation-persistence function endpoint.
    pub recommend_url: String,
    /// Public object URL template with `{bucket}` and `{key}` placeholders.
    pub storage_url: String,
    /// Default key of the processed client CSV.
    pub output_key: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyze_url: String::new(),
            recommend_url: String::new(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank variables
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| load_or(var(key), key, default);

        const TIMEOUT_KEY: &str = "CLIENT_DESK_HTTP_TIMEOUT_SECS";
        let timeout_secs = match try_parse(var(TIMEOUT_KEY), TIMEOUT_KEY, DEFAULT_HTTP_TIMEOUT_SECS) {
            0 => {
                warn!("{TIMEOUT_KEY} must be positive, using default: {DEFAULT_HTTP_TIMEOUT_SECS}");
                DEFAULT_HTTP_TIMEOUT_SECS
            }
            secs => secs,
        };

        Self {
            analyze_url: text("CLIENT_DESK_ANALYZE_URL", &defaults.analyze_url),
            recommend_url: text("CLIENT_DESK_RECOMMEND_URL", &defaults.recommend_url),
            storage_url: text("CLIENT_DESK_STORAGE_URL", &defaults.storage_url),
            output_key: text("CLIENT_DESK_OUTPUT_KEY", &defaults.output_key),
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Shared blocking HTTP client for storage reads and remote calls.
    pub fn http_client(&self) -> reqwest::Result<Client> {
        Client::builder().timeout(self.http_timeout).build()
    }
}

fn load_or(value: Option<String>, key: &str, default: &str) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_else(|| {
        if default.is_empty() {
            warn!("{key} not set; the matching action stays disabled");
        } else {
            info!("{key} not set, using default: {default}");
        }
        default.to_string()
    })
}

fn try_parse<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?} ({e}), using default: {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("CLIENT_DESK_ANALYZE_URL", " https://fn.example/analyze "),
            ("CLIENT_DESK_STORAGE_URL", "http://localhost:9000/{bucket}/{key}"),
            ("CLIENT_DESK_HTTP_TIMEOUT_SECS", "5"),
            ("CLIENT_DESK_OUTPUT_KEY", ""),
        ]));
        assert_eq!(config.analyze_url, "https://fn.example/analyze");
        assert_eq!(config.storage_url, "http://localhost:9000/{bucket}/{key}");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.output_key, DEFAULT_OUTPUT_KEY);
        assert!(config.recommend_url.is_empty());
    }

    #[test]
    fn invalid_timeout_falls_back() {
        for raw in ["soon", "0", " 0 ", "-5"] {
            let config = Config::from_lookup(lookup_from(&[("CLIENT_DESK_HTTP_TIMEOUT_SECS", raw)]));
            assert_eq!(
                config.http_timeout,
                Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
                "{raw:?} should fall back"
            );
        }
    }
}
