//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8000`)
//! - `API_PREFIX`: route prefix (default `/api`)
//! - `DEBUG`: verbose logging (default `false`)
//! - `CORS_ORIGINS`: comma-separated list or JSON array; `*` allows any
//! - `CATALOG_PATH`: `.json`/`.yaml` catalog (default: built-in catalog)
//! - `LLM_PROVIDER`: `openai` (default) or `simple`
//! - `LLM_BASE_URL`, `LLM_API_KEY`, `LLM_MODEL`
//! - `LLM_TIMEOUT_SECS` (20), `LLM_MAX_TOKENS` (512), `LLM_TEMPERATURE` (0.8)
//! - `LLM_RETRY_DELAY_MS` (250), `LLM_MAX_RETRY_AFTER_SECS` (2)
//! - `CHAT_MAX_MESSAGE_CHARS` (2000)
//! - `SEARCH_MIN_QUERY_LENGTH` (3), `SEARCH_MAX_RESULTS` (20)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::characters::CatalogSource;
use crate::llms::providers::{
    ProviderKind, ProviderSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
use crate::llms::retry::RetryPolicy;
use crate::persona::prompt_builder::DEFAULT_MAX_MESSAGE_CHARS;

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:8000"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Limits for `GET /search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub min_query_length: usize,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_length: 3,
            max_results: 20,
        }
    }
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Route prefix, normalized to a leading slash and no trailing slash.
    /// Empty means routes live at the root.
    pub prefix: String,
    pub cors_origins: Vec<String>,
    pub search: SearchSettings,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            search: SearchSettings::default(),
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub api: ApiSettings,
    pub catalog: CatalogSource,
    pub provider: ProviderSettings,
    pub max_message_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            api: ApiSettings::default(),
            catalog: CatalogSource::Builtin,
            provider: ProviderSettings::default(),
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();
        let default_provider = ProviderSettings::default();

        let kind = match get("LLM_PROVIDER") {
            Some(raw) => ProviderKind::from_str(&raw).map_err(|reason| ConfigError::Invalid {
                key: "LLM_PROVIDER",
                reason,
            })?,
            None => default_provider.kind,
        };

        let timeout_secs: u64 = parse(&get, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "LLM_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let provider = ProviderSettings {
            kind,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: get("LLM_API_KEY"),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens: parse(&get, "LLM_MAX_TOKENS", default_provider.max_tokens)?,
            temperature: parse(&get, "LLM_TEMPERATURE", default_provider.temperature)?,
            retry: RetryPolicy {
                delay: Duration::from_millis(parse(
                    &get,
                    "LLM_RETRY_DELAY_MS",
                    default_provider.retry.delay.as_millis() as u64,
                )?),
                max_retry_after: Duration::from_secs(parse(
                    &get,
                    "LLM_MAX_RETRY_AFTER_SECS",
                    default_provider.retry.max_retry_after.as_secs(),
                )?),
            },
        };

        let max_message_chars: usize =
            parse(&get, "CHAT_MAX_MESSAGE_CHARS", defaults.max_message_chars)?;
        if max_message_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "CHAT_MAX_MESSAGE_CHARS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let search = SearchSettings {
            min_query_length: parse(
                &get,
                "SEARCH_MIN_QUERY_LENGTH",
                defaults.api.search.min_query_length,
            )?,
            max_results: parse(&get, "SEARCH_MAX_RESULTS", defaults.api.search.max_results)?,
        };
        if search.max_results == 0 {
            return Err(ConfigError::Invalid {
                key: "SEARCH_MAX_RESULTS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let api = ApiSettings {
            prefix: normalize_prefix(&get("API_PREFIX").unwrap_or_else(|| defaults.api.prefix)),
            cors_origins: match get("CORS_ORIGINS") {
                Some(raw) => parse_origins(&raw)?,
                None => defaults.api.cors_origins,
            },
            search,
        };

        Ok(Self {
            host: get("API_HOST").unwrap_or(defaults.host),
            port: parse(&get, "API_PORT", defaults.port)?,
            debug: match get("DEBUG") {
                Some(raw) => parse_bool("DEBUG", &raw)?,
                None => defaults.debug,
            },
            api,
            catalog: get("CATALOG_PATH")
                .map(|path| CatalogSource::File(path.into()))
                .unwrap_or(CatalogSource::Builtin),
            provider,
            max_message_chars,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("'{}': {}", raw.trim(), e),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

/// Accepts `a,b,c` or a JSON array of strings.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let raw = raw.trim();
    let origins: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
            key: "CORS_ORIGINS",
            reason: e.to_string(),
        })?
    } else {
        raw.split(',').map(str::to_string).collect()
    };
    Ok(origins
        .into_iter()
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect())
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = load(&[]).unwrap();
        assert_eq!(s.bind_addr(), "0.0.0.0:8000");
        assert_eq!(s.api.prefix, "/api");
        assert_eq!(s.catalog, CatalogSource::Builtin);
        assert_eq!(s.provider.kind, ProviderKind::OpenAi);
        assert_eq!(s.provider.timeout, Duration::from_secs(20));
        assert_eq!(s.max_message_chars, 2000);
        assert_eq!(s.api.search, SearchSettings::default());
        assert!(s.provider.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let s = load(&[
            ("API_PORT", "9100"),
            ("API_PREFIX", "lore/"),
            ("DEBUG", "yes"),
            ("CATALOG_PATH", "/data/chars.yaml"),
            ("LLM_PROVIDER", "simple"),
            ("LLM_BASE_URL", "http://llm.local/generate"),
            ("LLM_API_KEY", "sk-123"),
            ("LLM_TIMEOUT_SECS", "5"),
            ("LLM_RETRY_DELAY_MS", "50"),
            ("CHAT_MAX_MESSAGE_CHARS", "500"),
            ("SEARCH_MAX_RESULTS", "5"),
        ])
        .unwrap();
        assert_eq!(s.port, 9100);
        assert_eq!(s.api.prefix, "/lore");
        assert!(s.debug);
        assert_eq!(s.catalog, CatalogSource::File("/data/chars.yaml".into()));
        assert_eq!(s.provider.kind, ProviderKind::Simple);
        assert_eq!(s.provider.api_key.as_deref(), Some("sk-123"));
        assert_eq!(s.provider.timeout, Duration::from_secs(5));
        assert_eq!(s.provider.retry.delay, Duration::from_millis(50));
        assert_eq!(s.max_message_chars, 500);
        assert_eq!(s.api.search.max_results, 5);
    }

    #[test]
    fn test_cors_origins_formats() {
        let s = load(&[("CORS_ORIGINS", "http://a.test, http://b.test/")]).unwrap();
        assert_eq!(s.api.cors_origins, vec!["http://a.test", "http://b.test"]);

        let s = load(&[("CORS_ORIGINS", r#"["https://wiki.example"]"#)]).unwrap();
        assert_eq!(s.api.cors_origins, vec!["https://wiki.example"]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("API_PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "API_PORT", .. })
        ));
        assert!(matches!(
            load(&[("LLM_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { key: "LLM_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            load(&[("LLM_PROVIDER", "carrier-pigeon")]),
            Err(ConfigError::Invalid { key: "LLM_PROVIDER", .. })
        ));
        assert!(matches!(
            load(&[("DEBUG", "maybe")]),
            Err(ConfigError::Invalid { key: "DEBUG", .. })
        ));
    }

    #[test]
    fn test_root_prefix() {
        assert_eq!(load(&[("API_PREFIX", "/")]).unwrap().api.prefix, "");
    }
}
