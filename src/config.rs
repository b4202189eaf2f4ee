use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FASTGPT_API_URL: &str = "https://kagi.com/api/v0/fastgpt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read {key} file {path}: {source}")]
    File {
        key: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which engine turns extracted article markup into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    Markdown,
    Text,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    /// Route prefix without surrounding slashes; empty mounts routes at the root.
    pub plugins_prefix: String,
    /// Empty allows any origin.
    pub cors_allow_origins: Vec<String>,
    pub fetch_timeout: Duration,
    pub search_timeout: Duration,
    pub fastgpt_api_url: String,
    pub converter: ConverterKind,
    pub text_width: usize,
    pub user_agent: String,
    pub log_level: tracing::Level,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let prefix = match get("PLUGINS_PREFIX_FILE") {
            Some(path) => std::fs::read_to_string(&path).map_err(|source| ConfigError::File {
                key: "PLUGINS_PREFIX_FILE",
                path,
                source,
            })?,
            None => get_or_default("PLUGINS_PREFIX", ""),
        };

        let cors_allow_origins = get_or_default("CORS_ALLOW_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let converter = match get_or_default("PAGE_CONVERTER", "markdown").to_lowercase().as_str() {
            "markdown" | "md" => ConverterKind::Markdown,
            "text" | "plain" => ConverterKind::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "PAGE_CONVERTER",
                    value: other.to_string(),
                });
            }
        };

        let log_level = get_or_default("LOG_LEVEL", "info");
        let log_level = log_level.parse::<tracing::Level>().map_err(|_| ConfigError::Invalid {
            key: "LOG_LEVEL",
            value: log_level.clone(),
        })?;

        Ok(Config {
            listen_address: get_or_default("LISTEN_ADDRESS", "0.0.0.0:8081"),
            plugins_prefix: normalize_prefix(&prefix),
            cors_allow_origins,
            fetch_timeout: Duration::from_secs(parse_u64(get("FETCH_TIMEOUT_SECS"), "FETCH_TIMEOUT_SECS", 10)?),
            search_timeout: Duration::from_secs(parse_u64(get("SEARCH_TIMEOUT_SECS"), "SEARCH_TIMEOUT_SECS", 10)?),
            fastgpt_api_url: get_or_default("FASTGPT_API_URL", DEFAULT_FASTGPT_API_URL),
            converter,
            text_width: parse_u64(get("TEXT_WIDTH"), "TEXT_WIDTH", 100)? as usize,
            user_agent: get_or_default("USER_AGENT", concat!("plugin-relay/", env!("CARGO_PKG_VERSION"))),
            log_level,
        })
    }

    /// Path the plugin routes are nested under, e.g. `/tools`, or `None` for the root.
    pub fn route_prefix(&self) -> Option<String> {
        (!self.plugins_prefix.is_empty()).then(|| format!("/{}", self.plugins_prefix))
    }
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_matches('/').to_string()
}

fn parse_u64(value: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => match v.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.listen_address, "0.0.0.0:8081");
        assert_eq!(config.plugins_prefix, "");
        assert!(config.route_prefix().is_none());
        assert!(config.cors_allow_origins.is_empty());
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.search_timeout, Duration::from_secs(10));
        assert_eq!(config.fastgpt_api_url, DEFAULT_FASTGPT_API_URL);
        assert_eq!(config.converter, ConverterKind::Markdown);
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_prefix_is_trimmed() {
        let config = config_with(&[("PLUGINS_PREFIX", " /tools/ \n")]).unwrap();
        assert_eq!(config.plugins_prefix, "tools");
        assert_eq!(config.route_prefix().as_deref(), Some("/tools"));
    }

    #[test]
    fn test_prefix_file_overrides_prefix() {
        let path = std::env::temp_dir().join(format!("plugin-relay-prefix-{}", std::process::id()));
        std::fs::write(&path, "secret-prefix\n").unwrap();

        let config = config_with(&[
            ("PLUGINS_PREFIX", "ignored"),
            ("PLUGINS_PREFIX_FILE", path.to_str().unwrap()),
        ])
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.plugins_prefix, "secret-prefix");
    }

    #[test]
    fn test_missing_prefix_file_is_an_error() {
        let result = config_with(&[("PLUGINS_PREFIX_FILE", "/definitely/not/here")]);
        assert!(matches!(result, Err(ConfigError::File { .. })));
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config =
            config_with(&[("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example,,")]).unwrap();
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        assert!(config_with(&[("FETCH_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_with(&[("SEARCH_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_converter_selection() {
        let config = config_with(&[("PAGE_CONVERTER", "TEXT")]).unwrap();
        assert_eq!(config.converter, ConverterKind::Text);
        assert!(config_with(&[("PAGE_CONVERTER", "pdf")]).is_err());
    }
}
