//! Configuration for the prompt router.
//!
//! The router is configured via an optional TOML file, with support for
//! environment variable interpolation using `${VAR_NAME}` syntax. Every section
//! has defaults, so running without a file is valid.
//!
//! # Example
//!
//! ```toml
//! [api]
//! url = "https://api.euron.one/api/v1/euri/alpha/chat/completions"
//! token_env = "EURON_API_TOKEN"
//! temperature = 0.7
//! max_tokens = 1000
//!
//! [api.headers]
//! X-Team = "${TEAM_NAME}"
//!
//! [retry]
//! max_attempts = 3
//!
//! [routing]
//! unknown_models = "skip"
//!
//! [logging]
//! level = "info"
//! file = "interaction_log.txt"
//! ```

mod batch;
mod observability;
mod providers;
mod routing;

use std::path::{Path, PathBuf};

pub use batch::*;
pub use observability::*;
pub use providers::*;
pub use routing::*;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "prompt-router.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Completion endpoint and request parameters.
    #[serde(default)]
    pub api: ApiConfig,

    /// Per-model attempt budget.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Model selection behaviour.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Catalog additions and fallback overrides.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Console and interaction-log settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Batch harness settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: RouterConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, else fall back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Validate the configuration for consistency and completeness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        if !(api.url.starts_with("http://") || api.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.url must be an http(s) URL, got '{}'",
                api.url
            )));
        }
        if api.token_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api.token_env must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&api.temperature) {
            return Err(ConfigError::Validation(format!(
                "api.temperature must be between 0.0 and 2.0, got {}",
                api.temperature
            )));
        }
        if api.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "api.max_tokens must be at least 1".into(),
            ));
        }
        if api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be at least 1".into(),
            ));
        }
        for (name, value) in &api.headers {
            if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::Validation(format!(
                    "api.headers: invalid header name '{name}'"
                )));
            }
            if http::HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::Validation(format!(
                    "api.headers: invalid value for header '{name}'"
                )));
            }
        }

        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&retry.jitter) {
            return Err(ConfigError::Validation(format!(
                "retry.jitter must be between 0.0 and 1.0, got {}",
                retry.jitter
            )));
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation(format!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                retry.backoff_multiplier
            )));
        }

        for entry in &self.catalog.models {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "catalog.models: model id must not be empty".into(),
                ));
            }
        }
        for (id, alternates) in &self.catalog.fallbacks {
            if alternates.iter().any(|m| m.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "catalog.fallbacks: empty model id in list for '{id}'"
                )));
            }
        }

        Ok(())
    }

    /// Resolve the bearer token from the environment variable named by
    /// `api.token_env`. Absent or blank values are an error.
    pub fn credential(&self) -> Result<ApiCredential, ConfigError> {
        match std::env::var(&self.api.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(ApiCredential::new(token.trim())),
            _ => Err(ConfigError::MissingCredential(self.api.token_env.clone())),
        }
    }
}

/// Pick the config file to load, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        return Ok(Some(cwd_config));
    }

    Ok(None)
}

/// Load a `.env` file from the working directory (or its parents) into the
/// process environment. Returns the path loaded, or `None` when there is no
/// such file. Variables already set in the environment are not overridden.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::Dotenv(e)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("API credential missing: set the {0} environment variable")]
    MissingCredential(String),

    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Expand `${VAR}` references from the environment.
///
/// References after a `#` on the same line are left untouched so commented-out
/// settings never require their variables to be set.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RouterConfig::from_str("").unwrap();
        assert_eq!(config.api.token_env, "EURON_API_TOKEN");
        assert_eq!(config.api.max_tokens, 1000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 0);
        assert_eq!(config.routing.unknown_models, UnknownModelPolicy::Skip);
        assert_eq!(
            config.logging.log_file(),
            Some(Path::new("interaction_log.txt"))
        );
        assert_eq!(config.batch.output, PathBuf::from("model_test_results.csv"));
        assert_eq!(config.batch.pause_ms, 1000);
    }

    #[test]
    fn test_full_config() {
        let config = RouterConfig::from_str(
            r#"
            [api]
            url = "http://localhost:8080/v1/chat/completions"
            token_env = "MY_TOKEN"
            temperature = 0.2
            max_tokens = 256
            timeout_secs = 5

            [api.headers]
            X-Team = "research"

            [retry]
            max_attempts = 2
            delay_ms = 50
            jitter = 0.0

            [routing]
            unknown_models = "attempt"

            [catalog]
            models = [{ id = "local-model", capability = "testing" }]

            [catalog.fallbacks]
            "local-model" = ["gpt-4.1-mini"]

            [logging]
            level = "debug"
            format = "json"
            file = ""

            [batch]
            output = "out.csv"
            pause_ms = 0
        "#,
        )
        .unwrap();

        assert_eq!(config.api.token_env, "MY_TOKEN");
        assert_eq!(config.api.temperature, 0.2);
        assert_eq!(config.api.headers.get("X-Team").unwrap(), "research");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.routing.unknown_models, UnknownModelPolicy::Attempt);
        assert_eq!(config.catalog.models[0].id, "local-model");
        assert_eq!(config.catalog.fallbacks["local-model"], ["gpt-4.1-mini"]);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.log_file().is_none());
        assert_eq!(config.batch.pause_ms, 0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RouterConfig::from_str("[api]\nendpoint = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RouterConfig::from_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("max_attempts")));
    }

    #[test]
    fn test_shrinking_backoff_rejected() {
        let err = RouterConfig::from_str("[retry]\nbackoff_multiplier = 0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("backoff_multiplier")));

        let config =
            RouterConfig::from_str("[retry]\nmax_delay_ms = 500\nbackoff_multiplier = 1.5").unwrap();
        assert_eq!(config.retry.max_delay_ms, 500);
        assert_eq!(config.retry.backoff_multiplier, 1.5);
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let err = RouterConfig::from_str("[api]\ntemperature = 2.5").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("temperature")));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = RouterConfig::from_str("[api]\nurl = \"ftp://example.com\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("api.url")));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = RouterConfig::from_str("[api.headers]\n\"Bad Header\" = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("Bad Header")));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("TEST_API_URL", Some("https://example.com/chat"), || {
            let result = expand_env_vars("url = \"${TEST_API_URL}\"").unwrap();
            assert_eq!(result, "url = \"https://example.com/chat\"");
        });
    }

    #[test]
    fn test_env_var_expanded_into_config() {
        temp_env::with_var("TEST_TEAM_HEADER", Some("research"), || {
            let config =
                RouterConfig::from_str("[api.headers]\nX-Team = \"${TEST_TEAM_HEADER}\"").unwrap();
            assert_eq!(config.api.headers["X-Team"], "research");
        });
    }

    #[test]
    fn test_missing_env_var_is_error() {
        temp_env::with_var_unset("TEST_SURELY_UNSET_VAR", || {
            let err = RouterConfig::from_str("[api]\nurl = \"${TEST_SURELY_UNSET_VAR}\"")
                .unwrap_err();
            assert!(matches!(err, ConfigError::EnvVarNotFound(name) if name == "TEST_SURELY_UNSET_VAR"));
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let result = expand_env_vars("# url = \"${NONEXISTENT_VAR}\"").unwrap();
        assert_eq!(result, "# url = \"${NONEXISTENT_VAR}\"");
    }

    #[test]
    fn test_env_var_before_comment_expanded() {
        temp_env::with_var("TEST_BEFORE_COMMENT", Some("expanded"), || {
            let result =
                expand_env_vars("key = \"${TEST_BEFORE_COMMENT}\" # ${NONEXISTENT}").unwrap();
            assert_eq!(result, "key = \"expanded\" # ${NONEXISTENT}");
        });
    }

    #[test]
    fn test_multiline_keeps_trailing_newline() {
        let input = "a = 1\nb = 2\n";
        assert_eq!(expand_env_vars(input).unwrap(), input);
    }

    #[test]
    #[serial]
    fn test_credential_from_env() {
        temp_env::with_var("EURON_API_TOKEN", Some("  tok-123 "), || {
            let credential = RouterConfig::default().credential().unwrap();
            assert_eq!(credential.expose(), "tok-123");
        });
    }

    #[test]
    #[serial]
    fn test_missing_credential() {
        temp_env::with_var_unset("EURON_API_TOKEN", || {
            let err = RouterConfig::default().credential().unwrap_err();
            assert!(matches!(err, ConfigError::MissingCredential(name) if name == "EURON_API_TOKEN"));
        });
    }

    #[test]
    #[serial]
    fn test_blank_credential_is_missing() {
        temp_env::with_var("EURON_API_TOKEN", Some("   "), || {
            assert!(matches!(
                RouterConfig::default().credential(),
                Err(ConfigError::MissingCredential(_))
            ));
        });
    }

    #[test]
    fn test_credential_uses_configured_variable() {
        temp_env::with_var("TEST_ALT_TOKEN", Some("alt"), || {
            let config = RouterConfig::from_str("[api]\ntoken_env = \"TEST_ALT_TOKEN\"").unwrap();
            assert_eq!(config.credential().unwrap().expose(), "alt");
        });
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\nmax_attempts = 5").unwrap();

        let config = RouterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 5);

        let loaded = RouterConfig::load(Some(file.path())).unwrap();
        assert_eq!(loaded.retry.max_attempts, 5);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = RouterConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }
}
