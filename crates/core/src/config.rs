use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["tally.toml", "config/tally.toml"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Remote analysis service. An absent `webhook_url` means local-only
/// operation, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub remote_enabled: Option<bool>,
    pub remote_webhook_url: Option<String>,
    pub remote_timeout_secs: Option<u64>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig { enabled: true, webhook_url: None, timeout_secs: 15 },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl RemoteConfig {
    /// The endpoint to call, if the remote tier is switched on and configured.
    pub fn active_url(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.webhook_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("tally.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(remote) = patch.remote {
            if let Some(enabled) = remote.enabled {
                self.remote.enabled = enabled;
            }
            if let Some(webhook_url) = remote.webhook_url {
                self.remote.webhook_url = Some(webhook_url);
            }
            if let Some(timeout_secs) = remote.timeout_secs {
                self.remote.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TALLY_REMOTE_ENABLED") {
            self.remote.enabled = parse_bool("TALLY_REMOTE_ENABLED", &value)?;
        }
        let webhook_url =
            read_env("TALLY_REMOTE_WEBHOOK_URL").or_else(|| read_env("N8N_WEBHOOK_URL"));
        if let Some(value) = webhook_url {
            self.remote.webhook_url = Some(value);
        }
        if let Some(value) = read_env("TALLY_REMOTE_TIMEOUT_SECS") {
            self.remote.timeout_secs = parse_u64("TALLY_REMOTE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TALLY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("TALLY_SERVER_PORT") {
            self.server.port = parse_u16("TALLY_SERVER_PORT", &value)?;
        }

        let log_level = read_env("TALLY_LOGGING_LEVEL").or_else(|| read_env("TALLY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TALLY_LOGGING_FORMAT").or_else(|| read_env("TALLY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(enabled) = overrides.remote_enabled {
            self.remote.enabled = enabled;
        }
        if let Some(webhook_url) = overrides.remote_webhook_url {
            self.remote.webhook_url = Some(webhook_url);
        }
        if let Some(timeout_secs) = overrides.remote_timeout_secs {
            self.remote.timeout_secs = timeout_secs;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_remote(&self.remote)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_remote(remote: &RemoteConfig) -> Result<(), ConfigError> {
    if let Some(url) = remote.webhook_url.as_deref().map(str::trim) {
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "remote.webhook_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if remote.timeout_secs == 0 || remote.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "remote.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    remote: Option<RemotePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RemotePatch {
    enabled: Option<bool>,
    webhook_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const TALLY_VARS: &[&str] = &[
        "TALLY_REMOTE_ENABLED",
        "TALLY_REMOTE_WEBHOOK_URL",
        "TALLY_REMOTE_TIMEOUT_SECS",
        "TALLY_SERVER_BIND_ADDRESS",
        "TALLY_SERVER_PORT",
        "TALLY_LOGGING_LEVEL",
        "TALLY_LOG_LEVEL",
        "TALLY_LOGGING_FORMAT",
        "TALLY_LOG_FORMAT",
        "N8N_WEBHOOK_URL",
    ];

    fn env_lock() -> Result<MutexGuard<'static, ()>, String> {
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().map_err(|_| "env lock is poisoned".into())
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_run_local_only() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.remote.active_url().is_none(), "no endpoint should be configured")?;
        ensure(config.remote.timeout_secs == 15, "default timeout should be 15s")?;
        ensure(config.server.port == 8080, "default port should be 8080")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);
        env::set_var("TEST_TALLY_WEBHOOK", "https://hooks.example.com/analyze");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tally.toml");
            fs::write(
                &path,
                r#"
[remote]
webhook_url = "${TEST_TALLY_WEBHOOK}"
timeout_secs = 5
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.remote.active_url() == Some("https://hooks.example.com/analyze"),
                "webhook url should be interpolated from environment",
            )?;
            ensure(config.remote.timeout_secs == 5, "timeout should come from file")
        })();

        clear_vars(&["TEST_TALLY_WEBHOOK"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("tally.toml");
        fs::write(&path, "[remote]\nwebhook_url = \"${TALLY_TEST_UNSET_VAR}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(error, Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "TALLY_TEST_UNSET_VAR"),
            "unset interpolation variable should be named in the error",
        )
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);
        env::set_var("TALLY_REMOTE_WEBHOOK_URL", "https://from-env.example.com/hook");
        env::set_var("TALLY_SERVER_PORT", "9090");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("tally.toml");
            fs::write(
                &path,
                r#"
[remote]
webhook_url = "https://from-file.example.com/hook"

[server]
port = 7070

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.remote.webhook_url.as_deref() == Some("https://from-env.example.com/hook"),
                "env webhook url should win over file",
            )?;
            ensure(config.server.port == 9090, "env port should win over file")?;
            ensure(config.logging.level == "debug", "override log level should win")
        })();

        clear_vars(TALLY_VARS);
        result
    }

    #[test]
    fn legacy_webhook_alias_and_logging_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);
        env::set_var("N8N_WEBHOOK_URL", "http://localhost:5678/webhook/sales");
        env::set_var("TALLY_LOG_LEVEL", "warn");
        env::set_var("TALLY_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.remote.active_url() == Some("http://localhost:5678/webhook/sales"),
                "legacy webhook variable should configure the endpoint",
            )?;
            ensure(config.logging.level == "warn", "log level alias should apply")?;
            ensure(matches!(config.logging.format, LogFormat::Json), "log format alias should apply")
        })();

        clear_vars(TALLY_VARS);
        result
    }

    #[test]
    fn disabled_remote_hides_configured_url() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);

        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                remote_enabled: Some(false),
                remote_webhook_url: Some("https://hooks.example.com".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.remote.active_url().is_none(), "disabled remote should report no url")
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);

        let bad_url = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                remote_webhook_url: Some("ftp://hooks.example.com".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        ensure(
            matches!(bad_url, Err(ConfigError::Validation(ref message)) if message.contains("remote.webhook_url")),
            "validation failure should mention remote.webhook_url",
        )?;

        let bad_timeout = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                remote_timeout_secs: Some(0),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        ensure(
            matches!(bad_timeout, Err(ConfigError::Validation(ref message)) if message.contains("remote.timeout_secs")),
            "validation failure should mention remote.timeout_secs",
        )
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock()?;
        clear_vars(TALLY_VARS);
        env::set_var("TALLY_SERVER_PORT", "not-a-port");

        let result = AppConfig::load(LoadOptions::default());
        clear_vars(TALLY_VARS);

        ensure(
            matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "TALLY_SERVER_PORT"),
            "invalid port should be reported as an env override error",
        )
    }

    #[test]
    fn require_file_fails_when_missing() -> Result<(), String> {
        let _guard = env_lock()?;
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
