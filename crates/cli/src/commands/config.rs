use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tally_core::config::{AppConfig, CONFIG_FILE_CANDIDATES};
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "remote.enabled",
            env_keys: &["TALLY_REMOTE_ENABLED"],
            value: config.remote.enabled.to_string(),
        },
        Field {
            key_path: "remote.webhook_url",
            env_keys: &["TALLY_REMOTE_WEBHOOK_URL", "N8N_WEBHOOK_URL"],
            value: config
                .remote
                .webhook_url
                .as_deref()
                .map(redact_url)
                .unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key_path: "remote.timeout_secs",
            env_keys: &["TALLY_REMOTE_TIMEOUT_SECS"],
            value: config.remote.timeout_secs.to_string(),
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["TALLY_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["TALLY_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["TALLY_LOGGING_LEVEL", "TALLY_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["TALLY_LOGGING_FORMAT", "TALLY_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Webhook paths often embed a secret id; only the origin is shown.
fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return "<redacted>".to_string();
    };
    match rest.split_once('/') {
        Some((host, path)) if !path.is_empty() => format!("{scheme}://{host}/***"),
        _ => format!("{scheme}://{rest}"),
    }
}
