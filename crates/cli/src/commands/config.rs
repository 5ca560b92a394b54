use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use mater_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// Key path, environment variables in precedence order.
const FIELDS: &[(&str, &[&str])] = &[
    ("llm.endpoint", &["MATER_LLM_ENDPOINT"]),
    ("llm.api_key", &["MATER_LLM_API_KEY"]),
    ("llm.model", &["MATER_LLM_MODEL"]),
    ("llm.connect_timeout_secs", &["MATER_LLM_CONNECT_TIMEOUT_SECS"]),
    ("catalog.path", &["MATER_CATALOG_PATH"]),
    ("catalog.baseline_material", &["MATER_CATALOG_BASELINE_MATERIAL"]),
    ("catalog.transport_weight_kg", &["MATER_CATALOG_TRANSPORT_WEIGHT_KG"]),
    ("server.bind_address", &["MATER_SERVER_BIND_ADDRESS"]),
    ("server.port", &["MATER_SERVER_PORT"]),
    ("server.graceful_shutdown_secs", &["MATER_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ("logging.level", &["MATER_LOGGING_LEVEL", "MATER_LOG_LEVEL"]),
    ("logging.format", &["MATER_LOGGING_FORMAT", "MATER_LOG_FORMAT"]),
];

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_keys) in FIELDS {
        lines.push(render_line(
            key_path,
            &display_value(&config, key_path),
            field_source(
                key_path,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }
    lines.join("\n")
}

fn display_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "llm.endpoint" => config.llm.endpoint.clone(),
        "llm.api_key" => match &config.llm.api_key {
            Some(key) => redact_token(key.expose_secret()),
            None => "<unset>".to_string(),
        },
        "llm.model" => config.llm.model.clone(),
        "llm.connect_timeout_secs" => config.llm.connect_timeout_secs.to_string(),
        "catalog.path" => config
            .catalog
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<bundled>".to_string()),
        "catalog.baseline_material" => config.catalog.baseline_material.clone(),
        "catalog.transport_weight_kg" => config.catalog.transport_weight_kg.to_string(),
        "server.bind_address" => config.server.bind_address.clone(),
        "server.port" => config.server.port.to_string(),
        "server.graceful_shutdown_secs" => config.server.graceful_shutdown_secs.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("mater.toml"), PathBuf::from("config/mater.toml")]
        .into_iter()
        .find(|path| path.exists())
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

/// Keeps a recognisable prefix such as `sk-` and hides the rest.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
