use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use assurini_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let entries: &[(&str, String, Option<&str>)] = &[
        ("store.url", config.store.url.clone(), Some("ASSURINI_STORE_URL")),
        ("store.max_connections", config.store.max_connections.to_string(), None),
        ("store.timeout_secs", config.store.timeout_secs.to_string(), None),
        ("llm.base_url", config.llm.base_url.clone(), Some("ASSURINI_LLM_BASE_URL")),
        ("llm.model", config.llm.model.clone(), Some("ASSURINI_LLM_MODEL")),
        ("llm.api_key", api_key.to_string(), Some("ASSURINI_LLM_API_KEY")),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), None),
        ("logging.level", config.logging.level.clone(), Some("ASSURINI_LOG_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("ASSURINI_LOG_FORMAT")),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        let source = field_source(
            key,
            *env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {key} = {value} (source: {source})"));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("assurini.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/assurini.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
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
