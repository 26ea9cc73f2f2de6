use std::{fs, path::Path};

pub const CONFIG_FILE: &str = "animai.toml";
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8000/run";
const FALLBACK_DATABASE_URL: &str = "sqlite://./data/animai.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint_url: String,
    pub database_url: String,
    /// Program (plus leading args) that receives a video URL. `None` uses the OS opener.
    pub player_command: Option<String>,
    pub scrollback: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.into(),
            database_url: default_database_url(),
            player_command: None,
            scrollback: 20,
            log_filter: "warn".into(),
        }
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE));
    let raw = fs::read_to_string(path).ok();
    resolve_settings(raw.as_deref(), |name| std::env::var(name).ok())
}

/// Defaults, then the flat TOML file, then environment variables.
pub fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    let file_cfg = file_contents.and_then(|raw| toml::from_str::<toml::Table>(raw).ok());
    if let Some(file_cfg) = file_cfg {
        if let Some(v) = string_entry(&file_cfg, "endpoint_url") {
            settings.endpoint_url = v;
        }
        if let Some(v) = string_entry(&file_cfg, "database_url") {
            settings.database_url = v;
        }
        if let Some(v) = string_entry(&file_cfg, "player_command") {
            settings.player_command = Some(v);
        }
        if let Some(v) = string_entry(&file_cfg, "scrollback").and_then(|v| v.parse().ok()) {
            settings.scrollback = v;
        }
        if let Some(v) = string_entry(&file_cfg, "log_filter") {
            settings.log_filter = v;
        }
    }

    if let Some(v) = env("ANIMAI_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = env("APP__ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = env("ANIMAI_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("ANIMAI_PLAYER") {
        settings.player_command = Some(v);
    }
    if let Some(v) = env("APP__PLAYER_COMMAND") {
        settings.player_command = Some(v);
    }

    if let Some(v) = env("APP__SCROLLBACK").and_then(|v| v.parse().ok()) {
        settings.scrollback = v;
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.scrollback = settings.scrollback.max(1);
    settings
}

/// Accepts strings and integers so `scrollback = 40` and `scrollback = "40"` both work.
fn string_entry(table: &toml::Table, key: &str) -> Option<String> {
    match table.get(key)? {
        toml::Value::String(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
        toml::Value::Integer(v) => Some(v.to_string()),
        _ => None,
    }
}

fn default_database_url() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("animai").join("conversation.db"))
        .map(|path| sqlite_url_for_path(&path.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_DATABASE_URL.to_string())
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite://") {
        return sqlite_url_for_path(path);
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return sqlite_url_for_path(path);
    }

    if raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    sqlite_url_for_path(raw_database_url)
}

fn sqlite_url_for_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if has_windows_drive(&path) {
        format!("sqlite:{path}")
    } else {
        format!("sqlite://{path}")
    }
}

fn has_windows_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
