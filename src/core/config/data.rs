use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::model_selection::{builtin_models, ModelOption};

/// Environment variable consulted for the backend base URL.
pub const BASE_URL_ENV: &str = "CHATDESK_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL; the chat endpoint is `{base_url}/api/chat`
    pub base_url: Option<String>,
    /// Model used when no selection has been persisted yet
    pub default_model: Option<String>,
    /// Enable syntax highlighting for fenced code blocks
    pub syntax: Option<bool>,
    /// Color theme for the chat screen: dark, light, or mono
    pub theme: Option<String>,
    /// Replaces the built-in model list when non-empty
    #[serde(default)]
    pub models: Vec<ModelOption>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/chatdesk/config.toml` → `~/.config/chatdesk/config.toml`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\chatdesk` → unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Resolve the base URL: explicit flag, then environment, then config file.
    pub fn resolve_base_url(&self, flag: Option<&str>, env_value: Option<String>) -> String {
        flag.map(str::to_string)
            .or(env_value)
            .or_else(|| self.base_url.clone())
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn model_catalog(&self) -> Vec<ModelOption> {
        if self.models.is_empty() {
            builtin_models()
        } else {
            self.models.clone()
        }
    }

    pub fn default_model(&self) -> String {
        self.default_model
            .clone()
            .or_else(|| self.model_catalog().first().map(|m| m.value.clone()))
            .unwrap_or_default()
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }
}

pub const THEME_NAMES: &[&str] = &["dark", "light", "mono"];

/// Keys accepted by `chatdesk set` and `chatdesk unset`.
pub const SETTABLE_KEYS: &[&str] = &["base-url", "default-model", "syntax", "theme"];

impl Config {
    /// Apply `chatdesk set <key> <value>`. Returns the confirmation text.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<String, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "base-url" => {
                self.base_url = Some(value.to_string());
                Ok(format!("Set base-url to: {value}"))
            }
            "default-model" => {
                if !self.model_catalog().iter().any(|m| m.value == value) {
                    return Err(format!("Unknown model: {value}"));
                }
                self.default_model = Some(value.to_string());
                Ok(format!("Set default-model to: {value}"))
            }
            "syntax" => {
                let enabled = parse_toggle(value)
                    .ok_or_else(|| format!("Expected on or off for syntax, got: {value}"))?;
                self.syntax = Some(enabled);
                Ok(format!("Set syntax to: {}", if enabled { "on" } else { "off" }))
            }
            "theme" => {
                let name = value.to_ascii_lowercase();
                if !THEME_NAMES.contains(&name.as_str()) {
                    return Err(format!(
                        "Unknown theme: {value} (expected one of: {})",
                        THEME_NAMES.join(", ")
                    ));
                }
                self.theme = Some(name.clone());
                Ok(format!("Set theme to: {name}"))
            }
            _ => Err(unknown_key(key)),
        }
    }

    /// Apply `chatdesk unset <key>`.
    pub fn unset_value(&mut self, key: &str) -> Result<String, String> {
        match key {
            "base-url" => self.base_url = None,
            "default-model" => self.default_model = None,
            "syntax" => self.syntax = None,
            "theme" => self.theme = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(format!("Unset {key}"))
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of: {})",
        SETTABLE_KEYS.join(", ")
    )
}
