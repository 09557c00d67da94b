#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{AdviceError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_GATEWAY_ENDPOINT: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_GATEWAY_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<SecretString>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GATEWAY_ENDPOINT.to_string(),
            model: DEFAULT_GATEWAY_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Base URL of the backend hosting the `google-calendar` function.
    pub functions_url: Option<String>,
    pub access_token: Option<SecretString>,
    pub event_start_hour: u32,
    pub event_duration_minutes: i64,
    pub utc_offset_minutes: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            functions_url: None,
            access_token: None,
            event_start_hour: 9,
            event_duration_minutes: 60,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub calendar: CalendarConfig,
    pub server: ServerConfig,
    /// Include upstream failure detail in client-visible error bodies.
    pub expose_error_detail: bool,
}

// File representation; every field optional so a file only overrides what it names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    gateway: Option<FileGateway>,
    calendar: Option<FileCalendar>,
    server: Option<FileServer>,
    expose_error_detail: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileGateway {
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileCalendar {
    functions_url: Option<String>,
    access_token: Option<String>,
    event_start_hour: Option<u32>,
    event_duration_minutes: Option<i64>,
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServer {
    bind_address: Option<String>,
    port: Option<u16>,
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let mut config = match path {
            Some(path) => Self::from_file(path, &vars)?,
            None => Self::default(),
        };
        config.apply_env(&vars)?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, vars: &HashMap<String, String>) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, vars)
    }

    pub fn from_toml_str(content: &str, vars: &HashMap<String, String>) -> Result<Self> {
        let processed = substitute_env_vars(content, vars)?;
        let file: FileConfig = toml::from_str(&processed).map_err(|e| AdviceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;

        let mut config = Self::default();
        if let Some(gateway) = file.gateway {
            if let Some(endpoint) = gateway.endpoint {
                config.gateway.endpoint = endpoint;
            }
            if let Some(model) = gateway.model {
                config.gateway.model = model;
            }
            config.gateway.api_key = gateway.api_key.map(SecretString::from);
        }
        if let Some(calendar) = file.calendar {
            config.calendar.functions_url = calendar.functions_url;
            config.calendar.access_token = calendar.access_token.map(SecretString::from);
            if let Some(hour) = calendar.event_start_hour {
                config.calendar.event_start_hour = hour;
            }
            if let Some(minutes) = calendar.event_duration_minutes {
                config.calendar.event_duration_minutes = minutes;
            }
            if let Some(offset) = calendar.utc_offset_minutes {
                config.calendar.utc_offset_minutes = offset;
            }
        }
        if let Some(server) = file.server {
            if let Some(bind_address) = server.bind_address {
                config.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
        }
        if let Some(expose) = file.expose_error_detail {
            config.expose_error_detail = expose;
        }
        Ok(config)
    }

    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        let get = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();

        if let Some(key) = get(crate::core::gateway::API_KEY_VARIABLE) {
            self.gateway.api_key = Some(SecretString::from(key));
        }
        if let Some(endpoint) = get("AI_GATEWAY_URL") {
            self.gateway.endpoint = endpoint;
        }
        if let Some(model) = get("AI_GATEWAY_MODEL") {
            self.gateway.model = model;
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.calendar.functions_url = Some(url);
        }
        if let Some(token) = get("SUPABASE_ACCESS_TOKEN") {
            self.calendar.access_token = Some(SecretString::from(token));
        }
        if let Some(bind_address) = get("ADVICE_BIND_ADDRESS") {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = get("ADVICE_PORT") {
            self.server.port = port.parse().map_err(|_| AdviceError::InvalidConfigValue {
                field: "ADVICE_PORT".to_string(),
                value: port.clone(),
                reason: "must be a port number".to_string(),
            })?;
        }
        if let Some(expose) = get("ADVICE_EXPOSE_ERROR_DETAIL") {
            self.expose_error_detail = matches!(expose.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }
}

/// Replaces `${VAR_NAME}` with values from `vars`; unknown names are an error.
fn substitute_env_vars(content: &str, vars: &HashMap<String, String>) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| AdviceError::ConfigError {
        message: format!("Regex compilation error: {}", e),
    })?;

    let mut missing = Vec::new();
    let result = re
        .replace_all(content, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.clone(),
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        })
        .into_owned();

    if !missing.is_empty() {
        return Err(AdviceError::ConfigError {
            message: format!("Undefined environment variables: {}", missing.join(", ")),
        });
    }
    Ok(result)
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("gateway.endpoint", &self.gateway.endpoint)?;
        validate_non_empty_string("gateway.model", &self.gateway.model)?;

        if let Some(url) = &self.calendar.functions_url {
            validate_url("calendar.functions_url", url)?;
        }
        validate_range("calendar.event_start_hour", self.calendar.event_start_hour, 0, 23)?;
        validate_range(
            "calendar.event_duration_minutes",
            self.calendar.event_duration_minutes,
            1,
            1440,
        )?;
        validate_range(
            "calendar.utc_offset_minutes",
            self.calendar.utc_offset_minutes,
            -14 * 60,
            14 * 60,
        )?;

        validate_non_empty_string("server.bind_address", &self.server.bind_address)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
