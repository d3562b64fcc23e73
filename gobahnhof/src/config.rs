//! Configuration for the bridge
//!
//! Loaded once at startup from a TOML file. Every component receives the
//! section it needs at construction; nothing reads configuration afterwards.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//! path = "/codecFeedback"
//! public_url = "http://10.27.1.127:8080/codecFeedback"
//!
//! [device]
//! url = "https://10.27.2.151"
//! username = "integrator"
//! password = "..."
//!
//! [notification]
//! url = "https://informacast.example.net:8444"
//! message_id = 867
//! username = "api"
//! password = "..."
//! trust_root = "informacast-root.pem"
//!
//! [notification.recipient]
//! id = 19063007
//! type = "RECIPIENT_GROUP"
//!
//! [trigger]
//! widget_id = "humoctopus"
//! action_type = "pressed"
//! ```

use std::ffi::OsString;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use callback_server::{CallbackServer, DEFAULT_CALLBACK_PATH};
use codec_events::TriggerCondition;
use outbound_client::{BasicCredentials, FeedbackFormat, FeedbackRegistration, RecipientTarget, DEFAULT_EXPRESSION};
use serde::Deserialize;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "GOBAHNHOF_CONFIG";
/// Config file used when neither an argument nor the environment names one
pub const DEFAULT_CONFIG_PATH: &str = "gobahnhof.toml";
/// Overrides `device.password`
pub const DEVICE_PASSWORD_ENV: &str = "GOBAHNHOF_DEVICE_PASSWORD";
/// Overrides `notification.password`
pub const NOTIFICATION_PASSWORD_ENV: &str = "GOBAHNHOF_NOTIFICATION_PASSWORD";

/// Codecs register feedback in slots 1 through 4
const FEEDBACK_SLOTS: std::ops::RangeInclusive<u8> = 1..=4;
/// Codecs accept at most 15 expressions per slot
const MAX_EXPRESSIONS: usize = 15;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub notification: NotificationConfig,
    pub trigger: TriggerCondition,
}

/// Inbound callback listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub path: String,
    /// URL the codec should post to; derived from the listener when absent
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 8080),
            path: DEFAULT_CALLBACK_PATH.to_string(),
            public_url: None,
        }
    }
}

/// The codec that emits feedback
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Base URL of the codec, e.g. `https://10.27.2.151`
    pub url: String,
    #[serde(flatten)]
    pub credentials: BasicCredentials,
    /// Send the feedback registration at startup
    #[serde(default = "default_register")]
    pub register: bool,
    #[serde(default = "default_feedback_slot")]
    pub feedback_slot: u8,
    #[serde(default = "default_expressions")]
    pub expressions: Vec<String>,
}

impl DeviceConfig {
    pub fn registration(&self, server_url: impl Into<String>) -> FeedbackRegistration {
        FeedbackRegistration {
            slot: self.feedback_slot,
            format: FeedbackFormat::Json,
            server_url: server_url.into(),
            expressions: self.expressions.clone(),
        }
    }
}

/// The InformaCast service notifications go to
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Base URL, e.g. `https://informacast.example.net:8444`
    pub url: String,
    /// Message template to send
    pub message_id: u64,
    #[serde(flatten)]
    pub credentials: BasicCredentials,
    /// PEM root certificate; relative paths resolve against the config file
    pub trust_root: PathBuf,
    pub recipient: RecipientTarget,
}

fn default_register() -> bool {
    true
}

fn default_feedback_slot() -> u8 {
    1
}

fn default_expressions() -> Vec<String> {
    vec![DEFAULT_EXPRESSION.to_string()]
}

/// Pick the config file: first CLI argument, then `GOBAHNHOF_CONFIG`, then
/// `gobahnhof.toml`.
pub fn config_path(arg: Option<OsString>) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl Config {
    /// Read, resolve, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Resolve a relative `trust_root` against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.notification.trust_root.is_relative() {
            self.notification.trust_root = base.join(&self.notification.trust_root);
        }
    }

    /// Replace passwords with values from the environment when set
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(DEVICE_PASSWORD_ENV) {
            self.device.credentials.password = password;
        }
        if let Some(password) = lookup(NOTIFICATION_PASSWORD_ENV) {
            self.notification.credentials.password = password;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let segment = self.server.path.strip_prefix('/').unwrap_or(&self.server.path);
        if segment.is_empty() || segment.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "server.path {:?} must be a single path segment",
                self.server.path
            )));
        }

        if self.trigger.widget_id.is_empty() || self.trigger.action_type.is_empty() {
            return Err(ConfigError::Invalid(
                "trigger.widget_id and trigger.action_type must not be empty".to_string(),
            ));
        }

        if !FEEDBACK_SLOTS.contains(&self.device.feedback_slot) {
            return Err(ConfigError::Invalid(format!(
                "device.feedback_slot must be between {} and {}",
                FEEDBACK_SLOTS.start(),
                FEEDBACK_SLOTS.end()
            )));
        }

        if self.device.expressions.is_empty() || self.device.expressions.len() > MAX_EXPRESSIONS {
            return Err(ConfigError::Invalid(format!(
                "device.expressions must list between 1 and {MAX_EXPRESSIONS} expressions"
            )));
        }

        Ok(())
    }

    /// The URL to register with the codec.
    ///
    /// Uses `server.public_url` when set, otherwise the listen address, or
    /// the detected outbound interface address when listening on all
    /// interfaces. `None` if no address can be determined.
    pub fn callback_url(&self) -> Option<String> {
        if let Some(url) = &self.server.public_url {
            return Some(url.clone());
        }

        let listen = self.server.listen;
        let host = if listen.ip().is_unspecified() {
            CallbackServer::detect_local_ip()?
        } else {
            listen.ip()
        };

        Some(CallbackServer::format_callback_url(host, listen.port(), &self.server.path))
    }
}
