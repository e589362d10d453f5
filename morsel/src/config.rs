//! Service configuration.
//!
//! Values are merged from built-in defaults, an optional `morsel.toml`, and
//! the environment, later sources winning. Vendor credentials use their
//! conventional variable names (`OPENAI_API_KEY`, `BRAVE_API_KEY`, ...) and
//! service settings use the `MORSEL_` prefix, with `__` separating nested
//! keys (`MORSEL_OPENAI__PRIORITY`). Blank values count as unset.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Uncased;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "morsel.toml";

/// Upper bound for both per-call timeouts.
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Conventional variable names and the config paths they fill.
const VENDOR_ENV: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
    ("OPENAI_BASE_URL", "openai.base_url"),
    ("PERPLEXITY_API_KEY", "perplexity.api_key"),
    ("PERPLEXITY_MODEL", "perplexity.model"),
    ("REDDIT_CLIENT_ID", "reddit.client_id"),
    ("REDDIT_CLIENT_SECRET", "reddit.client_secret"),
    ("REDDIT_USER_AGENT", "reddit.user_agent"),
    ("BRAVE_API_KEY", "brave.api_key"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Load,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Load, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::load(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    /// Lower values are attempted first.
    pub priority: u32,
    pub base_url: Option<String>,
}

impl ProviderSettings {
    fn with_model(model: &str, priority: u32) -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: model.to_string(),
            priority,
            base_url: None,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::with_model("", u32::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    /// Searched when a request names none; empty keeps the client defaults.
    pub subreddits: Vec<String>,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: concat!("morsel/", env!("CARGO_PKG_VERSION")).to_string(),
            subreddits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BraveSettings {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorselConfig {
    pub bind: String,
    pub chat_path: String,
    pub provider_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub openai: ProviderSettings,
    pub perplexity: ProviderSettings,
    pub reddit: RedditSettings,
    pub brave: BraveSettings,
}

impl Default for MorselConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            chat_path: "/api/chat".to_string(),
            provider_timeout_secs: 30,
            tool_timeout_secs: 15,
            openai: ProviderSettings::with_model("gpt-4o-mini", 1),
            perplexity: ProviderSettings::with_model("sonar", 2),
            reddit: RedditSettings::default(),
            brave: BraveSettings::default(),
        }
    }
}

impl MorselConfig {
    /// Loads from `morsel.toml` in the working directory and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Some(Path::new(DEFAULT_CONFIG_FILE))))
    }

    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = file
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed("MORSEL_").split("__"))
            .merge(Env::raw().filter_map(|key| {
                VENDOR_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map(|(_, path)| Uncased::from(*path))
            }))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.normalized().validated()
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Reddit credentials, present only when both halves are set.
    pub fn reddit_credentials(&self) -> Option<(&str, &str)> {
        match (&self.reddit.client_id, &self.reddit.client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    fn normalized(mut self) -> Self {
        for settings in [&mut self.openai, &mut self.perplexity] {
            settings.api_key = non_blank(settings.api_key.take());
            settings.base_url = non_blank(settings.base_url.take());
        }
        self.reddit.client_id = non_blank(self.reddit.client_id.take());
        self.reddit.client_secret = non_blank(self.reddit.client_secret.take());
        self.brave.api_key = non_blank(self.brave.api_key.take());
        self.reddit.subreddits.retain(|name| !name.trim().is_empty());
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("provider_timeout_secs", self.provider_timeout_secs),
            ("tool_timeout_secs", self.tool_timeout_secs),
        ] {
            if value == 0 || value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::invalid(format!(
                    "{name} must be between 1 and {MAX_TIMEOUT_SECS}, got {value}"
                )));
            }
        }
        if !self.chat_path.starts_with('/') {
            return Err(ConfigError::invalid(format!(
                "chat_path '{}' must start with '/'",
                self.chat_path
            )));
        }
        if self.reddit.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("reddit.user_agent must not be empty"));
        }

        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
