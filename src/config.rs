use std::str::FromStr;
use std::time::Duration;

use envconfig::Envconfig;
use thiserror::Error;

use crate::i18n;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envconfig::Error),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("unknown role `{0}`, expected `admin` or `staff`")]
    UnknownRole(String),
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(ConfigError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "PHARMADESK_API_BASE_URL", default = "http://localhost:5000")]
    pub api_base_url: String,

    #[envconfig(
        from = "PHARMADESK_CHATBOT_BASE_URL",
        default = "http://localhost:5001/api/chatbot"
    )]
    pub chatbot_base_url: String,

    #[envconfig(from = "PHARMADESK_AUTH_ENTRY", default = "auth-admin.html")]
    pub auth_entry: String,

    #[envconfig(from = "PHARMADESK_LANGUAGE", default = "en")]
    pub language: String,

    #[envconfig(from = "PHARMADESK_TOAST_MS", default = "3000")]
    pub toast_ms: u64,

    #[envconfig(from = "PHARMADESK_ROLE", default = "admin")]
    pub role: String,
}

impl Config {
    /// Reads the environment and checks the values before anything uses
    /// them.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::init_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Empty("PHARMADESK_API_BASE_URL"));
        }
        if self.chatbot_base_url.trim().is_empty() {
            return Err(ConfigError::Empty("PHARMADESK_CHATBOT_BASE_URL"));
        }
        if !i18n::is_supported(&self.language) {
            return Err(ConfigError::UnsupportedLanguage(self.language.clone()));
        }
        self.role()?;
        Ok(())
    }

    pub fn role(&self) -> Result<Role, ConfigError> {
        self.role.parse()
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}
