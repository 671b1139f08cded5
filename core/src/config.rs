//! Client configuration.
//!
//! Built in code with `ClientConfig::new` or read from the environment with
//! `ClientConfig::from_env`:
//!
//! | Variable                | Default               |
//! |-------------------------|-----------------------|
//! | `LINEBOT_CHANNEL_TOKEN` | required              |
//! | `LINEBOT_ENDPOINT_BASE` | `https://api.line.me` |

use std::fmt;

use crate::error::Error;

pub const DEFAULT_ENDPOINT_BASE: &str = "https://api.line.me";
pub const ENV_CHANNEL_TOKEN: &str = "LINEBOT_CHANNEL_TOKEN";
pub const ENV_ENDPOINT_BASE: &str = "LINEBOT_ENDPOINT_BASE";

const DEFAULT_USER_AGENT: &str = concat!("linebot-rust/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ClientConfig {
    pub channel_token: String,
    /// Scheme and host, without a trailing slash.
    pub endpoint_base: String,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(channel_token: impl Into<String>) -> Self {
        Self {
            channel_token: channel_token.into(),
            endpoint_base: DEFAULT_ENDPOINT_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        let channel_token =
            std::env::var(ENV_CHANNEL_TOKEN).map_err(|_| Error::Config(format!("{ENV_CHANNEL_TOKEN} is not set")))?;
        let endpoint_base = std::env::var(ENV_ENDPOINT_BASE).unwrap_or_else(|_| DEFAULT_ENDPOINT_BASE.to_string());
        let config = Self::new(channel_token).endpoint_base(&endpoint_base);
        config.validate()?;
        Ok(config)
    }

    pub fn endpoint_base(mut self, endpoint_base: &str) -> Self {
        self.endpoint_base = endpoint_base.trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.channel_token.is_empty() {
            return Err(Error::Config("missing channel access token".to_string()));
        }
        if self.endpoint_base.is_empty() {
            return Err(Error::Config("missing endpoint base".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("channel_token", &"<redacted>")
            .field("endpoint_base", &self.endpoint_base)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_api() {
        let config = ClientConfig::new("token");
        assert_eq!(config.endpoint_base, DEFAULT_ENDPOINT_BASE);
        assert!(config.user_agent.starts_with("linebot-rust/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("token").endpoint_base("http://localhost:3000/");
        assert_eq!(config.endpoint_base, "http://localhost:3000");
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = ClientConfig::new("").validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_hides_the_token() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
