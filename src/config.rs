// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use crate::models::TokenState;
use std::env;

/// Default WHOOP developer API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.prod.whoop.com/developer";

/// Default WHOOP OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.prod.whoop.com/oauth/oauth2/token";

/// Default OAuth redirect URI.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// WHOOP OAuth client ID
    pub client_id: String,
    /// WHOOP OAuth client secret
    pub client_secret: String,
    /// OAuth redirect URI (registered with WHOOP, not used by any flow yet)
    pub redirect_uri: String,
    /// Upstream API base URL
    pub api_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,

    // --- Pre-obtained session (optional) ---
    /// Access token to seed the session with
    pub access_token: Option<String>,
    /// Refresh token to seed the session with
    pub refresh_token: Option<String>,
    /// Access token expiry (epoch millis)
    pub token_expires_at: Option<i64>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let token_expires_at = match optional_var("WHOOP_TOKEN_EXPIRES_AT") {
            Some(raw) => Some(raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                var: "WHOOP_TOKEN_EXPIRES_AT",
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            client_id: required_var("WHOOP_CLIENT_ID")?,
            client_secret: required_var("WHOOP_CLIENT_SECRET")?,
            redirect_uri: optional_var("WHOOP_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            api_base_url: optional_var("WHOOP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            token_url: optional_var("WHOOP_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            access_token: optional_var("WHOOP_ACCESS_TOKEN"),
            refresh_token: optional_var("WHOOP_REFRESH_TOKEN"),
            token_expires_at,
        })
    }

    /// Session seeded from configuration, if an access token was supplied.
    pub fn initial_tokens(&self) -> Option<TokenState> {
        self.access_token.as_ref().map(|access_token| TokenState {
            access_token: access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.token_expires_at,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::Missing(name))
}

/// Read a variable, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment is process-global, so every env-dependent assertion lives
    // in this one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("WHOOP_CLIENT_ID", "test_id");
        env::set_var("WHOOP_CLIENT_SECRET", " test_secret ");
        env::remove_var("WHOOP_REDIRECT_URI");
        env::remove_var("WHOOP_API_BASE_URL");
        env::set_var("WHOOP_ACCESS_TOKEN", "seeded");
        env::set_var("WHOOP_TOKEN_EXPIRES_AT", "1700000000000");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.client_id, "test_id");
        assert_eq!(config.client_secret, "test_secret");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);

        let tokens = config.initial_tokens().expect("tokens should be seeded");
        assert_eq!(tokens.access_token, "seeded");
        assert_eq!(tokens.expires_at, Some(1_700_000_000_000));

        env::set_var("WHOOP_TOKEN_EXPIRES_AT", "tomorrow");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "WHOOP_TOKEN_EXPIRES_AT",
                ..
            })
        ));
        env::remove_var("WHOOP_TOKEN_EXPIRES_AT");

        env::set_var("WHOOP_CLIENT_SECRET", "   ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("WHOOP_CLIENT_SECRET"))
        ));

        env::remove_var("WHOOP_CLIENT_ID");
        env::remove_var("WHOOP_CLIENT_SECRET");
        env::remove_var("WHOOP_ACCESS_TOKEN");
    }

    #[test]
    fn test_no_seeded_session_by_default() {
        assert!(Config::default().initial_tokens().is_none());
    }
}
