// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP OAuth session management.
//!
//! Handles:
//! - Bearer header construction for upstream calls
//! - Token refresh when the access token has expired
//! - Collapsing concurrent refreshes into a single upstream request

use crate::config::{Config, ConfigError, DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL};
use crate::error::AuthError;
use crate::models::{Credentials, TokenRefreshResponse, TokenState};
use crate::time_utils::now_millis;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Outcome of the most recent refresh attempt.
#[derive(Default)]
struct RefreshSlot {
    /// Completed refresh attempts.
    attempts: u64,
    last_error: Option<AuthError>,
}

/// Owns the OAuth session and hands out request headers.
///
/// Starts unauthenticated. A session is installed with [`TokenManager::set_tokens`]
/// (e.g. from pre-obtained tokens in configuration) and is kept fresh by
/// [`TokenManager::get_headers`].
pub struct TokenManager {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    token_url: String,
    tokens: RwLock<TokenState>,
    /// Serializes refreshes; holders record their outcome for waiters.
    refresh: Mutex<RefreshSlot>,
    /// Mirror of `RefreshSlot::attempts`, readable without the lock.
    attempts: AtomicU64,
}

impl TokenManager {
    /// Create an unauthenticated manager talking to the production WHOOP API.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            tokens: RwLock::new(TokenState::default()),
            refresh: Mutex::new(RefreshSlot::default()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Build from configuration, seeding any pre-obtained tokens.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let credentials = Credentials::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
        )?;

        let mut manager =
            Self::new(credentials).with_urls(config.api_base_url.clone(), config.token_url.clone());

        if let Some(tokens) = config.initial_tokens() {
            tracing::info!(
                has_refresh_token = tokens.refresh_token.is_some(),
                expires_at = ?tokens.expires_at,
                "Seeding session from configuration"
            );
            manager = manager.with_tokens(tokens);
        }

        Ok(manager)
    }

    /// Override the API base URL and token endpoint.
    pub fn with_urls(mut self, base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    /// Start with an existing session.
    pub fn with_tokens(self, tokens: TokenState) -> Self {
        Self {
            tokens: RwLock::new(tokens),
            ..self
        }
    }

    /// Replace the current session.
    pub async fn set_tokens(&self, tokens: TokenState) {
        *self.tokens.write().await = tokens;
    }

    /// Snapshot of the current session.
    pub async fn tokens(&self) -> TokenState {
        self.tokens.read().await.clone()
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    /// HTTP client shared with data fetches.
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// Headers for an authenticated upstream request.
    ///
    /// Refreshes the session first if the access token has expired.
    pub async fn get_headers(&self) -> Result<HeaderMap, AuthError> {
        let access_token = self.valid_access_token().await?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| AuthError::InvalidToken)?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn valid_access_token(&self) -> Result<String, AuthError> {
        // Read before inspecting the session so that a refresh finishing
        // after this point is detected below.
        let observed = self.attempts.load(Ordering::Acquire);

        {
            let tokens = self.tokens.read().await;
            if !tokens.is_authenticated() {
                return Err(AuthError::NotAuthenticated);
            }
            if !tokens.is_expired(now_millis()) {
                return Ok(tokens.access_token.clone());
            }
        }

        let mut slot = self.refresh.lock().await;

        if slot.attempts != observed {
            // Someone else refreshed while we waited: share their outcome.
            if let Some(err) = &slot.last_error {
                return Err(err.clone());
            }
            return Ok(self.tokens.read().await.access_token.clone());
        }

        let result = self.refresh_tokens().await;

        slot.attempts += 1;
        slot.last_error = result.as_ref().err().cloned();
        self.attempts.store(slot.attempts, Ordering::Release);

        result
    }

    /// Exchange the refresh token for a new session.
    ///
    /// The session is only replaced once a complete token response has been
    /// parsed.
    async fn refresh_tokens(&self) -> Result<String, AuthError> {
        let refresh_token = self
            .tokens
            .read()
            .await
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::info!("Access token expired, refreshing");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Token refresh rejected");
            return Err(AuthError::RefreshFailed(status.to_string()));
        }

        let body: TokenRefreshResponse = response.json().await.map_err(|e| {
            AuthError::RefreshFailed(format!("invalid token response: {}", e))
        })?;

        let expires_at = body
            .expires_in
            .checked_mul(1000)
            .and_then(|ms| now_millis().checked_add(ms))
            .ok_or_else(|| {
                AuthError::RefreshFailed(format!(
                    "invalid token response: expires_in out of range ({})",
                    body.expires_in
                ))
            })?;

        *self.tokens.write().await = TokenState {
            access_token: body.access_token.clone(),
            refresh_token: body.refresh_token.or(Some(refresh_token)),
            expires_at: Some(expires_at),
        };

        tracing::info!(expires_at, "Token refreshed");
        Ok(body.access_token)
    }
}
