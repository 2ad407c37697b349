// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use whoop_mcp::mcp::{EndpointRegistry, McpServer};
use whoop_mcp::models::{Credentials, TokenState};
use whoop_mcp::services::{TokenManager, WhoopClient};
use whoop_mcp::time_utils::now_millis;
use wiremock::MockServer;

/// Path of the token endpoint on the mock server.
#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/oauth/oauth2/token";

/// Session that never expires.
#[allow(dead_code)]
pub fn valid_tokens() -> TokenState {
    TokenState {
        access_token: "valid_access_token".to_string(),
        refresh_token: Some("valid_refresh_token".to_string()),
        expires_at: None,
    }
}

/// Session whose access token expired a minute ago.
#[allow(dead_code)]
pub fn expired_tokens() -> TokenState {
    TokenState {
        access_token: "stale_access_token".to_string(),
        refresh_token: Some("valid_refresh_token".to_string()),
        expires_at: Some(now_millis() - 60_000),
    }
}

/// Token manager pointed at the mock server for both API and token calls.
#[allow(dead_code)]
pub fn test_token_manager(server: &MockServer, tokens: Option<TokenState>) -> TokenManager {
    let credentials = Credentials::new("test_client_id", "test_secret", "http://localhost/cb")
        .expect("test credentials are valid");
    let manager = TokenManager::new(credentials)
        .with_urls(server.uri(), format!("{}{}", server.uri(), TOKEN_PATH));
    match tokens {
        Some(tokens) => manager.with_tokens(tokens),
        None => manager,
    }
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer, tokens: Option<TokenState>) -> WhoopClient {
    WhoopClient::new(Arc::new(test_token_manager(server, tokens)))
}

#[allow(dead_code)]
pub fn test_registry(server: &MockServer, tokens: Option<TokenState>) -> EndpointRegistry {
    EndpointRegistry::new(test_client(server, tokens))
}

#[allow(dead_code)]
pub fn test_mcp_server(server: &MockServer, tokens: Option<TokenState>) -> McpServer {
    McpServer::new(test_registry(server, tokens))
}
