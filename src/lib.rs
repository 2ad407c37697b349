// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP MCP provider
//!
//! Exposes the WHOOP developer API as MCP resources and tools. Upstream
//! calls are authorized by a [`services::TokenManager`] that refreshes the
//! OAuth session when it expires.

pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod services;
pub mod time_utils;

use config::{Config, ConfigError};
use mcp::{EndpointRegistry, McpServer};
use services::{TokenManager, WhoopClient};
use std::sync::Arc;

/// Wire up the session, client, registry and server from configuration.
pub fn build_server(config: &Config) -> Result<McpServer, ConfigError> {
    let auth = Arc::new(TokenManager::from_config(config)?);
    let client = WhoopClient::new(auth);
    Ok(McpServer::new(EndpointRegistry::new(client)))
}
