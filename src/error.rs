// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent protocol responses.

use crate::config::ConfigError;
use crate::mcp::protocol::JsonRpcError;

/// Session errors raised while producing request headers.
///
/// `Clone` so that one refresh outcome can be handed to every caller that
/// waited on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no refresh token")]
    NoRefreshToken,

    #[error("refresh failed: {0}")]
    RefreshFailed(String),

    #[error("access token is not a valid header value")]
    InvalidToken,
}

/// Application error type that converts to JSON-RPC errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Non-success status or unusable body from the WHOOP API.
    #[error("{0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// MCP error code for an unknown resource URI.
    pub const RESOURCE_NOT_FOUND: i32 = -32002;

    /// Whether the failure came from the session rather than the data fetch.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}

impl From<AppError> for JsonRpcError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::BadRequest(msg) => JsonRpcError::invalid_params(msg.clone()),
            AppError::NotFound(_) => {
                JsonRpcError::custom(AppError::RESOURCE_NOT_FOUND, err.to_string())
            }
            AppError::Config(_) | AppError::Auth(_) | AppError::Upstream(_) => {
                JsonRpcError::internal_error(err.to_string())
            }
            AppError::Internal(inner) => {
                tracing::error!(error = %inner, "Internal error");
                JsonRpcError::internal_error("internal error")
            }
        }
    }
}

/// Result type alias for capability handlers
pub type Result<T> = std::result::Result<T, AppError>;
