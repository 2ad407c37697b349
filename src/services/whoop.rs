// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP API client for fetching user data.
//!
//! Responses are passed through as raw JSON. The only place two upstream
//! payloads are combined is [`WhoopClient::fetch_personal_info`].

use crate::error::{AppError, Result};
use crate::models::{BasicProfile, BodyMeasurement, DateRange, Endpoint, PersonalInfo};
use crate::services::auth::TokenManager;
use futures_util::future::try_join;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;

const PERSONAL_INFO_ERROR: &str = "failed to fetch personal info";

/// WHOOP API client. Every request is authorized through the shared
/// [`TokenManager`].
#[derive(Clone)]
pub struct WhoopClient {
    http: reqwest::Client,
    auth: Arc<TokenManager>,
}

impl WhoopClient {
    pub fn new(auth: Arc<TokenManager>) -> Self {
        Self {
            http: auth.http_client(),
            auth,
        }
    }

    /// GET `path` with the given query parameters, returning the JSON body.
    pub async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let headers = self.auth.get_headers().await?;
        self.get_json(headers, path, query).await
    }

    /// Fetch a described endpoint, optionally restricted to a date range.
    pub async fn fetch_endpoint(
        &self,
        endpoint: Endpoint,
        range: Option<&DateRange>,
    ) -> Result<Value> {
        match range {
            Some(range) => self.fetch(endpoint.path(), &range.query()).await,
            None => self.fetch(endpoint.path(), &[]).await,
        }
    }

    /// Fetch profile and body measurements concurrently and merge them.
    ///
    /// Fails as a whole if either request fails.
    pub async fn fetch_personal_info(&self) -> Result<PersonalInfo> {
        let headers = self.auth.get_headers().await?;

        let (profile, body) = try_join(
            self.get_json(headers.clone(), Endpoint::Profile.path(), &[]),
            self.get_json(headers, Endpoint::BodyMeasurement.path(), &[]),
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Personal info fetch failed");
            AppError::Upstream(PERSONAL_INFO_ERROR.to_string())
        })?;

        let profile: BasicProfile = serde_json::from_value(profile).map_err(|e| {
            tracing::warn!(error = %e, "Unexpected profile payload");
            AppError::Upstream(PERSONAL_INFO_ERROR.to_string())
        })?;
        let body: BodyMeasurement = serde_json::from_value(body).map_err(|e| {
            tracing::warn!(error = %e, "Unexpected body measurement payload");
            AppError::Upstream(PERSONAL_INFO_ERROR.to_string())
        })?;

        Ok(PersonalInfo::combine(profile, body))
    }

    /// Generic GET request with JSON response.
    async fn get_json(
        &self,
        headers: HeaderMap,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        let url = build_url(self.auth.get_base_url(), path, query);
        tracing::debug!(path, params = ?query, "Fetching WHOOP data");

        let response = self
            .http
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to fetch {}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = %status, "WHOOP request failed");
            let reason = status.canonical_reason().unwrap_or(status.as_str());
            return Err(AppError::Upstream(format!(
                "failed to fetch {}: {}",
                path, reason
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to fetch {}: {}", path, e)))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(path, error = %e, "WHOOP returned invalid JSON");
            AppError::Upstream(format!("invalid JSON from {}", path))
        })
    }
}

/// `base_url + path`, with query parameters URL-encoded in the order given.
pub fn build_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = format!("{}{}", base_url, path);

    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_without_query() {
        assert_eq!(
            build_url("https://api.example.com/developer", "/v1/cycle", &[]),
            "https://api.example.com/developer/v1/cycle"
        );
    }

    #[test]
    fn test_build_url_keeps_order_and_encodes() {
        let url = build_url(
            "http://localhost",
            "/v1/cycle",
            &[("start", "2024-03-14T00:00:00.000Z"), ("end", "a b&c")],
        );
        assert_eq!(
            url,
            "http://localhost/v1/cycle?start=2024-03-14T00%3A00%3A00.000Z&end=a%20b%26c"
        );
    }
}
