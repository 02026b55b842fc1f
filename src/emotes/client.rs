//! Fetcher for the 7TV global emote set over the `HttpClient` seam.

use async_trait::async_trait;
use tracing::debug;

use super::GlobalEmoteSet;
use crate::auth::AuthSnapshot;
use crate::error::ApiError;
use crate::provider::{AuthContext, Fetcher};
use crate::traits::{Headers, HttpClient};

/// Public 7TV v3 API.
pub const DEFAULT_API_URL: &str = "https://7tv.io/v3";

/// Client for the 7TV emote API.
#[derive(Debug, Clone)]
pub struct EmoteClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> EmoteClient<C> {
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_API_URL)
    }

    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn global_emotes_url(&self) -> String {
        format!("{}/emote-sets/global", self.base_url)
    }

    /// Fetch the global emote set.
    ///
    /// The bearer token from `auth` is attached when there is one; the
    /// endpoint itself is public.
    pub async fn global_emotes(&self, auth: &AuthSnapshot) -> Result<GlobalEmoteSet, ApiError> {
        let url = self.global_emotes_url();
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(token) = &auth.current_token {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", token.as_str()),
            );
        }

        debug!(url = %url, authorized = auth.is_authorized, "Fetching global emotes");
        let response = self.http.get(&url, &headers).await?;

        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.text_lossy()));
        }

        let set: GlobalEmoteSet = response.json()?;
        debug!(count = set.len(), "Fetched global emotes");
        Ok(set)
    }
}

#[async_trait]
impl<C: HttpClient> Fetcher<GlobalEmoteSet, ApiError> for EmoteClient<C> {
    async fn fetch(&self, auth: AuthContext) -> Result<GlobalEmoteSet, ApiError> {
        self.global_emotes(&auth).await
    }
}
