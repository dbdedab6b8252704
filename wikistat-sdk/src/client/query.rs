//! Query API client.

use reqwest::{Client, StatusCode};
use time::Date;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{
    ChannelLanguage, CollectorCounters, DailyStatsResponse, LanguageCode, RecentChangesResponse,
    SetChannelLanguage, format_date,
};

/// Typed HTTP client for the wikistat **query API**.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: Client,
    base_url: Url,
}

impl QueryClient {
    /// Create a new `QueryClient` for the server at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    ///
    /// Live fetches can take as long as the server's fetch timeout, so a
    /// custom client should not use a shorter request timeout.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/stats/{date}?language=` – counter for one day and language.
    ///
    /// Returns `Ok(None)` when nothing was ever recorded for the pair.
    pub async fn daily_stats(
        &self,
        date: Date,
        language: &LanguageCode,
    ) -> Result<Option<DailyStatsResponse>, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/stats/{}", format_date(date)))?;

        let resp = self
            .http
            .get(url)
            .query(&[("language", language.as_str())])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_response(resp).await.map(Some)
    }

    /// `GET /api/v1/recent?language=` – matching events from the live stream.
    pub async fn recent_changes(
        &self,
        language: &LanguageCode,
    ) -> Result<RecentChangesResponse, ClientError> {
        let url = self.base_url.join("/api/v1/recent")?;

        let resp = self
            .http
            .get(url)
            .query(&[("language", language.as_str())])
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/channels/{channel_id}/language` – a channel's language.
    pub async fn channel_language(&self, channel_id: &str) -> Result<ChannelLanguage, ClientError> {
        let url = self.channel_url(channel_id)?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `PUT /api/v1/channels/{channel_id}/language` – set a channel's language.
    pub async fn set_channel_language(
        &self,
        channel_id: &str,
        language: LanguageCode,
    ) -> Result<ChannelLanguage, ClientError> {
        let url = self.channel_url(channel_id)?;
        let resp = self
            .http
            .put(url)
            .json(&SetChannelLanguage { language })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/collector` – collector counters.
    pub async fn collector_counters(&self) -> Result<CollectorCounters, ClientError> {
        let url = self.base_url.join("/api/v1/collector")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    fn channel_url(&self, channel_id: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&format!(
            "/api/v1/channels/{}/language",
            urlencoding::encode(channel_id)
        ))?)
    }
}
