//! Readability parser API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{error, info};
use url::Url;

use super::ContentResolver;
use crate::error::ResolveError;
use crate::message::ParsedArticle;

/// Content resolver backed by the Readability parser endpoint.
///
/// Issues `GET {endpoint}?token={api_key}&url={page_url}` and decodes the JSON
/// response into a [`ParsedArticle`].
#[derive(Clone)]
pub struct ReadabilityClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ReadabilityClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn request_url(&self, page_url: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("token", self.api_key.as_str()), ("url", page_url)],
        )
    }
}

#[async_trait]
impl ContentResolver for ReadabilityClient {
    async fn resolve(&self, page_url: &str) -> Result<ParsedArticle, ResolveError> {
        info!(url = %page_url, "readability_fetch_starting");

        let request_url = self.request_url(page_url)?;

        let response = self.client.get(request_url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "[unavailable]".to_string());

            error!(
                url = %page_url,
                status_code = status.as_u16(),
                body = %body,
                "readability_non_200"
            );

            return Err(ResolveError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let article: ParsedArticle = serde_json::from_slice(&body)?;

        info!(
            url = %page_url,
            title = %article.title,
            content_length = article.content.len(),
            "readability_fetch_complete"
        );

        Ok(article)
    }
}
