//! Content resolution: turning a shared link into article text.

pub mod readability;

use async_trait::async_trait;

use crate::error::ResolveError;
use crate::message::ParsedArticle;

pub use readability::ReadabilityClient;

/// Fetches a page and extracts its article content.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(&self, page_url: &str) -> Result<ParsedArticle, ResolveError>;
}
