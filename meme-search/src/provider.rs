//! Trait definition for pluggable meme providers.
//!
//! Each provider (a JSON API or any other image source) implements
//! [`Provider`] so the aggregator can fan a query out to all of them
//! uniformly.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::types::{Meme, ProviderDescriptor, SearchOptions};

/// A pluggable meme source.
///
/// Implementors handle their own URL construction, HTTP request and
/// response decoding, and must:
///
/// - be `Send + Sync` and callable concurrently with themselves
/// - abandon outbound work once `cancel` fires
/// - apply `options.limit` to their own result list
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, used as the registry key and as [`Meme::platform`].
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// One-line description of the source.
    fn description(&self) -> &str;

    /// Whether the provider needs credentials (e.g. a cookie) to work.
    fn requires_auth(&self) -> bool {
        false
    }

    /// Search for memes matching `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the response cannot be
    /// decoded, or `cancel` fires before the call completes.
    async fn search(
        &self,
        keyword: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Meme>, SearchError>;

    /// Snapshot of this provider's static metadata.
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            requires_auth: self.requires_auth(),
        }
    }
}
