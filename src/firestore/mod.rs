pub mod client;
pub mod purge;

#[cfg(test)]
pub(crate) mod testing;

pub use self::client::FirestoreClient;
pub use self::purge::{purge_collection, PurgeOptions};

use anyhow::Result;

pub const DEFAULT_DATABASE: &str = "(default)";

/// Opaque handle to one document: its full resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef(String);

impl DocumentRef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The three document-store calls the purge needs.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Number of documents currently in `collection`.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Up to `limit` handles from `collection`, in backend order.
    async fn fetch_page(&self, collection: &str, limit: usize) -> Result<Vec<DocumentRef>>;

    /// Delete every handle in one atomic commit.
    async fn commit_deletes(&self, documents: &[DocumentRef]) -> Result<()>;
}
