//! Batched collection purge.
//!
//! Each iteration fetches at most one page of handles, deletes the page in a
//! single atomic commit and only then fetches the next page, so pages never
//! overlap and at most one page is held in memory.

use super::DocumentStore;
use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Firestore rejects commits with more writes than this.
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurgeOptions {
    batch_size: usize,
    exhaustive: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PurgeOptions {
    /// Batches of 100, stop at the first short page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            exhaustive: false,
        }
    }

    /// Clamped to `1..=MAX_BATCH_SIZE`.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Keep fetching after a short page; only an empty page ends the purge.
    #[must_use]
    pub const fn with_exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub const fn exhaustive(&self) -> bool {
        self.exhaustive
    }
}

/// Delete every document of `collection`, returning how many were deleted.
///
/// `progress` receives the cumulative count after each committed batch.
///
/// # Errors
/// Returns the first fetch or commit failure. Batches committed before the
/// failure stay deleted and are reflected in the error context.
#[instrument(skip(store, progress))]
pub async fn purge_collection<S, F>(
    store: &S,
    collection: &str,
    options: PurgeOptions,
    mut progress: F,
) -> Result<u64>
where
    S: DocumentStore,
    F: FnMut(u64),
{
    let batch_size = options.batch_size();
    let mut deleted: u64 = 0;
    let mut has_more = true;

    while has_more {
        let page = store
            .fetch_page(collection, batch_size)
            .await
            .with_context(|| {
                format!("failed to fetch from {collection} after deleting {deleted} documents")
            })?;

        if page.is_empty() {
            break;
        }

        store.commit_deletes(&page).await.with_context(|| {
            format!(
                "failed to commit {} deletes in {collection} after deleting {deleted} documents",
                page.len()
            )
        })?;

        deleted += page.len() as u64;

        debug!("committed {} deletes, {} total", page.len(), deleted);

        progress(deleted);

        if page.len() < batch_size && !options.exhaustive() {
            has_more = false;
        }
    }

    info!("purged {} documents from {}", deleted, collection);

    Ok(deleted)
}
