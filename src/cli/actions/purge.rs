use crate::cli::globals::GlobalArgs;
use crate::firestore::{purge_collection, DocumentStore, FirestoreClient, PurgeOptions};
use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub firestore_url: String,
    pub database: String,
    pub collection: String,
    pub options: PurgeOptions,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The collection had no documents; nothing was committed.
    Empty,
    DryRun { found: u64 },
    Purged {
        found: u64,
        deleted: u64,
    },
}

/// Count, then purge unless the collection is already empty.
///
/// # Errors
/// Returns the first count, fetch or commit failure.
pub async fn run<S: DocumentStore>(
    store: &S,
    collection: &str,
    options: PurgeOptions,
    dry_run: bool,
) -> Result<Outcome> {
    let found = store.count(collection).await?;

    println!("Found {found} documents in {collection}");

    if found == 0 {
        println!("Nothing to delete");

        return Ok(Outcome::Empty);
    }

    if dry_run {
        println!("Dry run, no documents deleted");

        return Ok(Outcome::DryRun { found });
    }

    info!(
        batch_size = options.batch_size(),
        exhaustive = options.exhaustive(),
        "purging {}",
        collection
    );

    let deleted = purge_collection(store, collection, options, |deleted| {
        println!("Deleted {deleted} documents so far");
    })
    .await?;

    println!("Done, deleted {deleted} documents from {collection}");

    Ok(Outcome::Purged { found, deleted })
}

/// Handle the purge action
///
/// # Errors
/// Returns an error if credentials cannot be loaded or any backend call fails.
pub async fn handle(args: Args) -> Result<()> {
    let auth = args.globals.connect().await?;
    let store = FirestoreClient::new(&auth, &args.firestore_url, &args.database);

    run(&store, &args.collection, args.options, args.dry_run).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::testing::MemoryStore;

    #[tokio::test]
    async fn empty_collection_skips_purge() -> Result<()> {
        let store = MemoryStore::with_documents(0);

        let outcome = run(&store, "items", PurgeOptions::new(), false).await?;

        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(store.counts.get(), 1);
        assert_eq!(store.fetches.get(), 0);
        assert_eq!(store.commits.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn dry_run_deletes_nothing() -> Result<()> {
        let store = MemoryStore::with_documents(12);

        let outcome = run(&store, "items", PurgeOptions::new(), true).await?;

        assert_eq!(outcome, Outcome::DryRun { found: 12 });
        assert_eq!(store.remaining(), 12);
        assert_eq!(store.fetches.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn counts_then_purges() -> Result<()> {
        let store = MemoryStore::with_documents(250);

        let outcome = run(&store, "items", PurgeOptions::new(), false).await?;

        assert_eq!(
            outcome,
            Outcome::Purged {
                found: 250,
                deleted: 250
            }
        );
        assert_eq!(store.commits.get(), 3);
        assert_eq!(store.remaining(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn purge_failure_propagates() -> Result<()> {
        let mut store = MemoryStore::with_documents(150);
        store.fail_on_commit = Some(1);

        let result = run(&store, "items", PurgeOptions::new(), false).await;

        assert!(result.is_err());
        assert_eq!(store.remaining(), 150);
        Ok(())
    }
}
