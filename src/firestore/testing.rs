use super::{DocumentRef, DocumentStore};
use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};

const ITEMS: &str = "projects/p/databases/(default)/documents/items";

/// In-memory collection that records every call.
pub struct MemoryStore {
    pub documents: RefCell<Vec<DocumentRef>>,
    pub counts: Cell<usize>,
    pub fetches: Cell<usize>,
    pub commits: Cell<usize>,
    // backend that never returns more than this many handles per page
    pub page_cap: usize,
    pub fail_on_commit: Option<usize>,
}

impl MemoryStore {
    pub fn with_documents(n: usize) -> Self {
        let documents = (0..n)
            .map(|i| DocumentRef::new(format!("{ITEMS}/{i}")))
            .collect();

        Self {
            documents: RefCell::new(documents),
            counts: Cell::new(0),
            fetches: Cell::new(0),
            commits: Cell::new(0),
            page_cap: usize::MAX,
            fail_on_commit: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.documents.borrow().len()
    }
}

impl DocumentStore for MemoryStore {
    async fn count(&self, _collection: &str) -> Result<u64> {
        self.counts.set(self.counts.get() + 1);

        Ok(self.remaining() as u64)
    }

    async fn fetch_page(&self, _collection: &str, limit: usize) -> Result<Vec<DocumentRef>> {
        self.fetches.set(self.fetches.get() + 1);

        let take = limit.min(self.page_cap);

        let documents = self.documents.borrow();

        Ok(documents.iter().take(take).cloned().collect())
    }

    async fn commit_deletes(&self, documents: &[DocumentRef]) -> Result<()> {
        let attempt = self.commits.get() + 1;

        if self.fail_on_commit == Some(attempt) {
            bail!("commit {attempt} rejected");
        }

        self.commits.set(attempt);
        self.documents
            .borrow_mut()
            .retain(|document| !documents.contains(document));

        Ok(())
    }
}
