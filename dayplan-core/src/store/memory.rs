//! In-process document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{DocPath, Document, DocumentStore};

/// Keeps documents in a map for the lifetime of the process.
///
/// Can be switched offline to exercise unavailable-store handling, and counts
/// reads so callers can check how many loads a flow triggered.
#[derive(Debug)]
pub struct MemoryStore {
    docs: RwLock<HashMap<DocPath, Document>>,
    online: AtomicBool,
    reads: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            docs: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of `read` calls served so far, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".into()))
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn read(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn write(&self, path: &DocPath, doc: &Document) -> StoreResult<()> {
        self.check_online()?;
        self.docs.write().await.insert(path.clone(), doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::DateKey;

    #[tokio::test]
    async fn test_offline_store_fails_reads_and_writes() {
        let store = MemoryStore::new();
        let path = DocPath::day("alice", &DateKey::today().unwrap());

        store.set_online(false);
        assert!(matches!(
            store.read(&path).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.write(&path, &Document::default()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.read_count(), 1);

        store.set_online(true);
        let doc = Document {
            note: "back online".into(),
            ..Document::default()
        };
        store.write(&path, &doc).await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), Some(doc));
    }
}
