//! Flat-file record store.
//!
//! Each entity type lives in its own document: a JSON array of flat objects.
//! Every mutation is a whole-document read-modify-write.

use async_trait::async_trait;
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::StoreError;

/// An entity that can be kept in a document.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier that must be unique within the document.
    fn key(&self) -> Uuid;
}

/// Field predicate used to select records during a scan.
pub type Matcher<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// Produces the replacement for a matched record.
pub type Mutation<T> = Box<dyn FnOnce(T) -> T + Send>;

#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Reads the whole document, in insertion order.
    async fn load(&self) -> Result<Vec<T>, StoreError>;

    /// Appends `record` at the end of the document. Fails with
    /// [`StoreError::DuplicateKey`] if its key is already present.
    async fn append(&self, record: T) -> Result<T, StoreError>;

    /// Replaces the first matching record with `mutate(record)` and returns
    /// the replacement. `None` leaves the document untouched.
    async fn replace_first(
        &self,
        matches: Matcher<'_, T>,
        mutate: Mutation<T>,
    ) -> Result<Option<T>, StoreError>;

    /// Removes every matching record. Returns whether anything was removed.
    async fn delete_all(&self, matches: Matcher<'_, T>) -> Result<bool, StoreError>;

    async fn find(&self, matches: Matcher<'_, T>) -> Result<Option<T>, StoreError> {
        Ok(self.load().await?.into_iter().find(|record| matches(record)))
    }

    async fn filter(&self, matches: Matcher<'_, T>) -> Result<Vec<T>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|record| matches(record))
            .collect())
    }
}

/// A [`Store`] backed by a single JSON file.
///
/// Read-modify-write cycles are serialised by a per-document lock, and the
/// document is replaced through a temporary file plus rename so readers never
/// observe a half-written array.
pub struct JsonFileStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileStore<T> {
    /// Opens the document at `path`, creating an empty one if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        if !fs::try_exists(&path).await? {
            fs::write(&path, b"[]").await?;
            info!("Created empty document {}", path.display());
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Vec<T>, StoreError> {
        let bytes = fs::read(&self.path).await?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_document(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(StoreError::Serialize)?;
        let staging = self.staging_path();

        let mut file = fs::File::create(&staging).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;
        debug!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<T: Record> Store<T> for JsonFileStore<T> {
    async fn load(&self) -> Result<Vec<T>, StoreError> {
        self.read_document().await
    }

    async fn append(&self, record: T) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_document().await?;

        let key = record.key();
        if records.iter().any(|existing| existing.key() == key) {
            return Err(StoreError::DuplicateKey(key));
        }

        records.push(record.clone());
        self.write_document(&records).await?;
        Ok(record)
    }

    async fn replace_first(
        &self,
        matches: Matcher<'_, T>,
        mutate: Mutation<T>,
    ) -> Result<Option<T>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_document().await?;

        let Some(index) = records.iter().position(|record| matches(record)) else {
            return Ok(None);
        };
        let updated = mutate(records[index].clone());
        records[index] = updated.clone();

        self.write_document(&records).await?;
        Ok(Some(updated))
    }

    async fn delete_all(&self, matches: Matcher<'_, T>) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_document().await?;

        let before = records.len();
        records.retain(|record| !matches(record));
        if records.len() == before {
            return Ok(false);
        }

        self.write_document(&records).await?;
        debug!(
            "Removed {} records from {}",
            before - records.len(),
            self.path.display()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        body: String,
    }

    impl Record for Note {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    fn note(body: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            body: body.to_string(),
        }
    }

    async fn open_store(dir: &TempDir) -> JsonFileStore<Note> {
        JsonFileStore::open(dir.path().join("notes.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_creates_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::<Note>::open(dir.path().join("nested/notes.json"))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_keeps_existing_document() {
        let dir = TempDir::new().unwrap();
        let existing = note("kept");
        let path = dir.path().join("notes.json");
        std::fs::write(&path, serde_json::to_vec(&vec![existing.clone()]).unwrap()).unwrap();

        let store = JsonFileStore::<Note>::open(&path).await.unwrap();
        assert_eq!(store.load().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn append_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let notes: Vec<Note> = ["a", "b", "c"].iter().map(|b| note(b)).collect();
        for n in &notes {
            store.append(n.clone()).await.unwrap();
        }

        assert_eq!(store.load().await.unwrap(), notes);
        assert!(!dir.path().join("notes.json.tmp").exists());
    }

    #[tokio::test]
    async fn append_rejects_duplicate_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let first = note("first");
        store.append(first.clone()).await.unwrap();

        let clash = Note {
            id: first.id,
            body: "second".to_string(),
        };
        let err = store.append(clash).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey(id) if id == first.id));
        assert_eq!(store.load().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn find_returns_first_match() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let wanted = note("same");
        store.append(note("other")).await.unwrap();
        store.append(wanted.clone()).await.unwrap();
        store.append(note("same")).await.unwrap();

        let found = store.find(&|n: &Note| n.body == "same").await.unwrap();
        assert_eq!(found, Some(wanted));
        assert!(store.find(&|n: &Note| n.body == "none").await.unwrap().is_none());

        let all = store.filter(&|n: &Note| n.body == "same").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn replace_first_rewrites_single_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let target = note("old");
        let bystander = note("old");
        store.append(target.clone()).await.unwrap();
        store.append(bystander.clone()).await.unwrap();

        let updated = store
            .replace_first(
                &|n: &Note| n.body == "old",
                Box::new(|mut n: Note| {
                    n.body = "new".to_string();
                    n
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, target.id);
        assert_eq!(updated.body, "new");
        assert_eq!(store.load().await.unwrap(), vec![updated, bystander]);
    }

    #[tokio::test]
    async fn replace_first_without_match_leaves_document() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.append(note("only")).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let result = store
            .replace_first(&|_: &Note| false, Box::new(|n: Note| n))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn delete_all_removes_every_match() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        let shared = Uuid::new_v4();
        let keep = note("keep");
        // Documents written by older tooling may carry repeated ids.
        let seeded = vec![
            Note { id: shared, body: "x".into() },
            keep.clone(),
            Note { id: shared, body: "y".into() },
        ];
        std::fs::write(&path, serde_json::to_vec(&seeded).unwrap()).unwrap();
        let store = JsonFileStore::<Note>::open(&path).await.unwrap();

        assert!(store.delete_all(&|n: &Note| n.id == shared).await.unwrap());
        assert_eq!(store.load().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn delete_all_without_match_reports_false() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.append(note("stays")).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        assert!(!store.delete_all(&|_: &Note| false).await.unwrap());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_document_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        std::fs::write(store.path(), b"{not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        let err = store.append(note("lost")).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(std::fs::read(store.path()).unwrap(), b"{not json");
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_store(&dir).await);

        let writes = (0..16).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.append(note(&i.to_string())).await })
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 16);
    }
}
