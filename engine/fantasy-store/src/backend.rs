//! Document store trait and implementations

use crate::batch::{Collection, WriteBatch, WriteOp};
use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type CollectionDocs = BTreeMap<String, Value>;

/// Abstract trait for document-store backends
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    /// Fetch every document of a collection, ordered by id
    async fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>>;

    /// Apply a batch atomically; returns the number of operations applied
    async fn commit(&self, batch: WriteBatch) -> Result<usize>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

fn decode<T: DeserializeOwned>(collection: Collection, id: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StoreError::InvalidDocument {
        collection: collection.to_string(),
        id: id.to_string(),
        message: e.to_string(),
    })
}

/// Typed helpers over any [`DocumentStore`]
#[async_trait::async_trait]
pub trait StoreExt: DocumentStore {
    async fn get_doc<T>(&self, collection: Collection, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(collection, id).await? {
            Some(value) => decode(collection, id, value).map(Some),
            None => Ok(None),
        }
    }

    async fn require_doc<T>(&self, collection: Collection, id: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.get_doc(collection, id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))
    }

    async fn list_docs<T>(&self, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.list(collection)
            .await?
            .into_iter()
            .map(|(id, value)| decode(collection, &id, value))
            .collect()
    }

    async fn put_doc<T>(&self, collection: Collection, id: &str, doc: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let mut batch = WriteBatch::new();
        batch.set(collection, id, doc)?;
        self.commit(batch).await.map(|_| ())
    }
}

impl<S: DocumentStore + ?Sized> StoreExt for S {}

fn apply_ops(docs: &mut HashMap<Collection, CollectionDocs>, ops: Vec<WriteOp>) {
    for op in ops {
        match op {
            WriteOp::Set { collection, id, doc } => {
                docs.entry(collection).or_default().insert(id, doc);
            }
            WriteOp::Delete { collection, id } => {
                if let Some(collection_docs) = docs.get_mut(&collection) {
                    collection_docs.remove(&id);
                }
            }
        }
    }
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    docs: Arc<RwLock<HashMap<Collection, CollectionDocs>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let docs = self.docs.read().await;
        Ok(docs.get(&collection).and_then(|c| c.get(id)).cloned())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&collection)
            .map(|c| c.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<usize> {
        let applied = batch.len();
        // Single write guard: readers never observe a partial batch
        let mut docs = self.docs.write().await;
        apply_ops(&mut docs, batch.into_ops());
        Ok(applied)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Local file-based backend: `<data_dir>/<collection>.json`
#[derive(Debug)]
pub struct LocalStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Local document store at: {:?}", data_dir);
        Ok(Self { data_dir, write_lock: Mutex::new(()) })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.as_str()))
    }

    async fn load(&self, collection: Collection) -> Result<CollectionDocs> {
        let path = self.collection_path(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CollectionDocs::new()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staged file {:?}: {}", tmp, e);
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for LocalStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let mut docs = self.load(collection).await?;
        Ok(docs.remove(id))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>> {
        Ok(self.load(collection).await?.into_iter().collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        let _guard = self.write_lock.lock().await;
        let applied = batch.len();

        let mut docs = HashMap::new();
        for collection in batch.collections() {
            docs.insert(collection, self.load(collection).await?);
        }
        apply_ops(&mut docs, batch.into_ops());

        // Stage every collection before replacing any of them. A failed
        // stage leaves the store untouched. Renames are per file, so a
        // failure there can leave earlier collections replaced.
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(docs.len());
        for (collection, collection_docs) in &docs {
            let path = self.collection_path(*collection);
            let tmp = path.with_extension("json.tmp");
            let written = match serde_json::to_vec_pretty(collection_docs) {
                Ok(bytes) => tokio::fs::write(&tmp, bytes).await.map_err(StoreError::from),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = written {
                staged.push((tmp, path));
                discard_staged(&staged).await;
                return Err(e);
            }
            staged.push((tmp, path));
        }
        for (i, (tmp, path)) in staged.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(tmp, path).await {
                tracing::error!("Commit interrupted after {} of {} collections: {}", i, staged.len(), e);
                discard_staged(&staged[i..]).await;
                return Err(e.into());
            }
        }

        tracing::debug!("Committed {} writes across {} collections", applied, docs.len());
        Ok(applied)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        text: String,
    }

    async fn exercise(store: &dyn DocumentStore) {
        let mut batch = WriteBatch::new();
        batch.set(Collection::Users, "b", &Note { text: "second".into() }).unwrap();
        batch.set(Collection::Users, "a", &Note { text: "first".into() }).unwrap();
        batch.set(Collection::Events, "ev1", &json!({"name": "UFC 300"})).unwrap();
        assert_eq!(store.commit(batch).await.unwrap(), 3);

        let note: Note = store.require_doc(Collection::Users, "a").await.unwrap();
        assert_eq!(note.text, "first");

        let notes: Vec<Note> = store.list_docs(Collection::Users).await.unwrap();
        assert_eq!(notes.iter().map(|n| n.text.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);

        let mut batch = WriteBatch::new();
        batch.delete(Collection::Users, "a");
        store.commit(batch).await.unwrap();
        assert!(store.get(Collection::Users, "a").await.unwrap().is_none());

        let missing = store.require_doc::<Note>(Collection::Users, "zzz").await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));

        let wrong_shape = store.get_doc::<Note>(Collection::Events, "ev1").await;
        assert!(matches!(wrong_shape, Err(StoreError::InvalidDocument { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        exercise(&InMemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_local_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path()).unwrap();
        exercise(&store).await;

        assert!(temp_dir.path().join("users.json").exists());
        assert!(!temp_dir.path().join("users.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_local_store_persists_across_handles() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = LocalStore::new(temp_dir.path()).unwrap();
            store.put_doc(Collection::Fighters, "f1", &Note { text: "Izzy".into() }).await.unwrap();
        }
        let reopened = LocalStore::new(temp_dir.path()).unwrap();
        let note: Option<Note> = reopened.get_doc(Collection::Fighters, "f1").await.unwrap();
        assert_eq!(note, Some(Note { text: "Izzy".into() }));
    }

    #[tokio::test]
    async fn test_local_store_failed_stage_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path()).unwrap();
        // A directory where the staged file should go makes staging fail
        std::fs::create_dir(temp_dir.path().join("events.json.tmp")).unwrap();

        let mut batch = WriteBatch::new();
        batch.set(Collection::Users, "u1", &Note { text: "kept out".into() }).unwrap();
        batch.set(Collection::Events, "ev1", &json!({"name": "UFC 300"})).unwrap();
        assert!(store.commit(batch).await.is_err());

        assert!(!temp_dir.path().join("users.json").exists());
        assert!(!temp_dir.path().join("users.json.tmp").exists());
        assert!(store.get(Collection::Users, "u1").await.unwrap().is_none());
    }
}
