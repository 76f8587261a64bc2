use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::StoreConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Parse(serde_json::Error),
    #[error("store document is not a JSON object")]
    MalformedDocument,
    #[error("collection `{0}` is not a JSON array")]
    MalformedCollection(&'static str),
    #[error("record in `{collection}` has an unexpected shape: {source}")]
    Decode {
        collection: &'static str,
        source: serde_json::Error,
    },
    #[error("failed to encode record for `{collection}`: {source}")]
    Encode {
        collection: &'static str,
        source: serde_json::Error,
    },
}

/// A whole-document JSON store: named collections of records held in memory
/// and rewritten to disk on every mutation.
///
/// Record order within a collection is insertion order, and that order is
/// what list reads expose. Mutations hold the write lock across the
/// read-modify-write and the file rewrite, so in-process writers cannot
/// interleave.
#[derive(Clone, Debug)]
pub struct JsonStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    document: RwLock<Map<String, Value>>,
}

impl JsonStore {
    /// Loads the document at the configured path, creating an empty one
    /// (and any missing parent directories) when the file does not exist.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.path().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let (document, existed) = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value: Value = serde_json::from_slice(&bytes)
                    .map_err(StoreError::Parse)?;
                match value {
                    Value::Object(map) => (map, true),
                    _ => return Err(StoreError::MalformedDocument),
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                (Map::new(), false)
            }
            Err(err) => return Err(err.into()),
        };

        let store = Self {
            inner: Arc::new(StoreInner {
                path,
                document: RwLock::new(document),
            }),
        };

        if !existed {
            let guard = store.inner.document.read().await;
            store.write_document(&guard).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path { &self.inner.path }

    /// Typed handle onto one named collection.
    pub fn collection<T>(&self, name: &'static str) -> Collection<T> {
        Collection {
            store: self.clone(),
            name,
            _marker: PhantomData,
        }
    }

    /// Serializes the full document and swaps it into place via a temp file
    /// rename, so readers of the file never observe a partial write.
    async fn write_document(
        &self, document: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(document)
            .map_err(StoreError::Parse)?;
        bytes.push(b'\n');

        let tmp = self.inner.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.inner.path).await?;

        debug!(
            store.path = %self.inner.path.display(),
            store.bytes = bytes.len(),
            "persisted store document"
        );
        Ok(())
    }
}

pub struct Collection<T> {
    store: JsonStore,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn name(&self) -> &'static str { self.name }

    fn decode(&self, value: &Value) -> Result<T, StoreError> {
        serde_json::from_value(value.clone()).map_err(|source| {
            StoreError::Decode {
                collection: self.name,
                source,
            }
        })
    }

    fn encode(&self, record: &T) -> Result<Value, StoreError> {
        serde_json::to_value(record).map_err(|source| {
            StoreError::Encode {
                collection: self.name,
                source,
            }
        })
    }

    fn items<'doc>(
        &self, document: &'doc Map<String, Value>,
    ) -> Result<Option<&'doc Vec<Value>>, StoreError> {
        match document.get(self.name) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(StoreError::MalformedCollection(self.name)),
        }
    }

    /// All records in insertion order.
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.store.inner.document.read().await;
        match self.items(&guard)? {
            None => Ok(Vec::new()),
            Some(items) => items.iter().map(|item| self.decode(item)).collect(),
        }
    }

    /// First record matching the predicate, in insertion order.
    pub async fn find<P>(&self, pred: P) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let guard = self.store.inner.document.read().await;
        let Some(items) = self.items(&guard)? else {
            return Ok(None);
        };
        for item in items {
            let record = self.decode(item)?;
            if pred(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Every record matching the predicate, in insertion order.
    pub async fn filter<P>(&self, pred: P) -> Result<Vec<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().filter(|r| pred(r)).collect())
    }

    /// Appends a record and persists the document before returning.
    pub async fn insert(&self, record: &T) -> Result<(), StoreError> {
        let value = self.encode(record)?;
        let mut guard = self.store.inner.document.write().await;
        {
            let slot = guard
                .entry(self.name)
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(items) = slot else {
                return Err(StoreError::MalformedCollection(self.name));
            };
            items.push(value);
        }
        self.store.write_document(&guard).await
    }

    /// Read-modify-write on the first record matching the predicate. The
    /// mutation and the file rewrite happen under one write lock; returns
    /// the record as persisted, or `None` when nothing matched.
    pub async fn update_where<P, M>(
        &self, pred: P, mutate: M,
    ) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
        M: FnOnce(&mut T),
    {
        let mut guard = self.store.inner.document.write().await;

        let target = {
            let Some(items) =
                guard.get_mut(self.name).and_then(Value::as_array_mut)
            else {
                return Ok(None);
            };

            let mut found = None;
            for (index, item) in items.iter().enumerate() {
                let record = self.decode(item)?;
                if pred(&record) {
                    found = Some((index, record));
                    break;
                }
            }
            let Some((index, mut record)) = found else {
                return Ok(None);
            };
            mutate(&mut record);
            items[index] = self.encode(&record)?;
            record
        };

        self.store.write_document(&guard).await?;
        Ok(Some(target))
    }

    /// Removes every record matching the predicate; returns how many went.
    /// The document is only rewritten when something was actually removed.
    pub async fn remove_where<P>(&self, pred: P) -> Result<usize, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let mut guard = self.store.inner.document.write().await;

        let removed = {
            let Some(items) =
                guard.get_mut(self.name).and_then(Value::as_array_mut)
            else {
                return Ok(0);
            };

            let mut keep = Vec::with_capacity(items.len());
            for item in items.iter() {
                let record = self.decode(item)?;
                keep.push(!pred(&record));
            }
            let before = items.len();
            let mut keep = keep.into_iter();
            items.retain(|_| keep.next().unwrap_or(true));
            before - items.len()
        };

        if removed > 0 {
            self.store.write_document(&guard).await?;
        }
        Ok(removed)
    }
}
