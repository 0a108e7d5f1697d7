use crate::core::cosine_distance;
use crate::models::{QueryHit, StoredDocument};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

const DISTANCE_SPACE: &str = "cosine";

/// Errors that can occur in the vector store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid collection name '{0}': use 3-63 characters from [a-zA-Z0-9._-], starting and ending alphanumeric")]
    InvalidCollectionName(String),

    #[error("Document ID already exists: {0}")]
    DuplicateId(String),

    #[error("Embedding dimension {actual} does not match collection dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding for document {0} is empty")]
    EmptyEmbedding(String),

    #[error("Collection file {path} uses unsupported distance space '{space}'")]
    UnsupportedSpace { path: String, space: String },
}

/// On-disk layout of a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Collection {
    name: String,
    space: String,
    dimension: Option<usize>,
    documents: Vec<StoredDocument>,
}

impl Collection {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            space: DISTANCE_SPACE.to_string(),
            dimension: None,
            documents: Vec::new(),
        }
    }
}

/// Persistent single-collection vector store with exact cosine search.
///
/// The collection lives in memory behind a read/write lock and is written to
/// `<persist_dir>/<name>.json` after every mutation, while the write lock is
/// still held, so the file always reflects the last acknowledged write.
pub struct VectorStore {
    dir: PathBuf,
    path: PathBuf,
    name: String,
    collection: RwLock<Collection>,
}

impl VectorStore {
    /// Open (or create) a collection inside `persist_dir`
    pub async fn open<P: AsRef<Path>>(persist_dir: P, name: &str) -> Result<Self, StoreError> {
        validate_collection_name(name)?;

        let dir = persist_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.json", name));

        let collection = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let collection: Collection = serde_json::from_slice(&bytes)?;
                if collection.space != DISTANCE_SPACE {
                    return Err(StoreError::UnsupportedSpace {
                        path: path.display().to_string(),
                        space: collection.space,
                    });
                }
                collection
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collection::empty(name),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Collection '{}' ready at {} ({} documents)",
            name,
            path.display(),
            collection.documents.len()
        );

        Ok(Self {
            dir,
            path,
            name: name.to_string(),
            collection: RwLock::new(collection),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add one document
    pub async fn add_document(&self, document: StoredDocument) -> Result<usize, StoreError> {
        self.add_documents(vec![document]).await
    }

    /// Add documents atomically: either all are stored or none.
    ///
    /// Returns the document count after the insert.
    pub async fn add_documents(&self, documents: Vec<StoredDocument>) -> Result<usize, StoreError> {
        let mut collection = self.collection.write().await;

        if documents.is_empty() {
            return Ok(collection.documents.len());
        }

        let mut expected = collection.dimension;
        let existing: HashSet<&str> = collection.documents.iter().map(|d| d.id.as_str()).collect();
        let mut incoming: HashSet<&str> = HashSet::with_capacity(documents.len());

        for doc in &documents {
            if doc.embedding.is_empty() {
                return Err(StoreError::EmptyEmbedding(doc.id.clone()));
            }
            if existing.contains(doc.id.as_str()) || !incoming.insert(doc.id.as_str()) {
                return Err(StoreError::DuplicateId(doc.id.clone()));
            }
            match expected {
                Some(dim) if dim != doc.embedding.len() => {
                    return Err(StoreError::DimensionMismatch {
                        expected: dim,
                        actual: doc.embedding.len(),
                    });
                }
                Some(_) => {}
                None => expected = Some(doc.embedding.len()),
            }
        }
        drop(existing);
        drop(incoming);

        let previous_dimension = collection.dimension;
        let previous_len = collection.documents.len();
        collection.dimension = expected;
        collection.documents.extend(documents);

        if let Err(e) = self.persist(&collection).await {
            collection.documents.truncate(previous_len);
            collection.dimension = previous_dimension;
            return Err(e);
        }

        Ok(collection.documents.len())
    }

    /// Nearest documents by cosine distance, closest first, at most `top_k`
    pub async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryHit>, StoreError> {
        let collection = self.collection.read().await;

        if collection.documents.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dim) = collection.dimension {
            if dim != embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected: dim,
                    actual: embedding.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = collection
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (idx, cosine_distance(embedding, &doc.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(idx, distance)| {
                let doc = &collection.documents[idx];
                QueryHit {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    distance,
                }
            })
            .collect())
    }

    /// All documents in insertion order
    pub async fn get_all(&self) -> Vec<StoredDocument> {
        self.collection.read().await.documents.clone()
    }

    pub async fn get(&self, id: &str) -> Option<StoredDocument> {
        self.collection
            .read()
            .await
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.collection.read().await.documents.len()
    }

    /// Delete a document; returns whether it existed. Missing ids are not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut collection = self.collection.write().await;

        let Some(pos) = collection.documents.iter().position(|d| d.id == id) else {
            return Ok(false);
        };

        let removed = collection.documents.remove(pos);
        if let Err(e) = self.persist(&collection).await {
            collection.documents.insert(pos, removed);
            return Err(e);
        }

        Ok(true)
    }

    /// Drop every document and forget the collection dimension
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut collection = self.collection.write().await;
        let fresh = Collection::empty(&self.name);
        self.persist(&fresh).await?;
        *collection = fresh;
        Ok(())
    }

    /// Write to a temp file in the same directory, then rename over the target
    async fn persist(&self, collection: &Collection) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(collection)?;
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", self.name, uuid::Uuid::new_v4()));

        write_atomic(&tmp, &self.path, &bytes).await?;

        tracing::debug!("Persisted collection '{}' ({} documents)", self.name, collection.documents.len());
        Ok(())
    }
}

/// Write `bytes` to `tmp` and rename it onto `target`. The temp file is
/// removed whenever either step fails.
async fn write_atomic(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let result = match tokio::fs::write(tmp, bytes).await {
        Ok(()) => tokio::fs::rename(tmp, target).await,
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove temp file {}: {}", tmp.display(), e);
            }
        }
    }
    result
}

fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let valid_len = (3..=63).contains(&name.len());
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let alnum_ends = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());

    if valid_len && valid_chars && alnum_ends && !name.contains("..") {
        Ok(())
    } else {
        Err(StoreError::InvalidCollectionName(name.to_string()))
    }
}
