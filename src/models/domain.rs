use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form document metadata.
///
/// Values must be scalars (string, number, bool), the same restriction
/// Chroma-style collections put on metadata.
pub type Metadata = serde_json::Map<String, Value>;

/// Document as persisted in the vector store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl StoredDocument {
    pub fn new(id: String, content: String, embedding: Vec<f32>, metadata: Metadata) -> Self {
        Self {
            id,
            content,
            embedding,
            metadata,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Raw nearest-neighbour hit, `distance` is cosine distance (0 = same direction)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
}

/// Hit that passed the similarity threshold
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RelevantDocument {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
    pub similarity: f32,
}

impl From<QueryHit> for RelevantDocument {
    fn from(hit: QueryHit) -> Self {
        Self {
            similarity: 1.0 - hit.distance,
            id: hit.id,
            content: hit.content,
            metadata: hit.metadata,
            distance: hit.distance,
        }
    }
}

/// Source citation returned with an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub id: String,
    pub content: String,
    /// Percentage with one decimal, e.g. "87.5%"
    pub similarity: String,
    pub metadata: Metadata,
}

/// Document listing entry with a content preview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}
