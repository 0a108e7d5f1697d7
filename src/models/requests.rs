use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};
use crate::models::domain::Metadata;

/// Request to add a single document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentAdd {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: Metadata,
}

/// Request to add several documents at once
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentBatch {
    #[validate(length(min = 1), nested)]
    pub documents: Vec<DocumentAdd>,
}

/// RAG query
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1))]
    pub query: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 10))]
    pub top_k: usize,
    #[serde(default = "default_similarity_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub similarity_threshold: f32,
}

fn default_top_k() -> usize {
    3
}

fn default_similarity_threshold() -> f32 {
    0.6
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

fn validate_metadata(metadata: &Metadata) -> Result<(), ValidationError> {
    for (key, value) in metadata {
        if key.is_empty() {
            return Err(ValidationError::new("empty_metadata_key"));
        }
        if matches!(value, Value::Null | Value::Array(_) | Value::Object(_)) {
            let mut error = ValidationError::new("metadata_not_scalar");
            error.message = Some(format!("metadata value for '{}' must be a string, number or bool", key).into());
            return Err(error);
        }
    }
    Ok(())
}
