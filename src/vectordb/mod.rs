//! Vector store collaborator (Chroma-style, server-side embeddings)

pub mod chroma;

use crate::error::SemanticSearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a vector backend was compiled in. Checked before constructing
/// the semantic side; without it hybrid search degrades to keyword-only.
pub const CHROMA_AVAILABLE: bool = cfg!(feature = "chroma");

/// Metadata stored alongside each embedded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub key: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_item_type")]
    pub item_type: String,
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_item_type() -> String {
    "unknown".to_string()
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            key: String::new(),
            title: default_title(),
            item_type: default_item_type(),
        }
    }
}

/// Matches for one query text: parallel arrays, nearest first
#[derive(Debug, Clone, Default)]
pub struct QueryMatches {
    pub ids: Vec<String>,
    pub distances: Vec<f32>,
    pub metadatas: Vec<DocumentMetadata>,
    pub documents: Vec<Option<String>>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert documents by id
    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        metadatas: Vec<DocumentMetadata>,
    ) -> Result<(), SemanticSearchError>;

    /// Nearest-neighbor search by query text, one result set per query
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<QueryMatches>, SemanticSearchError>;

    /// Delete documents by id
    async fn delete(&self, ids: &[String]) -> Result<(), SemanticSearchError>;

    /// Delete every document in the collection
    async fn clear(&self) -> Result<(), SemanticSearchError>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize, SemanticSearchError>;
}

pub use chroma::ChromaVectorStore;
