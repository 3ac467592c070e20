//! Bibliographic library collaborator

mod zotero;

pub use zotero::ZoteroApiClient;

use crate::error::SearchError;
use crate::types::SearchItemsInput;
use async_trait::async_trait;
use serde_json::Value;

/// Read-only access to a bibliographic library.
///
/// Records come back as raw JSON, either `{"data": {...}}`-nested (Web API
/// shape) or flat; normalization happens downstream in the keyword search.
/// Tags come back as `{"tag": name}` objects or plain strings.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Keyword search over the library
    async fn search_items(&self, input: &SearchItemsInput) -> Result<Vec<Value>, SearchError>;

    /// One unfiltered page of records, for index building
    async fn list_items(&self, limit: usize, offset: usize) -> Result<Vec<Value>, SearchError>;

    /// Records sorted by dateAdded descending
    async fn recent_items(&self, limit: usize) -> Result<Vec<Value>, SearchError>;

    /// Every tag in the library
    async fn get_tags(&self) -> Result<Vec<Value>, SearchError>;
}
