//! Index status handler
//!
//! Reports semantic availability, indexed-document count, and which
//! library the server is pointed at.

use super::ToolHandlers;
use crate::vectordb::CHROMA_AVAILABLE;
use crate::Result;
use tracing::warn;

impl ToolHandlers {
    /// Handle index_status tool call - returns JSON string
    pub async fn handle_index_status(&self) -> Result<String> {
        let coordinates = self.library_coordinates();

        let (configured, documents) = match &self.semantic {
            Some(semantic) => match semantic.count().await {
                Ok(n) => (true, Some(n)),
                Err(e) => {
                    warn!("[STATUS] Could not reach the vector store: {}", e);
                    (true, None)
                }
            },
            None => (false, None),
        };

        let mut message = format!("Library: {coordinates}");
        message.push_str(&format!(
            "\nVector backend compiled in: {}",
            if CHROMA_AVAILABLE { "yes" } else { "no" }
        ));
        match (configured, documents) {
            (false, _) => {
                message.push_str(
                    "\nSemantic search: unavailable (no vector backend configured); \
                     keyword and hybrid modes still work",
                );
            }
            (true, Some(n)) => {
                message.push_str(&format!("\nSemantic search: ready ({n} documents indexed)"));
            }
            (true, None) => {
                message.push_str("\nSemantic search: configured but the vector store is unreachable");
            }
        }

        Ok(serde_json::json!({
            "message": message,
            "library": coordinates,
            "semantic_configured": configured,
            "documents": documents
        })
        .to_string())
    }
}
