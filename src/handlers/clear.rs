use super::ToolHandlers;
use crate::Result;
use tracing::{info, warn};

impl ToolHandlers {
    /// Handle clear_index tool call - returns JSON string
    pub async fn handle_clear_index(&self) -> Result<String> {
        let Some(semantic) = &self.semantic else {
            return Ok(serde_json::json!({
                "error": "Semantic index is unavailable: no vector backend is configured."
            })
            .to_string());
        };

        let before = match semantic.count().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("[CLEAR] Could not read the document count before clearing: {}", e);
                None
            }
        };

        semantic.clear().await?;
        info!("[CLEAR] Semantic index cleared for library {}", self.library_coordinates());

        let message = match before {
            Some(n) => format!("Cleared the semantic index ({n} documents removed)."),
            None => "Cleared the semantic index.".to_string(),
        };

        Ok(serde_json::json!({
            "message": message,
            "removed": before
        })
        .to_string())
    }
}
