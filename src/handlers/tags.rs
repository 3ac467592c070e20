//! Search tags handler

use super::ToolHandlers;
use crate::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SearchTagsArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ToolHandlers {
    /// Handle search_tags tool call - returns JSON string
    pub async fn handle_search_tags(&self, args: SearchTagsArgs) -> Result<String> {
        let SearchTagsArgs { query, limit } = args;
        let limit = limit.unwrap_or(20).min(100);

        let matches = self.keyword.search_tags(&query, limit).await?;
        info!(
            "[SEARCH] Tag query \"{}\" matched {} tags",
            query,
            matches.len()
        );

        if matches.is_empty() {
            return Ok(serde_json::json!({
                "message": format!("No tags matched \"{}\"", query),
                "tags": []
            })
            .to_string());
        }

        let listing = matches
            .iter()
            .map(|tag| format!("- {tag}"))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(serde_json::json!({
            "message": format!(
                "Found {} tags matching \"{}\":\n{}",
                matches.len(),
                query,
                listing
            ),
            "tags": matches
        })
        .to_string())
    }
}
