//! Recently added items handler

use super::ToolHandlers;
use crate::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct RecentItemsArgs {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub days: Option<i64>,
}

impl ToolHandlers {
    /// Handle recent_items tool call - returns JSON string
    pub async fn handle_recent_items(&self, args: RecentItemsArgs) -> Result<String> {
        let RecentItemsArgs { limit, days } = args;
        let limit = limit.unwrap_or(self.config.search.default_top_k).min(50);
        let days = days.unwrap_or(30).max(1);

        let results = self.keyword.recent_items(limit, days).await?;
        info!(
            "[SEARCH] Recent items: {} added in the last {} days",
            results.items.len(),
            days
        );

        if results.items.is_empty() {
            return Ok(serde_json::json!({
                "message": format!("No items were added in the last {} days.", days),
                "results_count": 0
            })
            .to_string());
        }

        let mut message = format!(
            "{} items added in the last {} days:",
            results.items.len(),
            days
        );
        message.push_str("\n\n");
        message.push_str(&self.format_results(&results.items));

        Ok(serde_json::json!({
            "message": message,
            "results_count": results.items.len()
        })
        .to_string())
    }
}
