//! Update index handler
//!
//! Pages through the library, normalizes each page, and upserts the
//! records into the semantic index.

use super::ToolHandlers;
use crate::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct UpdateIndexArgs {
    #[serde(default)]
    pub force: bool,
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
    #[serde(default)]
    pub max_items: Option<usize>,
}

fn default_scan_limit() -> usize {
    100
}

impl ToolHandlers {
    /// Handle update_index tool call - returns JSON string
    pub async fn handle_update_index(&self, args: UpdateIndexArgs) -> Result<String> {
        let Some(semantic) = &self.semantic else {
            return Ok(serde_json::json!({
                "error": "Semantic indexing is unavailable: no vector backend is configured. \
                          Build with the `chroma` feature and set CHROMA_BASE_URL."
            })
            .to_string());
        };

        let UpdateIndexArgs {
            force,
            scan_limit,
            max_items,
        } = args;
        let page_size = scan_limit.clamp(1, 100);

        if force {
            info!("[INDEX] Force update: emptying the semantic index first");
            semantic.clear().await?;
        }

        info!(
            "[INDEX] Updating semantic index from library {} (page size: {})",
            self.library_coordinates(),
            page_size
        );

        let started = std::time::Instant::now();
        let mut offset = 0;
        let mut scanned = 0;
        let mut indexed = 0;

        loop {
            let page_limit = match max_items {
                Some(max) if scanned >= max => break,
                Some(max) => page_size.min(max - scanned),
                None => page_size,
            };

            let raw_items = self.library.list_items(page_limit, offset).await?;
            if raw_items.is_empty() {
                break;
            }

            let items = self.keyword.normalize_items(&raw_items);
            indexed += semantic.add_items(&items).await?;

            scanned += raw_items.len();
            offset += raw_items.len();

            if raw_items.len() < page_limit {
                break;
            }
        }

        let elapsed = started.elapsed().as_secs_f32();
        let total = semantic.count().await?;

        info!(
            "[INDEX] Indexed {} of {} scanned items in {:.2}s ({} documents total)",
            indexed, scanned, elapsed, total
        );

        Ok(serde_json::json!({
            "message": format!(
                "Indexed {indexed} items ({scanned} scanned) in {elapsed:.2}s. \
                 The semantic index now holds {total} documents."
            ),
            "indexed": indexed,
            "scanned": scanned,
            "total_documents": total
        })
        .to_string())
    }
}
