//! Search library handler
//!
//! Handles the search_library MCP tool: one query through the keyword,
//! semantic, or fused path.

use super::ToolHandlers;
use crate::error::HybridSearchError;
use crate::search::SearchRequest;
use crate::types::{KeywordMode, SearchMode, SearchResultItem};
use crate::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SearchLibraryArgs {
    pub query: String,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub keyword_mode: KeywordMode,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolHandlers {
    /// Handle search_library tool call - returns JSON string
    pub async fn handle_search_library(&self, args: SearchLibraryArgs) -> Result<String> {
        let SearchLibraryArgs {
            query,
            mode,
            limit,
            keyword_mode,
            item_type,
            tags,
        } = args;

        if query.trim().is_empty() {
            return Ok(serde_json::json!({
                "error": "Query must not be empty."
            })
            .to_string());
        }

        let top_k = limit.unwrap_or(self.config.search.default_top_k).min(50);
        let request = SearchRequest {
            query: query.clone(),
            mode,
            top_k,
            keyword_mode,
            item_type: item_type.unwrap_or_else(|| self.config.search.default_item_type.clone()),
            tags,
        };

        info!(
            "[SEARCH] {} search: \"{}\" (top_k: {})",
            request.mode.as_str(),
            query,
            top_k
        );

        let results = match self.hybrid.search(&request).await {
            Ok(results) => results,
            Err(e @ HybridSearchError::SemanticUnavailable) => {
                return Ok(serde_json::json!({
                    "error": format!("{}. Build with the `chroma` feature and configure CHROMA_BASE_URL, or use keyword mode.", e)
                })
                .to_string());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "[SEARCH] Query \"{}\" returned {} items",
            query,
            results.items.len()
        );

        if results.items.is_empty() {
            return Ok(serde_json::json!({
                "message": format!("No items found for query: \"{}\"", query),
                "results_count": 0
            })
            .to_string());
        }

        let mut message = format!(
            "Found {} items for query: \"{}\" ({} search)",
            results.items.len(),
            query,
            request.mode.as_str()
        );
        if results.has_more {
            message.push_str("\nMore items may match; raise the limit to fetch them.");
        }
        message.push_str("\n\n");
        message.push_str(&self.format_results(&results.items));

        Ok(serde_json::json!({
            "message": message,
            "results_count": results.items.len()
        })
        .to_string())
    }
}

impl ToolHandlers {
    pub(super) fn format_results(&self, items: &[SearchResultItem]) -> String {
        items
            .iter()
            .map(format_item)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn format_item(item: &SearchResultItem) -> String {
    let mut lines = format!("{}. {} [{}]", item.rank, item.title, item.item_type);

    if let Some(authors) = &item.authors {
        lines.push_str(&format!("\n   Authors: {authors}"));
    }
    if let Some(year) = item.year {
        lines.push_str(&format!("\n   Year: {year}"));
    } else if let Some(date) = &item.date {
        lines.push_str(&format!("\n   Date: {date}"));
    }

    lines.push_str(&format!("\n   Relevance: {:.4}", item.relevance_score));
    match (item.keyword_score, item.semantic_score) {
        (Some(k), Some(s)) => {
            lines.push_str(&format!(" (keyword: {k:.4}, semantic: {s:.4})"));
        }
        (Some(_), None) => lines.push_str(" (keyword only)"),
        (None, Some(_)) => lines.push_str(" (semantic only)"),
        (None, None) => {}
    }

    if !item.tags.is_empty() {
        lines.push_str(&format!("\n   Tags: {}", item.tags.join(", ")));
    }
    if let Some(doi) = &item.doi {
        lines.push_str(&format!("\n   DOI: {doi}"));
    }

    let summary = item.snippet.as_deref().or(item.abstract_text.as_deref());
    if let Some(summary) = summary {
        lines.push_str(&format!("\n   Summary: {}", truncate_text(summary, 300)));
    }

    lines.push_str(&format!("\n   Key: {}", item.key));
    lines
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
