//! Keyword search against the bibliographic library

use crate::error::SearchError;
use crate::library::LibraryClient;
use crate::types::{SearchItemsInput, SearchResultItem, SearchResults};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct KeywordSearch {
    client: Arc<dyn LibraryClient>,
    year_re: Option<Regex>,
}

impl KeywordSearch {
    pub fn new(client: Arc<dyn LibraryClient>) -> Self {
        Self {
            client,
            year_re: Regex::new(r"\b(19|20)\d{2}\b").ok(),
        }
    }

    /// Search the library; results carry inverse-rank keyword scores.
    pub async fn search_items(&self, input: &SearchItemsInput) -> Result<SearchResults, SearchError> {
        let raw_items = self.client.search_items(input).await?;
        let mut items = self.normalize_items(&raw_items);
        annotate_inverse_rank(&mut items);

        let has_more = items.len() >= input.limit;
        tracing::info!(
            "[SEARCH] Keyword query '{}' returned {} items",
            input.query,
            items.len()
        );
        Ok(SearchResults::new(input.query.clone(), items, has_more))
    }

    /// Tag names whose lowercase form contains the lowercase query,
    /// deduplicated, capped at `limit`.
    pub async fn search_tags(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let raw_tags = self.client.get_tags().await?;
        let needle = query.to_lowercase();

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for value in &raw_tags {
            let Some(name) = tag_name(value) else {
                continue;
            };
            if !name.to_lowercase().contains(&needle) {
                continue;
            }
            if seen.insert(name.clone()) {
                matches.push(name);
                if matches.len() >= limit {
                    break;
                }
            }
        }
        Ok(matches)
    }

    /// Items added within the last `days` days, newest first.
    pub async fn recent_items(&self, limit: usize, days: i64) -> Result<SearchResults, SearchError> {
        let raw_items = self.client.recent_items(limit).await?;
        let cutoff = Utc::now() - Duration::days(days);

        let mut items = self.normalize_items(&raw_items);
        items.retain(|item| {
            item.date_added
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc) >= cutoff)
                .unwrap_or(false)
        });
        annotate_inverse_rank(&mut items);

        let has_more = items.len() >= limit;
        Ok(SearchResults::new(String::new(), items, has_more))
    }

    /// Normalize a batch of raw records, skipping any without a key.
    pub fn normalize_items(&self, raw_items: &[Value]) -> Vec<SearchResultItem> {
        let mut items = Vec::new();
        for raw in raw_items {
            match self.normalize_record(raw) {
                Some(item) => items.push(item),
                None => tracing::debug!("[SEARCH] Skipping record without key"),
            }
        }
        items
    }

    /// Nested-vs-flat record shapes collapse here; nothing downstream
    /// branches on shape again.
    fn normalize_record(&self, raw: &Value) -> Option<SearchResultItem> {
        let data = match raw.get("data") {
            Some(nested) if nested.is_object() => nested,
            _ => raw,
        };

        let key = data.get("key").and_then(Value::as_str)?.to_string();

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string();
        let item_type = data
            .get("itemType")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let date = data.get("date").and_then(Value::as_str).map(str::to_string);
        let year = date.as_deref().and_then(|d| self.extract_year(d));
        let abstract_text = data
            .get("abstractNote")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let collections = data
            .get("collections")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(SearchResultItem {
            key,
            title,
            item_type,
            authors: format_authors(data.get("creators")),
            date,
            year,
            abstract_text,
            tags: collect_tags(data.get("tags")),
            doi: data.get("DOI").and_then(Value::as_str).map(str::to_string),
            url: data.get("url").and_then(Value::as_str).map(str::to_string),
            date_added: data
                .get("dateAdded")
                .and_then(Value::as_str)
                .map(str::to_string),
            collections,
            ..Default::default()
        })
    }

    fn extract_year(&self, date: &str) -> Option<i32> {
        let re = self.year_re.as_ref()?;
        re.find(date).and_then(|m| m.as_str().parse().ok())
    }
}

fn annotate_inverse_rank(items: &mut [SearchResultItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        let rank = i + 1;
        let score = 1.0 / rank as f32;
        item.keyword_score = Some(score);
        item.relevance_score = score;
        item.rank = rank;
    }
}

/// Upstream tags are `{"tag": name}` objects or plain strings.
fn tag_name(value: &Value) -> Option<String> {
    if let Some(name) = value.get("tag").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    value.as_str().map(str::to_string)
}

fn format_authors(creators: Option<&Value>) -> Option<String> {
    let creators = creators?.as_array()?;
    let names: Vec<String> = creators
        .iter()
        .filter(|c| c.get("creatorType").and_then(Value::as_str) == Some("author"))
        .filter_map(|c| {
            c.get("lastName")
                .and_then(Value::as_str)
                .or_else(|| c.get("firstName").and_then(Value::as_str))
                .map(str::to_string)
        })
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn collect_tags(tags: Option<&Value>) -> Vec<String> {
    let Some(entries) = tags.and_then(Value::as_array) else {
        return Vec::new();
    };
    entries.iter().filter_map(tag_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeywordMode;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeLibrary {
        items: Vec<Value>,
        tags: Vec<Value>,
    }

    impl FakeLibrary {
        fn with_items(items: Vec<Value>) -> Self {
            Self { items, tags: Vec::new() }
        }

        fn with_tags(tags: Vec<Value>) -> Self {
            Self { items: Vec::new(), tags }
        }
    }

    #[async_trait]
    impl LibraryClient for FakeLibrary {
        async fn search_items(&self, input: &SearchItemsInput) -> Result<Vec<Value>, SearchError> {
            Ok(self.items.iter().take(input.limit).cloned().collect())
        }

        async fn list_items(&self, limit: usize, offset: usize) -> Result<Vec<Value>, SearchError> {
            Ok(self.items.iter().skip(offset).take(limit).cloned().collect())
        }

        async fn recent_items(&self, limit: usize) -> Result<Vec<Value>, SearchError> {
            Ok(self.items.iter().take(limit).cloned().collect())
        }

        async fn get_tags(&self) -> Result<Vec<Value>, SearchError> {
            Ok(self.tags.clone())
        }
    }

    fn nested_record(key: &str, title: &str) -> Value {
        json!({
            "key": key,
            "data": {
                "key": key,
                "title": title,
                "itemType": "journalArticle",
                "creators": [
                    {"creatorType": "author", "firstName": "Ada", "lastName": "Lovelace"},
                    {"creatorType": "author", "firstName": "Charles", "lastName": "Babbage"},
                    {"creatorType": "editor", "lastName": "Menabrea"}
                ],
                "date": "March 2023",
                "abstractNote": "An abstract.",
                "tags": [{"tag": "computing"}, "history"],
                "DOI": "10.1000/xyz",
                "url": "https://example.org/paper",
                "dateAdded": "2023-03-15T10:30:00Z",
                "collections": ["COLL1"]
            }
        })
    }

    #[tokio::test]
    async fn test_normalizes_nested_records() {
        let client = Arc::new(FakeLibrary::with_items(vec![nested_record("ITEM1", "On Computable Numbers")]));
        let search = KeywordSearch::new(client);

        let results = search
            .search_items(&SearchItemsInput {
                query: "computable".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.items.len(), 1);
        let item = &results.items[0];
        assert_eq!(item.key, "ITEM1");
        assert_eq!(item.title, "On Computable Numbers");
        assert_eq!(item.item_type, "journalArticle");
        assert_eq!(item.authors.as_deref(), Some("Lovelace, Babbage"));
        assert_eq!(item.year, Some(2023));
        assert_eq!(item.abstract_text.as_deref(), Some("An abstract."));
        assert_eq!(item.tags, vec!["computing".to_string(), "history".to_string()]);
        assert_eq!(item.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(item.date_added.as_deref(), Some("2023-03-15T10:30:00Z"));
    }

    #[tokio::test]
    async fn test_normalizes_flat_records_with_defaults() {
        let client = Arc::new(FakeLibrary::with_items(vec![json!({"key": "FLAT1"})]));
        let search = KeywordSearch::new(client);

        let results = search
            .search_items(&SearchItemsInput::default())
            .await
            .unwrap();

        let item = &results.items[0];
        assert_eq!(item.key, "FLAT1");
        assert_eq!(item.title, "Untitled");
        assert_eq!(item.item_type, "unknown");
        assert!(item.authors.is_none());
        assert!(item.tags.is_empty());
    }

    #[tokio::test]
    async fn test_skips_records_without_key() {
        let client = Arc::new(FakeLibrary::with_items(vec![
            json!({"key": "GOOD1", "title": "Kept"}),
            json!({"title": "No key here"}),
            json!({"data": {"key": "GOOD2"}}),
        ]));
        let search = KeywordSearch::new(client);

        let results = search
            .search_items(&SearchItemsInput::default())
            .await
            .unwrap();

        let keys: Vec<&str> = results.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["GOOD1", "GOOD2"]);
    }

    #[tokio::test]
    async fn test_inverse_rank_scores() {
        let client = Arc::new(FakeLibrary::with_items(vec![
            nested_record("A", "First"),
            nested_record("B", "Second"),
            nested_record("C", "Third"),
        ]));
        let search = KeywordSearch::new(client);

        let results = search
            .search_items(&SearchItemsInput::default())
            .await
            .unwrap();

        for (i, item) in results.items.iter().enumerate() {
            let rank = i + 1;
            assert_eq!(item.rank, rank);
            assert_eq!(item.keyword_score, Some(1.0 / rank as f32));
            assert_eq!(item.relevance_score, 1.0 / rank as f32);
            assert!(item.semantic_score.is_none());
        }
    }

    #[tokio::test]
    async fn test_has_more_tracks_limit() {
        let items: Vec<Value> = (0..3).map(|i| json!({"key": format!("K{i}")})).collect();
        let search = KeywordSearch::new(Arc::new(FakeLibrary::with_items(items)));

        let full = search
            .search_items(&SearchItemsInput {
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(full.has_more);

        let short = search
            .search_items(&SearchItemsInput {
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!short.has_more);
    }

    #[tokio::test]
    async fn test_search_tags_substring_dedup_and_cap() {
        let search = KeywordSearch::new(Arc::new(FakeLibrary::with_tags(vec![
            json!({"tag": "Machine Learning"}),
            json!("machine learning"),
            json!({"tag": "Machine Learning"}),
            json!({"tag": "learning theory"}),
            json!({"tag": "biology"}),
            json!("deep learning"),
        ])));

        let matches = search.search_tags("LEARN", 10).await.unwrap();
        assert_eq!(
            matches,
            vec![
                "Machine Learning".to_string(),
                "machine learning".to_string(),
                "learning theory".to_string(),
                "deep learning".to_string(),
            ]
        );

        let capped = search.search_tags("learn", 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_recent_items_filters_by_cutoff() {
        let fresh = (Utc::now() - Duration::days(1)).to_rfc3339();
        let stale = (Utc::now() - Duration::days(30)).to_rfc3339();
        let search = KeywordSearch::new(Arc::new(FakeLibrary::with_items(vec![
            json!({"key": "NEW1", "dateAdded": fresh}),
            json!({"key": "OLD1", "dateAdded": stale}),
            json!({"key": "NODATE"}),
        ])));

        let results = search.recent_items(10, 7).await.unwrap();

        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].key, "NEW1");
        assert_eq!(results.items[0].rank, 1);
    }

    #[tokio::test]
    async fn test_everything_mode_passes_through() {
        let client = Arc::new(FakeLibrary::with_items(vec![nested_record("E1", "Any")]));
        let search = KeywordSearch::new(client);

        let results = search
            .search_items(&SearchItemsInput {
                query: "any".to_string(),
                mode: KeywordMode::Everything,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(results.query, "any");
        assert_eq!(results.total, 1);
        assert_eq!(results.count, 1);
    }
}
