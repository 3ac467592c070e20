//! Zotero Web API v3 client

use super::LibraryClient;
use crate::config::LibraryType;
use crate::error::SearchError;
use crate::types::SearchItemsInput;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const API_VERSION: &str = "3";
const TAGS_PAGE_SIZE: usize = 100;

pub struct ZoteroApiClient {
    client: Client,
    base_url: String,
    library_path: String,
    api_key: Option<String>,
}

impl ZoteroApiClient {
    pub fn new(
        library_id: String,
        library_type: LibraryType,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| "https://api.zotero.org".to_string());
        let library_path = format!("{}/{}", library_type.prefix(), library_id);

        Self {
            client: Client::new(),
            base_url,
            library_path,
            api_key,
        }
    }

    fn item_params(input: &SearchItemsInput) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", input.query.clone()),
            ("qmode", input.mode.as_str().to_string()),
            ("limit", input.limit.to_string()),
            ("start", input.offset.to_string()),
        ];
        if !input.item_type.is_empty() {
            params.push(("itemType", input.item_type.clone()));
        }
        for tag in &input.tags {
            params.push(("tag", tag.clone()));
        }
        params
    }

    async fn fetch_items(&self, params: &[(&str, String)]) -> Result<Vec<Value>, SearchError> {
        let url = format!("{}/{}/items", self.base_url, self.library_path);

        let mut request = self
            .client
            .get(&url)
            .header("Zotero-API-Version", API_VERSION)
            .query(params);
        if let Some(key) = &self.api_key {
            request = request.header("Zotero-API-Key", key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchError::Api { status, body });
        }

        let body: Value = response.json().await?;
        body.as_array()
            .cloned()
            .ok_or_else(|| SearchError::InvalidResponse("expected a JSON array of items".to_string()))
    }
}

#[async_trait]
impl LibraryClient for ZoteroApiClient {
    async fn search_items(&self, input: &SearchItemsInput) -> Result<Vec<Value>, SearchError> {
        let params = Self::item_params(input);
        self.fetch_items(&params).await
    }

    async fn list_items(&self, limit: usize, offset: usize) -> Result<Vec<Value>, SearchError> {
        let params = vec![
            ("limit", limit.to_string()),
            ("start", offset.to_string()),
            ("itemType", "-attachment".to_string()),
        ];
        self.fetch_items(&params).await
    }

    async fn recent_items(&self, limit: usize) -> Result<Vec<Value>, SearchError> {
        let params = vec![
            ("limit", limit.to_string()),
            ("sort", "dateAdded".to_string()),
            ("direction", "desc".to_string()),
            ("itemType", "-attachment".to_string()),
        ];
        self.fetch_items(&params).await
    }

    async fn get_tags(&self) -> Result<Vec<Value>, SearchError> {
        let url = format!("{}/{}/tags", self.base_url, self.library_path);
        let mut all_tags = Vec::new();
        let mut start = 0;

        loop {
            let params = [
                ("limit", TAGS_PAGE_SIZE.to_string()),
                ("start", start.to_string()),
            ];
            let mut request = self
                .client
                .get(&url)
                .header("Zotero-API-Version", API_VERSION)
                .query(&params);
            if let Some(key) = &self.api_key {
                request = request.header("Zotero-API-Key", key);
            }

            let response = request.send().await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SearchError::Api { status, body });
            }

            let page: Vec<Value> = response.json().await?;
            let page_len = page.len();
            all_tags.extend(page);

            if page_len < TAGS_PAGE_SIZE {
                break;
            }
            start += TAGS_PAGE_SIZE;
        }

        Ok(all_tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeywordMode;

    #[test]
    fn test_item_params_include_filters() {
        let input = SearchItemsInput {
            query: "machine learning".to_string(),
            mode: KeywordMode::Everything,
            item_type: "-attachment".to_string(),
            tags: vec!["ml".to_string(), "survey".to_string()],
            limit: 20,
            offset: 40,
        };

        let params = ZoteroApiClient::item_params(&input);

        assert!(params.contains(&("q", "machine learning".to_string())));
        assert!(params.contains(&("qmode", "everything".to_string())));
        assert!(params.contains(&("itemType", "-attachment".to_string())));
        assert!(params.contains(&("limit", "20".to_string())));
        assert!(params.contains(&("start", "40".to_string())));
        assert_eq!(
            params.iter().filter(|(name, _)| *name == "tag").count(),
            2
        );
    }

    #[test]
    fn test_item_params_omit_empty_item_type() {
        let input = SearchItemsInput {
            query: "q".to_string(),
            item_type: String::new(),
            ..Default::default()
        };

        let params = ZoteroApiClient::item_params(&input);

        assert!(!params.iter().any(|(name, _)| *name == "itemType"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let library_id = std::env::var("ZOTERO_LIBRARY_ID").expect("ZOTERO_LIBRARY_ID not set");
        let api_key = std::env::var("ZOTERO_API_KEY").ok();
        let client = ZoteroApiClient::new(library_id, LibraryType::User, api_key, None);

        let input = SearchItemsInput {
            query: "learning".to_string(),
            limit: 5,
            ..Default::default()
        };
        let items = client.search_items(&input).await.unwrap();
        assert!(items.len() <= 5);
    }
}
