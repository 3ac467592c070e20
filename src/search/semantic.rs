//! Semantic search over the vector store

use crate::error::SemanticSearchError;
use crate::types::SearchResultItem;
use crate::vectordb::{DocumentMetadata, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;

/// One nearest-neighbor match
#[derive(Debug, Clone)]
pub struct SemanticHit {
    pub key: String,
    pub score: f32,
    pub metadata: DocumentMetadata,
    pub document: Option<String>,
}

#[derive(Clone)]
pub struct SemanticSearch {
    store: Arc<dyn VectorStore>,
}

impl SemanticSearch {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Nearest items for a query; score is `1 - cosine distance`.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<SemanticHit>, SemanticSearchError> {
        let responses = self
            .store
            .query(&[query.to_string()], top_k, filter)
            .await?;
        let Some(matches) = responses.into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut hits = Vec::with_capacity(matches.ids.len());
        for (i, key) in matches.ids.into_iter().enumerate() {
            let distance = matches.distances.get(i).copied().unwrap_or(1.0);
            hits.push(SemanticHit {
                key,
                score: 1.0 - distance,
                metadata: matches.metadatas.get(i).cloned().unwrap_or_default(),
                document: matches.documents.get(i).cloned().flatten(),
            });
        }
        Ok(hits)
    }

    /// Upsert items into the index. Returns how many were submitted.
    pub async fn add_items(&self, items: &[SearchResultItem]) -> Result<usize, SemanticSearchError> {
        let mut ids = Vec::with_capacity(items.len());
        let mut documents = Vec::with_capacity(items.len());
        let mut metadatas = Vec::with_capacity(items.len());

        for item in items {
            if item.key.is_empty() {
                continue;
            }
            ids.push(item.key.clone());
            documents.push(build_document(&item.title, item.abstract_text.as_deref()));
            metadatas.push(DocumentMetadata {
                key: item.key.clone(),
                title: item.title.clone(),
                item_type: item.item_type.clone(),
            });
        }

        if ids.is_empty() {
            return Ok(0);
        }

        let added = ids.len();
        self.store.add(ids, documents, metadatas).await?;
        tracing::info!("[INDEX] Added {} documents to the semantic index", added);
        Ok(added)
    }

    /// Delete items by key. Returns how many keys were submitted.
    pub async fn delete_items(&self, keys: &[String]) -> Result<usize, SemanticSearchError> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.store.delete(keys).await?;
        Ok(keys.len())
    }

    pub async fn clear(&self) -> Result<(), SemanticSearchError> {
        self.store.clear().await?;
        tracing::info!("[CLEAR] Semantic index emptied");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, SemanticSearchError> {
        self.store.count().await
    }
}

/// Text embedded per item: title joined with the abstract when one exists.
fn build_document(title: &str, abstract_text: Option<&str>) -> String {
    match abstract_text {
        Some(abstract_text) if !abstract_text.is_empty() => {
            format!("{title}. {abstract_text}")
        }
        _ => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectordb::QueryMatches;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        matches: QueryMatches,
        count: usize,
        fail: bool,
        added: Mutex<Vec<(Vec<String>, Vec<String>, Vec<DocumentMetadata>)>>,
        deleted: Mutex<Vec<Vec<String>>>,
        cleared: Mutex<bool>,
    }

    impl FakeStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn check_fail(&self) -> Result<(), SemanticSearchError> {
            if self.fail {
                Err(SemanticSearchError::Backend {
                    status: 503,
                    body: "vector backend down".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        async fn add(
            &self,
            ids: Vec<String>,
            documents: Vec<String>,
            metadatas: Vec<DocumentMetadata>,
        ) -> Result<(), SemanticSearchError> {
            self.check_fail()?;
            self.added.lock().unwrap().push((ids, documents, metadatas));
            Ok(())
        }

        async fn query(
            &self,
            _query_texts: &[String],
            _n_results: usize,
            _filter: Option<&HashMap<String, String>>,
        ) -> Result<Vec<QueryMatches>, SemanticSearchError> {
            self.check_fail()?;
            if self.matches.ids.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![self.matches.clone()])
        }

        async fn delete(&self, ids: &[String]) -> Result<(), SemanticSearchError> {
            self.check_fail()?;
            self.deleted.lock().unwrap().push(ids.to_vec());
            Ok(())
        }

        async fn clear(&self) -> Result<(), SemanticSearchError> {
            self.check_fail()?;
            *self.cleared.lock().unwrap() = true;
            Ok(())
        }

        async fn count(&self) -> Result<usize, SemanticSearchError> {
            self.check_fail()?;
            Ok(self.count)
        }
    }

    fn meta(key: &str, title: &str) -> DocumentMetadata {
        DocumentMetadata {
            key: key.to_string(),
            title: title.to_string(),
            item_type: "journalArticle".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_converts_distance_to_score() {
        let store = FakeStore {
            matches: QueryMatches {
                ids: vec!["A".to_string(), "B".to_string()],
                distances: vec![0.1, 0.4],
                metadatas: vec![meta("A", "Alpha"), meta("B", "Beta")],
                documents: vec![Some("Alpha. Abstract".to_string()), None],
            },
            ..Default::default()
        };
        let semantic = SemanticSearch::new(Arc::new(store));

        let hits = semantic.search("alpha", 5, None).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "A");
        assert!((hits[0].score - 0.9).abs() < 1e-6);
        assert!((hits[1].score - 0.6).abs() < 1e-6);
        assert_eq!(hits[0].document.as_deref(), Some("Alpha. Abstract"));
        assert!(hits[1].document.is_none());
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_no_hits() {
        let semantic = SemanticSearch::new(Arc::new(FakeStore::default()));
        let hits = semantic.search("anything", 5, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_add_items_builds_documents_and_metadata() {
        let store = Arc::new(FakeStore::default());
        let semantic = SemanticSearch::new(store.clone());

        let items = vec![
            SearchResultItem {
                key: "A".to_string(),
                title: "Attention Is All You Need".to_string(),
                item_type: "conferencePaper".to_string(),
                abstract_text: Some("We propose the Transformer.".to_string()),
                ..Default::default()
            },
            SearchResultItem {
                key: "B".to_string(),
                title: "Untitled".to_string(),
                item_type: "unknown".to_string(),
                ..Default::default()
            },
            SearchResultItem {
                // no key, must be skipped
                title: "Orphan".to_string(),
                ..Default::default()
            },
        ];

        let added = semantic.add_items(&items).await.unwrap();
        assert_eq!(added, 2);

        let calls = store.added.lock().unwrap();
        let (ids, documents, metadatas) = &calls[0];
        assert_eq!(ids, &vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            documents[0],
            "Attention Is All You Need. We propose the Transformer."
        );
        assert_eq!(documents[1], "Untitled");
        assert_eq!(metadatas[0].item_type, "conferencePaper");
    }

    #[tokio::test]
    async fn test_add_items_empty_short_circuits() {
        let store = Arc::new(FakeStore::failing());
        let semantic = SemanticSearch::new(store);

        // would fail if it reached the store
        let added = semantic.add_items(&[]).await.unwrap();
        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn test_delete_items_counts_keys() {
        let store = Arc::new(FakeStore::default());
        let semantic = SemanticSearch::new(store.clone());

        let keys = vec!["A".to_string(), "B".to_string()];
        let deleted = semantic.delete_items(&keys).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.deleted.lock().unwrap()[0], keys);

        let none = semantic.delete_items(&[]).await.unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn test_clear_and_count() {
        let store = Arc::new(FakeStore {
            count: 42,
            ..Default::default()
        });
        let semantic = SemanticSearch::new(store.clone());

        assert_eq!(semantic.count().await.unwrap(), 42);
        semantic.clear().await.unwrap();
        assert!(*store.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_semantic_error() {
        let semantic = SemanticSearch::new(Arc::new(FakeStore::failing()));
        let err = semantic.search("q", 5, None).await.unwrap_err();
        assert!(matches!(err, SemanticSearchError::Backend { status: 503, .. }));
    }

    #[test]
    fn test_build_document_variants() {
        assert_eq!(
            build_document("Title", Some("Abstract text")),
            "Title. Abstract text"
        );
        assert_eq!(build_document("Title", Some("")), "Title");
        assert_eq!(build_document("Title", None), "Title");
    }
}
