//! Chroma HTTP adapter. The collection is created (or fetched) once at
//! construction with cosine space; the server computes embeddings from the
//! submitted documents and query texts.
//!
//! Built without the `chroma` feature, the same type name resolves to a stub
//! whose constructor reports the backend as unavailable.

#[cfg(feature = "chroma")]
mod imp {
    use crate::error::SemanticSearchError;
    use crate::vectordb::{DocumentMetadata, QueryMatches, VectorStore};
    use async_trait::async_trait;
    use reqwest::Client;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    pub struct ChromaVectorStore {
        client: Client,
        base_url: String,
        collection_id: String,
    }

    #[derive(Deserialize)]
    struct CollectionInfo {
        id: String,
    }

    #[derive(Deserialize)]
    struct RawQueryResponse {
        ids: Vec<Vec<String>>,
        distances: Option<Vec<Vec<f32>>>,
        metadatas: Option<Vec<Vec<Option<DocumentMetadata>>>>,
        documents: Option<Vec<Vec<Option<String>>>>,
    }

    impl ChromaVectorStore {
        /// Create-or-get the collection. Fails fast when the service is
        /// unreachable so callers can branch once instead of per call.
        pub async fn connect(base_url: &str, collection: &str) -> Result<Self, SemanticSearchError> {
            let client = Client::new();
            let url = format!("{}/api/v1/collections", base_url);
            let body = json!({
                "name": collection,
                "get_or_create": true,
                "metadata": {"hnsw:space": "cosine"},
            });

            let response = client.post(&url).json(&body).send().await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SemanticSearchError::Backend { status, body });
            }

            let info: CollectionInfo = response.json().await?;
            tracing::info!("[VECTOR-DB] Connected to collection '{}' ({})", collection, info.id);

            Ok(Self {
                client,
                base_url: base_url.to_string(),
                collection_id: info.id,
            })
        }

        fn collection_url(&self, op: &str) -> String {
            format!(
                "{}/api/v1/collections/{}/{}",
                self.base_url, self.collection_id, op
            )
        }

        async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response, SemanticSearchError> {
            let response = self.client.post(url).json(body).send().await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SemanticSearchError::Backend { status, body });
            }
            Ok(response)
        }
    }

    #[async_trait]
    impl VectorStore for ChromaVectorStore {
        async fn add(
            &self,
            ids: Vec<String>,
            documents: Vec<String>,
            metadatas: Vec<DocumentMetadata>,
        ) -> Result<(), SemanticSearchError> {
            let body = json!({
                "ids": ids,
                "documents": documents,
                "metadatas": metadatas,
            });
            self.post_json(&self.collection_url("upsert"), &body).await?;
            Ok(())
        }

        async fn query(
            &self,
            query_texts: &[String],
            n_results: usize,
            filter: Option<&HashMap<String, String>>,
        ) -> Result<Vec<QueryMatches>, SemanticSearchError> {
            let mut body = json!({
                "query_texts": query_texts,
                "n_results": n_results,
                "include": ["metadatas", "documents", "distances"],
            });
            if let Some(filter) = filter {
                body["where"] = json!(filter);
            }

            let response = self.post_json(&self.collection_url("query"), &body).await?;
            let raw: RawQueryResponse = response.json().await?;

            let distances = raw.distances.unwrap_or_default();
            let metadatas = raw.metadatas.unwrap_or_default();
            let documents = raw.documents.unwrap_or_default();

            let mut results = Vec::with_capacity(raw.ids.len());
            for (qi, ids) in raw.ids.into_iter().enumerate() {
                let dist = distances.get(qi).cloned().unwrap_or_default();
                if dist.len() != ids.len() {
                    return Err(SemanticSearchError::InvalidResponse(
                        "distances do not match ids".to_string(),
                    ));
                }

                let mut metas: Vec<DocumentMetadata> = metadatas
                    .get(qi)
                    .map(|m| m.iter().map(|e| e.clone().unwrap_or_default()).collect())
                    .unwrap_or_default();
                metas.resize(ids.len(), DocumentMetadata::default());

                let mut docs: Vec<Option<String>> =
                    documents.get(qi).cloned().unwrap_or_default();
                docs.resize(ids.len(), None);

                results.push(QueryMatches {
                    ids,
                    distances: dist,
                    metadatas: metas,
                    documents: docs,
                });
            }

            Ok(results)
        }

        async fn delete(&self, ids: &[String]) -> Result<(), SemanticSearchError> {
            let body = json!({ "ids": ids });
            self.post_json(&self.collection_url("delete"), &body).await?;
            Ok(())
        }

        async fn clear(&self) -> Result<(), SemanticSearchError> {
            let body = json!({ "where": {} });
            self.post_json(&self.collection_url("delete"), &body).await?;
            Ok(())
        }

        async fn count(&self) -> Result<usize, SemanticSearchError> {
            let url = self.collection_url("count");
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SemanticSearchError::Backend { status, body });
            }
            let count: usize = response.json().await?;
            Ok(count)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        #[ignore]
        async fn test_live_roundtrip() {
            let base_url = std::env::var("CHROMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string());
            let store = ChromaVectorStore::connect(&base_url, "zotsearch_test")
                .await
                .unwrap();

            store
                .add(
                    vec!["TEST1".to_string()],
                    vec!["Deep learning for program synthesis".to_string()],
                    vec![DocumentMetadata {
                        key: "TEST1".to_string(),
                        title: "Deep learning for program synthesis".to_string(),
                        item_type: "journalArticle".to_string(),
                    }],
                )
                .await
                .unwrap();

            let count = store.count().await.unwrap();
            assert!(count >= 1);

            store.delete(&["TEST1".to_string()]).await.unwrap();
        }
    }
}

#[cfg(not(feature = "chroma"))]
mod imp {
    use crate::error::SemanticSearchError;
    use crate::vectordb::{DocumentMetadata, QueryMatches, VectorStore};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Permanently-unavailable stand-in compiled when the `chroma` feature
    /// is off. Construction is the only way to observe it, and it fails.
    pub struct ChromaVectorStore {
        _private: (),
    }

    fn unavailable() -> SemanticSearchError {
        SemanticSearchError::Unavailable(
            "zotsearch was built without the `chroma` feature".to_string(),
        )
    }

    impl ChromaVectorStore {
        pub async fn connect(_base_url: &str, _collection: &str) -> Result<Self, SemanticSearchError> {
            Err(unavailable())
        }
    }

    #[async_trait]
    impl VectorStore for ChromaVectorStore {
        async fn add(
            &self,
            _ids: Vec<String>,
            _documents: Vec<String>,
            _metadatas: Vec<DocumentMetadata>,
        ) -> Result<(), SemanticSearchError> {
            Err(unavailable())
        }

        async fn query(
            &self,
            _query_texts: &[String],
            _n_results: usize,
            _filter: Option<&HashMap<String, String>>,
        ) -> Result<Vec<QueryMatches>, SemanticSearchError> {
            Err(unavailable())
        }

        async fn delete(&self, _ids: &[String]) -> Result<(), SemanticSearchError> {
            Err(unavailable())
        }

        async fn clear(&self) -> Result<(), SemanticSearchError> {
            Err(unavailable())
        }

        async fn count(&self) -> Result<usize, SemanticSearchError> {
            Err(unavailable())
        }
    }
}

pub use imp::ChromaVectorStore;
