//! Hybrid search: Reciprocal Rank Fusion over the keyword and semantic
//! sources. Each source contributes `1/(k + rank)` per item; the fused
//! score is the sum across sources, so items ranked by both outscore
//! items ranked by one.

use crate::error::{HybridSearchError, SearchError, SemanticSearchError};
use crate::search::{KeywordSearch, SemanticSearch};
use crate::types::{KeywordMode, SearchItemsInput, SearchMode, SearchResultItem, SearchResults};
use std::collections::HashMap;

/// Default RRF constant. Larger values flatten the influence of rank
/// position, smaller values sharpen it.
pub const DEFAULT_RRF_K: usize = 60;

/// One search invocation
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub mode: SearchMode,
    pub top_k: usize,
    pub keyword_mode: KeywordMode,
    pub item_type: String,
    pub tags: Vec<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::Hybrid,
            top_k: 10,
            keyword_mode: KeywordMode::default(),
            item_type: "-attachment".to_string(),
            tags: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct HybridSearch {
    keyword: KeywordSearch,
    semantic: Option<SemanticSearch>,
    rrf_k: usize,
}

/// Per-key accumulator, alive for one fusion pass
struct FusionEntry {
    item: SearchResultItem,
    keyword_score: f32,
    semantic_score: f32,
    keyword_rank: Option<usize>,
    semantic_rank: Option<usize>,
}

impl FusionEntry {
    fn new(item: SearchResultItem) -> Self {
        Self {
            item,
            keyword_score: 0.0,
            semantic_score: 0.0,
            keyword_rank: None,
            semantic_rank: None,
        }
    }
}

impl HybridSearch {
    pub fn new(keyword: KeywordSearch, semantic: Option<SemanticSearch>, rrf_k: usize) -> Self {
        if semantic.is_none() {
            tracing::warn!(
                "[FUSION] No semantic backend configured; hybrid queries degrade to keyword-only"
            );
        }
        Self {
            keyword,
            semantic,
            rrf_k,
        }
    }

    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    /// Route one query through the requested search path.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults, HybridSearchError> {
        match request.mode {
            SearchMode::Keyword => Ok(self.keyword_results(request, request.top_k).await?),
            SearchMode::Semantic => self.semantic_only(request).await,
            SearchMode::Hybrid => self.fused(request).await,
        }
    }

    async fn keyword_results(
        &self,
        request: &SearchRequest,
        limit: usize,
    ) -> Result<SearchResults, SearchError> {
        let input = SearchItemsInput {
            query: request.query.clone(),
            mode: request.keyword_mode,
            item_type: request.item_type.clone(),
            tags: request.tags.clone(),
            limit,
            offset: 0,
        };
        self.keyword.search_items(&input).await
    }

    async fn semantic_results(
        &self,
        semantic: &SemanticSearch,
        query: &str,
        top_k: usize,
    ) -> Result<SearchResults, SemanticSearchError> {
        let hits = semantic.search(query, top_k, None).await?;
        let items = hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| SearchResultItem {
                key: hit.key,
                title: hit.metadata.title,
                item_type: hit.metadata.item_type,
                semantic_score: Some(hit.score),
                relevance_score: hit.score,
                rank: i + 1,
                snippet: hit.document,
                ..Default::default()
            })
            .collect();
        Ok(SearchResults::new(query, items, false))
    }

    async fn semantic_only(&self, request: &SearchRequest) -> Result<SearchResults, HybridSearchError> {
        let Some(semantic) = &self.semantic else {
            return Err(HybridSearchError::SemanticUnavailable);
        };
        Ok(self
            .semantic_results(semantic, &request.query, request.top_k)
            .await?)
    }

    /// Oversampled dual fetch, then RRF. Only the semantic sub-fetch may
    /// fail silently; keyword failures always surface.
    async fn fused(&self, request: &SearchRequest) -> Result<SearchResults, HybridSearchError> {
        let fetch_k = request.top_k * 2;

        let keyword_fut = self.keyword_results(request, fetch_k);
        let semantic_fut = async {
            match &self.semantic {
                Some(semantic) => {
                    Some(self.semantic_results(semantic, &request.query, fetch_k).await)
                }
                None => None,
            }
        };
        let (keyword_res, semantic_res) = tokio::join!(keyword_fut, semantic_fut);

        let keyword_results = keyword_res?;
        let semantic_results = match semantic_res {
            Some(Ok(results)) => Some(results),
            Some(Err(e)) => {
                tracing::warn!("[FUSION] Semantic fetch failed, continuing keyword-only: {}", e);
                None
            }
            None => None,
        };

        let mut items = self.rrf_fusion(&keyword_results, semantic_results.as_ref(), request.top_k);
        for (i, item) in items.iter_mut().enumerate() {
            item.rank = i + 1;
        }

        let has_more = keyword_results.has_more;
        Ok(SearchResults::new(request.query.clone(), items, has_more))
    }

    /// Accumulate `1/(k + rank)` per source list into per-key entries, then
    /// sort by the summed score. The entry vector preserves insertion order
    /// (keyword list first, then semantic-only extras), which is what the
    /// stable sort falls back to on ties.
    fn rrf_fusion(
        &self,
        keyword: &SearchResults,
        semantic: Option<&SearchResults>,
        top_k: usize,
    ) -> Vec<SearchResultItem> {
        let mut entries: Vec<FusionEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, item) in keyword.items.iter().enumerate() {
            let rank = i + 1;
            let slot = entry_slot(&mut entries, &mut index, item);
            let entry = &mut entries[slot];
            entry.keyword_score += 1.0 / (self.rrf_k + rank) as f32;
            entry.keyword_rank = Some(entry.keyword_rank.map_or(rank, |best| best.min(rank)));
        }

        if let Some(semantic) = semantic {
            for (i, item) in semantic.items.iter().enumerate() {
                let rank = i + 1;
                let slot = entry_slot(&mut entries, &mut index, item);
                let entry = &mut entries[slot];
                entry.semantic_score += 1.0 / (self.rrf_k + rank) as f32;
                entry.semantic_rank = Some(entry.semantic_rank.map_or(rank, |best| best.min(rank)));
            }
        }

        let mut fused: Vec<SearchResultItem> = entries
            .into_iter()
            .map(|entry| {
                tracing::debug!(
                    "[FUSION] {} keyword_rank={:?} semantic_rank={:?} score={:.5}",
                    entry.item.key,
                    entry.keyword_rank,
                    entry.semantic_rank,
                    entry.keyword_score + entry.semantic_score
                );
                let mut item = entry.item;
                item.keyword_score = (entry.keyword_score > 0.0).then_some(entry.keyword_score);
                item.semantic_score = (entry.semantic_score > 0.0).then_some(entry.semantic_score);
                item.relevance_score = entry.keyword_score + entry.semantic_score;
                item
            })
            .collect();

        fused.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused.truncate(top_k);
        fused
    }
}

/// First occurrence of a key claims a slot; later occurrences reuse it.
fn entry_slot(
    entries: &mut Vec<FusionEntry>,
    index: &mut HashMap<String, usize>,
    item: &SearchResultItem,
) -> usize {
    if let Some(&slot) = index.get(&item.key) {
        return slot;
    }
    entries.push(FusionEntry::new(item.clone()));
    let slot = entries.len() - 1;
    index.insert(item.key.clone(), slot);
    slot
}
