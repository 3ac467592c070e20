pub mod clear;
pub mod index;
pub mod recent;
pub mod search;
pub mod status;
pub mod tags;

pub use index::UpdateIndexArgs;
pub use recent::RecentItemsArgs;
pub use search::SearchLibraryArgs;
pub use tags::SearchTagsArgs;

use crate::config::Config;
use crate::library::LibraryClient;
use crate::search::{HybridSearch, KeywordSearch, SemanticSearch};
use std::sync::Arc;

/// Holds the services behind every MCP tool. Built once in `main`;
/// everything inside is cheaply cloneable.
#[derive(Clone)]
pub struct ToolHandlers {
    config: Config,
    library: Arc<dyn LibraryClient>,
    keyword: KeywordSearch,
    semantic: Option<SemanticSearch>,
    hybrid: HybridSearch,
}

impl ToolHandlers {
    pub fn new(
        config: Config,
        library: Arc<dyn LibraryClient>,
        semantic: Option<SemanticSearch>,
    ) -> Self {
        let keyword = KeywordSearch::new(Arc::clone(&library));
        let hybrid = HybridSearch::new(keyword.clone(), semantic.clone(), config.search.rrf_k);
        Self {
            config,
            library,
            keyword,
            semantic,
            hybrid,
        }
    }

    fn library_coordinates(&self) -> String {
        format!(
            "{}/{}",
            self.config.library.library_type.prefix(),
            self.config.library.library_id.as_deref().unwrap_or("?")
        )
    }
}
