use crate::search::hybrid::DEFAULT_RRF_K;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Zotero library coordinates
    pub library: LibraryConfig,

    /// Semantic (vector) backend configuration
    pub semantic: SemanticConfig,

    /// Search configuration
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub library_id: Option<String>,
    pub library_type: LibraryType,
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    User,
    Group,
}

impl LibraryType {
    /// Path segment used by the Zotero Web API
    pub fn prefix(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    pub base_url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_top_k: usize,
    pub rrf_k: usize, // RRF parameter for hybrid search
    pub default_item_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig {
                library_id: None,
                library_type: LibraryType::User,
                api_key: None,
                base_url: "https://api.zotero.org".to_string(),
            },
            semantic: SemanticConfig {
                base_url: "http://localhost:8000".to_string(),
                collection: "zotero_items".to_string(),
            },
            search: SearchConfig {
                default_top_k: 10,
                rrf_k: DEFAULT_RRF_K,
                default_item_type: "-attachment".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        // Override with environment variables
        if let Ok(library_id) = std::env::var("ZOTERO_LIBRARY_ID") {
            config.library.library_id = Some(library_id);
        }

        if let Ok(library_type) = std::env::var("ZOTERO_LIBRARY_TYPE") {
            config.library.library_type = match library_type.to_lowercase().as_str() {
                "group" => LibraryType::Group,
                _ => LibraryType::User,
            };
        }

        if let Ok(api_key) = std::env::var("ZOTERO_API_KEY") {
            config.library.api_key = Some(api_key);
        }

        if let Ok(base_url) = std::env::var("ZOTERO_BASE_URL") {
            config.library.base_url = base_url;
        }

        // Semantic backend
        if let Ok(base_url) = std::env::var("CHROMA_BASE_URL") {
            config.semantic.base_url = base_url;
        }

        if let Ok(collection) = std::env::var("CHROMA_COLLECTION") {
            config.semantic.collection = collection;
        }

        // Search tuning
        if let Ok(top_k) = std::env::var("SEARCH_TOP_K") {
            if let Ok(top_k) = top_k.parse() {
                config.search.default_top_k = top_k;
            }
        }

        if let Ok(rrf_k) = std::env::var("SEARCH_RRF_K") {
            if let Ok(rrf_k) = rrf_k.parse() {
                config.search.rrf_k = rrf_k;
            }
        }

        Ok(config)
    }
}
