use serde::{Deserialize, Serialize};

/// One ranked bibliographic record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub key: String,
    pub title: String,
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    #[serde(default)]
    pub relevance_score: f32,
    #[serde(default)]
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Ordered result set for one query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub total: usize,
    pub count: usize,
    pub items: Vec<SearchResultItem>,
    pub has_more: bool,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, items: Vec<SearchResultItem>, has_more: bool) -> Self {
        let n = items.len();
        Self {
            query: query.into(),
            total: n,
            count: n,
            items,
            has_more,
        }
    }
}

/// Which search path answers the query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Hybrid
    }
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(SearchMode::Keyword),
            "semantic" => Ok(SearchMode::Semantic),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

/// Zotero qmode: which fields the keyword search matches against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeywordMode {
    TitleCreatorYear,
    Everything,
}

impl Default for KeywordMode {
    fn default() -> Self {
        KeywordMode::TitleCreatorYear
    }
}

impl KeywordMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordMode::TitleCreatorYear => "titleCreatorYear",
            KeywordMode::Everything => "everything",
        }
    }
}

impl std::str::FromStr for KeywordMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "titlecreatoryear" => Ok(KeywordMode::TitleCreatorYear),
            "everything" => Ok(KeywordMode::Everything),
            other => Err(format!("unknown keyword mode: {other}")),
        }
    }
}

/// Parameters for one keyword search against the library API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItemsInput {
    pub query: String,
    pub mode: KeywordMode,
    pub item_type: String,
    pub tags: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchItemsInput {
    fn default() -> Self {
        Self {
            query: String::new(),
            mode: KeywordMode::default(),
            item_type: "-attachment".to_string(),
            tags: Vec::new(),
            limit: 25,
            offset: 0,
        }
    }
}
