use thiserror::Error;

/// Failure of the lexical (bibliographic API) search backend.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("library request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("library API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed library response: {0}")]
    InvalidResponse(String),
}

/// Failure of the vector (semantic) search backend.
#[derive(Error, Debug)]
pub enum SemanticSearchError {
    #[error("vector backend unavailable: {0}")]
    Unavailable(String),

    #[error("vector store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("vector store error ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("malformed vector store response: {0}")]
    InvalidResponse(String),
}

/// Umbrella error raised by the fusion layer. Carries the causal backend
/// error except for the hybrid degrade-to-keyword path, which surfaces
/// nothing at all.
#[derive(Error, Debug)]
pub enum HybridSearchError {
    #[error("keyword search failed: {0}")]
    Keyword(#[from] SearchError),

    #[error("semantic search failed: {0}")]
    Semantic(#[from] SemanticSearchError),

    #[error("semantic search unavailable: no vector backend is configured")]
    SemanticUnavailable,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Search error: {0}")]
    Search(#[from] HybridSearchError),

    #[error("Keyword search error: {0}")]
    Keyword(#[from] SearchError),

    #[error("Semantic search error: {0}")]
    Semantic(#[from] SemanticSearchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
