
pub mod hybrid;
pub mod keyword;
pub mod semantic;

pub use hybrid::{HybridSearch, SearchRequest};
pub use keyword::KeywordSearch;
pub use semantic::{SemanticHit, SemanticSearch};
