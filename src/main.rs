use rmcp::{
    handler::server::router::tool::ToolRouter,
    model::*,
    tool, tool_handler,
    transport::stdio,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use zotsearch::types::{KeywordMode, SearchMode};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SearchLibraryParams {
    #[schemars(description = "Natural language or keyword query")]
    query: String,
    #[schemars(description = "Search mode: keyword, semantic, or hybrid (default)")]
    #[serde(default)]
    mode: Option<String>,
    #[schemars(description = "Maximum number of results to return")]
    #[serde(default)]
    limit: Option<usize>,
    #[schemars(description = "Keyword matching scope: titleCreatorYear (default) or everything")]
    #[serde(default)]
    keyword_mode: Option<String>,
    #[schemars(description = "Zotero item type filter, e.g. journalArticle or -attachment")]
    #[serde(default)]
    item_type: Option<String>,
    #[schemars(description = "Only return items carrying all of these tags")]
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SearchTagsParams {
    #[schemars(description = "Substring to match against tag names (case-insensitive)")]
    query: String,
    #[schemars(description = "Maximum number of tag names to return")]
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct RecentItemsParams {
    #[schemars(description = "Maximum number of items to return")]
    #[serde(default)]
    limit: Option<usize>,
    #[schemars(description = "Look-back window in days (default 30)")]
    #[serde(default)]
    days: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateIndexParams {
    #[schemars(description = "Empty the semantic index before re-indexing")]
    #[serde(default)]
    force: bool,
    #[schemars(description = "Library page size per fetch (1-100)")]
    #[serde(default = "default_scan_limit")]
    scan_limit: usize,
    #[schemars(description = "Stop after scanning this many items")]
    #[serde(default)]
    max_items: Option<usize>,
}

fn default_scan_limit() -> usize {
    100
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting zotsearch MCP server");

    let config = zotsearch::Config::from_env()?;
    let library_id = config
        .library
        .library_id
        .clone()
        .ok_or_else(|| zotsearch::Error::Config("Missing ZOTERO_LIBRARY_ID".to_string()))?;
    tracing::info!("Configuration loaded");

    let library: Arc<dyn zotsearch::library::LibraryClient> =
        Arc::new(zotsearch::library::ZoteroApiClient::new(
            library_id,
            config.library.library_type,
            config.library.api_key.clone(),
            Some(config.library.base_url.clone()),
        ));
    tracing::info!(
        "Library client ready for {}/{}",
        config.library.library_type.prefix(),
        config.library.library_id.as_deref().unwrap_or("?")
    );

    let semantic = if zotsearch::vectordb::CHROMA_AVAILABLE {
        match zotsearch::vectordb::ChromaVectorStore::connect(
            &config.semantic.base_url,
            &config.semantic.collection,
        )
        .await
        {
            Ok(store) => {
                tracing::info!(
                    "Connected to vector store at {} (collection '{}')",
                    config.semantic.base_url,
                    config.semantic.collection
                );
                let store: Arc<dyn zotsearch::vectordb::VectorStore> = Arc::new(store);
                Some(zotsearch::search::SemanticSearch::new(store))
            }
            Err(e) => {
                tracing::warn!("Vector store unreachable, semantic search disabled: {}", e);
                None
            }
        }
    } else {
        tracing::warn!("Built without the `chroma` feature; semantic search disabled");
        None
    };

    let handlers = zotsearch::handlers::ToolHandlers::new(config, library, semantic);
    tracing::info!("Tool handlers initialized");

    let server = LibrarySearchServer::new(Arc::new(handlers));

    tracing::info!("Server initialized, starting stdio transport");

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

struct LibrarySearchServer {
    handlers: Arc<zotsearch::handlers::ToolHandlers>,
    tool_router: ToolRouter<Self>,
}

impl LibrarySearchServer {
    fn new(handlers: Arc<zotsearch::handlers::ToolHandlers>) -> Self {
        Self {
            handlers,
            tool_router: Self::tool_router(),
        }
    }
}

#[rmcp::tool_router]
impl LibrarySearchServer {
    #[tool(
        name = "search_library",
        description = "Search the Zotero library. Combines keyword search against the Zotero API with semantic similarity over indexed abstracts, fused into a single ranking."
    )]
    async fn search_library(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<SearchLibraryParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;

        let mode = match params.mode.as_deref().map(|s| s.parse::<SearchMode>()) {
            None => SearchMode::default(),
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                return Ok(CallToolResult::success(vec![Content::text(
                    serde_json::json!({ "error": e }).to_string(),
                )]));
            }
        };
        let keyword_mode = match params.keyword_mode.as_deref().map(|s| s.parse::<KeywordMode>()) {
            None => KeywordMode::default(),
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                return Ok(CallToolResult::success(vec![Content::text(
                    serde_json::json!({ "error": e }).to_string(),
                )]));
            }
        };

        let args = zotsearch::handlers::SearchLibraryArgs {
            query: params.query,
            mode,
            limit: params.limit,
            keyword_mode,
            item_type: params.item_type,
            tags: params.tags,
        };

        match self.handlers.handle_search_library(args).await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Search failed: {}", e)}).to_string(),
            )])),
        }
    }

    #[tool(
        name = "search_tags",
        description = "Find tags in the Zotero library whose name contains the query. Useful for discovering the exact tag names to filter searches by."
    )]
    async fn search_tags(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<SearchTagsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let args = zotsearch::handlers::SearchTagsArgs {
            query: params.query,
            limit: params.limit,
        };

        match self.handlers.handle_search_tags(args).await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Tag search failed: {}", e)}).to_string(),
            )])),
        }
    }

    #[tool(
        name = "recent_items",
        description = "List items recently added to the Zotero library, newest first."
    )]
    async fn recent_items(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<RecentItemsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let args = zotsearch::handlers::RecentItemsArgs {
            limit: params.limit,
            days: params.days,
        };

        match self.handlers.handle_recent_items(args).await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Recent items lookup failed: {}", e)})
                    .to_string(),
            )])),
        }
    }

    #[tool(
        name = "update_index",
        description = "Index the Zotero library into the semantic search backend. Pages through every item, embeds title plus abstract, and upserts by item key. Use force to rebuild from scratch."
    )]
    async fn update_index(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<UpdateIndexParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let args = zotsearch::handlers::UpdateIndexArgs {
            force: params.force,
            scan_limit: params.scan_limit,
            max_items: params.max_items,
        };

        match self.handlers.handle_update_index(args).await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Index update failed: {}", e)}).to_string(),
            )])),
        }
    }

    #[tool(
        name = "index_status",
        description = "Report whether semantic search is available and how many documents the semantic index holds."
    )]
    async fn index_status(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        match self.handlers.handle_index_status().await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Status check failed: {}", e)}).to_string(),
            )])),
        }
    }

    #[tool(
        name = "clear_index",
        description = "Empty the semantic search index. Keyword search is unaffected."
    )]
    async fn clear_index(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        match self.handlers.handle_clear_index().await {
            Ok(json_response) => Ok(CallToolResult::success(vec![Content::text(json_response)])),
            Err(e) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::json!({"error": format!("Clear failed: {}", e)}).to_string(),
            )])),
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for LibrarySearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Hybrid search server for a Zotero library. Use update_index to build the \
                 semantic index, then search_library to find items by keyword, semantic \
                 similarity, or both fused together."
                    .to_string(),
            ),
        }
    }
}
