//! MCP server implementation for zkss.
//!
//! Exposes note search and reading as MCP tools for AI editors.

use std::borrow::Cow;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::commands;
use crate::config::Config;
use crate::search::cascade::RenderStyle;
use crate::storage::StorageError;

/// Parameters for `search_notes` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "The search query (keywords or concept)")]
    pub query: String,
    #[schemars(
        description = "If true, uses semantic (embedding-based) search. Keyword search otherwise."
    )]
    pub semantic: Option<bool>,
    #[schemars(description = "Max number of semantic results (default: 15)")]
    pub limit: Option<usize>,
}

/// Parameters for `read_note` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadParams {
    #[schemars(description = "The exact filename of the note to read")]
    pub filename: String,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(format!("{context}: {e}")),
        data: None,
    }
}

/// MCP server exposing zkss tools.
#[derive(Clone)]
pub struct ZkssServer {
    config: Config,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ZkssServer {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Keyword results as markdown, under a `Search Results` heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or invalid.
    pub fn keyword_text(&self, query: &str) -> anyhow::Result<String> {
        let words: Vec<&str> = query.split_whitespace().collect();
        let results = commands::keyword_search(&self.config, &words)?;
        let lines = results.lines(&self.config.notes.extension, RenderStyle::Markdown);

        Ok(format!("Search Results for '{query}':\n{}", lines.join("\n")))
    }

    /// Semantic results as markdown, under a count heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or the index is unavailable.
    pub fn semantic_text(&self, query: &str, limit: usize) -> anyhow::Result<String> {
        let results = commands::semantic_search(&self.config, query, limit)?;
        let body = commands::format_semantic_markdown(&results, &self.config.notes.extension);

        Ok(format!(
            "Found {} relevant notes (Semantic):\n{}",
            results.len(),
            body
        ))
    }

    /// Note content, or a not-found message.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid names and unreadable notes.
    pub fn note_text(&self, filename: &str) -> Result<String, StorageError> {
        match commands::read_note(&self.config, filename) {
            Ok(content) => Ok(content),
            Err(StorageError::NotFound(_)) => Ok(format!("Note '{filename}' not found.")),
            Err(e) => Err(e),
        }
    }

    #[tool(
        description = "Search for notes in the Zettelkasten. Supports exact keyword matching (default) and semantic/meaning-based search."
    )]
    async fn search_notes(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let output = if params.semantic.unwrap_or(false) {
            let limit = params.limit.unwrap_or(self.config.search.limit);
            self.semantic_text(&params.query, limit)
                .map_err(|e| internal_error("Semantic search failed", e))?
        } else {
            self.keyword_text(&params.query)
                .map_err(|e| internal_error("Keyword search failed", e))?
        };

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Read the full content of a note")]
    async fn read_note(
        &self,
        Parameters(params): Parameters<ReadParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.note_text(&params.filename) {
            Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
            Err(e) => Err(internal_error("Failed to read note", e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for ZkssServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "zkss searches a Zettelkasten notes directory. \
                Use search_notes to find notes by keyword or meaning, \
                and read_note to read a note's full contents."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(notes = %config.notes_dir().display(), "Starting MCP server");
    let server = ZkssServer::new(config);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
