//! `search_community` and `search_web` tools over the collaborator contracts.

use std::sync::Arc;

use mprovider::ToolDefinition;
use mtooling::{
    JsonObject, Tool, ToolError, ToolExecutionContext, ToolFuture, ToolOutput, ToolRegistry,
    optional_string, required_string, string_list,
};
use serde_json::json;

use crate::{CommunitySearch, SearchOutcome, WebFocus, WebSearch};

pub const SEARCH_COMMUNITY: &str = "search_community";
pub const SEARCH_WEB: &str = "search_web";

fn to_output(outcome: SearchOutcome) -> Result<ToolOutput, ToolError> {
    let sources = outcome.sources();
    let payload = serde_json::to_value(&outcome)
        .map_err(|err| ToolError::execution(format!("search results did not serialize: {err}")))?;
    Ok(ToolOutput::new(payload).with_sources(sources))
}

pub struct CommunitySearchTool {
    search: Arc<dyn CommunitySearch>,
}

impl CommunitySearchTool {
    pub fn new(search: Arc<dyn CommunitySearch>) -> Self {
        Self { search }
    }
}

impl Tool for CommunitySearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_COMMUNITY.to_string(),
            description: "Search Reddit food communities for first-hand restaurant opinions \
                          and local recommendations."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look for, e.g. 'best ramen Seattle'"
                    },
                    "subreddits": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional subreddits to search, e.g. ['FoodNYC']"
                    }
                },
                "required": ["query"]
            })
            .to_string(),
        }
    }

    fn source_label(&self) -> &str {
        "Reddit"
    }

    fn invoke<'a>(
        &'a self,
        args: JsonObject,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let query = required_string(&args, "query")?;
            let subreddits = string_list(&args, "subreddits");
            let outcome = self
                .search
                .search_community(&query, &subreddits, context.deadline)
                .await?;
            to_output(outcome)
        })
    }
}

pub struct WebSearchTool {
    search: Arc<dyn WebSearch>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_WEB.to_string(),
            description: "Search the web for restaurant reviews, menus, locations, and hours."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query, e.g. 'Lucali Brooklyn'"
                    },
                    "focus": {
                        "type": "string",
                        "enum": ["reviews", "menu", "location", "general"],
                        "description": "Kind of information to prioritise"
                    }
                },
                "required": ["query"]
            })
            .to_string(),
        }
    }

    fn source_label(&self) -> &str {
        "web search"
    }

    fn invoke<'a>(
        &'a self,
        args: JsonObject,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let query = required_string(&args, "query")?;
            let focus = optional_string(&args, "focus")
                .map(|value| WebFocus::parse_lenient(&value))
                .unwrap_or_default();
            let outcome = self
                .search
                .search_web(&query, focus, context.deadline)
                .await?;
            to_output(outcome)
        })
    }
}

/// Registers a tool for each configured collaborator; absent ones are skipped.
pub fn register_search_tools(
    registry: &mut ToolRegistry,
    community: Option<Arc<dyn CommunitySearch>>,
    web: Option<Arc<dyn WebSearch>>,
) {
    if let Some(community) = community {
        registry.register(CommunitySearchTool::new(community));
    }
    if let Some(web) = web {
        registry.register(WebSearchTool::new(web));
    }
}
