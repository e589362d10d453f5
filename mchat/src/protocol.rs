//! Plain-text search convention for providers without function calling.
//!
//! A completion asks for searches by emitting the `SEARCH_NEEDED` sentinel
//! followed by one tagged line per search:
//!
//! ```text
//! SEARCH_NEEDED
//! REDDIT: best pizza brooklyn | FoodNYC, Brooklyn
//! WEB: lucali brooklyn | reviews
//! ```
//!
//! The parser never fails: unknown tags, lines without a query, and any
//! other noise are skipped.
//!
//! ```rust
//! use mchat::{SearchKind, parse_completion};
//!
//! let parsed = parse_completion("Let me check.\nSEARCH_NEEDED\nWEB: lucali | reviews\nnoise");
//! assert_eq!(parsed.preamble, "Let me check.");
//! assert_eq!(parsed.intents.len(), 1);
//! assert_eq!(parsed.intents[0].kind, SearchKind::Web);
//! assert_eq!(parsed.intents[0].target.as_deref(), Some("reviews"));
//! ```

use mprovider::{ToolCall, ToolDefinition};
use serde_json::json;

pub const SEARCH_SENTINEL: &str = "SEARCH_NEEDED";

const COMMUNITY_TOOL: &str = "search_community";
const WEB_TOOL: &str = "search_web";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Community,
    Web,
}

impl SearchKind {
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::Community => COMMUNITY_TOOL,
            Self::Web => WEB_TOOL,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "REDDIT" | "COMMUNITY" => Some(Self::Community),
            "WEB" => Some(Self::Web),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIntent {
    pub kind: SearchKind,
    pub query: String,
    /// Subreddits for community searches, focus for web searches.
    pub target: Option<String>,
}

impl SearchIntent {
    /// Converts the intent into a tool call with a synthesized `search_{n}` id.
    pub fn into_tool_call(self, ordinal: usize) -> ToolCall {
        let arguments = match self.kind {
            SearchKind::Community => {
                let subreddits = self
                    .target
                    .as_deref()
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>();
                json!({ "query": self.query, "subreddits": subreddits })
            }
            SearchKind::Web => match self.target {
                Some(focus) => json!({ "query": self.query, "focus": focus }),
                None => json!({ "query": self.query }),
            },
        };

        ToolCall {
            id: format!("search_{ordinal}"),
            name: self.kind.tool_name().to_string(),
            arguments: arguments.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCompletion {
    /// Text before the sentinel, or the whole completion when there is none.
    pub preamble: String,
    pub sentinel_found: bool,
    pub intents: Vec<SearchIntent>,
}

impl ParsedCompletion {
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.intents
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, intent)| intent.into_tool_call(index + 1))
            .collect()
    }
}

pub fn parse_completion(text: &str) -> ParsedCompletion {
    let mut preamble = Vec::new();
    let mut intents = Vec::new();
    let mut sentinel_found = false;

    for line in text.lines() {
        if !sentinel_found {
            match find_sentinel(line) {
                Some(index) => {
                    sentinel_found = true;
                    preamble.push(&line[..index]);
                    let rest = line[index + SEARCH_SENTINEL.len()..]
                        .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
                    intents.extend(parse_intent_line(rest));
                }
                None => preamble.push(line),
            }
            continue;
        }

        intents.extend(parse_intent_line(line));
    }

    ParsedCompletion {
        preamble: preamble.join("\n").trim().to_string(),
        sentinel_found,
        intents,
    }
}

fn find_sentinel(line: &str) -> Option<usize> {
    line.to_ascii_uppercase().find(SEARCH_SENTINEL)
}

fn parse_intent_line(line: &str) -> Option<SearchIntent> {
    let line = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•') || c.is_ascii_digit())
        .trim_start_matches(['.', ')'])
        .trim();
    let (tag, rest) = line.split_once(':')?;
    let kind = SearchKind::from_tag(tag)?;

    let (query, target) = match rest.split_once('|') {
        Some((query, target)) => (query, Some(target)),
        None => (rest, None),
    };

    let query = unquote(query);
    if query.is_empty() {
        return None;
    }

    let target = target
        .map(unquote)
        .filter(|target| !target.is_empty());

    Some(SearchIntent {
        kind,
        query,
        target,
    })
}

fn unquote(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// Instructions appended to the system prompt for text-only providers.
pub fn protocol_instructions(tools: &[ToolDefinition]) -> Option<String> {
    let mut formats = Vec::new();
    if tools.iter().any(|tool| tool.name == COMMUNITY_TOOL) {
        formats.push("REDDIT: <search query> | <optional comma-separated subreddits>");
    }
    if tools.iter().any(|tool| tool.name == WEB_TOOL) {
        formats.push("WEB: <search query> | <optional focus: reviews, menu, location, or general>");
    }
    if formats.is_empty() {
        return None;
    }

    Some(format!(
        "To run a search, reply with a line containing only {SEARCH_SENTINEL} followed by one \
         search per line in this format:\n{}\nRequest at most three searches. If you can answer \
         without searching, answer directly and do not mention {SEARCH_SENTINEL}.",
        formats.join("\n")
    ))
}
