//! Search collaborators for restaurant research.
//!
//! Two contracts, [`CommunitySearch`] and [`WebSearch`], back the
//! `search_community` and `search_web` tools. Reddit and Brave Search
//! clients implement them over HTTP; tests and alternative backends can
//! plug in any other implementation.
//!
//! ```rust
//! use mtooling::ToolRegistry;
//! use msearch::register_search_tools;
//!
//! let mut registry = ToolRegistry::new();
//! register_search_tools(&mut registry, None, None);
//! assert!(registry.is_empty());
//! ```

mod brave;
mod collaborator;
mod error;
mod http;
mod reddit;
mod tools;
mod types;

pub use brave::{BRAVE_SEARCH_URL, BraveSearchClient};
pub use collaborator::{CommunitySearch, SearchFuture, WebSearch};
pub use error::{SearchError, SearchErrorKind};
pub use reddit::{
    DEFAULT_SUBREDDITS, REDDIT_API_URL, REDDIT_AUTH_URL, RedditCredentials, RedditSearchClient,
};
pub use tools::{
    CommunitySearchTool, SEARCH_COMMUNITY, SEARCH_WEB, WebSearchTool, register_search_tools,
};
pub use types::{SearchHit, SearchOutcome, WebFocus};
