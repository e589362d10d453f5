//! Collaborator contracts the search tools depend on.

use mcommon::{BoxFuture, Deadline};

use crate::{SearchError, SearchOutcome, WebFocus};

pub type SearchFuture<'a> = BoxFuture<'a, Result<SearchOutcome, SearchError>>;

/// Searches community discussion threads.
pub trait CommunitySearch: Send + Sync {
    /// An empty `subreddits` slice means the client's default set.
    fn search_community<'a>(
        &'a self,
        query: &'a str,
        subreddits: &'a [String],
        deadline: Option<Deadline>,
    ) -> SearchFuture<'a>;
}

pub trait WebSearch: Send + Sync {
    fn search_web<'a>(
        &'a self,
        query: &'a str,
        focus: WebFocus,
        deadline: Option<Deadline>,
    ) -> SearchFuture<'a>;
}
