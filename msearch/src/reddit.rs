//! Reddit search over app-only OAuth.
//!
//! The client exchanges its credentials for a bearer token with the
//! client-credentials grant, caches the token until shortly before it
//! expires, and searches a set of food subreddits.

use std::time::Duration;

use mcommon::{Deadline, TokenCache};
use mprovider::SecretString;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::bounded;
use crate::{CommunitySearch, SearchError, SearchFuture, SearchHit, SearchOutcome};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const REDDIT_API_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_SUBREDDITS: [&str; 3] = ["food", "restaurants", "FoodLosAngeles"];

const SERVICE: &str = "Reddit";
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const SNIPPET_CHARS: usize = 280;

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret),
            user_agent: user_agent.into(),
        }
    }
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug)]
pub struct RedditSearchClient {
    client: Client,
    credentials: RedditCredentials,
    token: TokenCache<SecretString>,
    auth_url: String,
    api_url: String,
    default_subreddits: Vec<String>,
    limit: u32,
}

impl RedditSearchClient {
    pub fn new(client: Client, credentials: RedditCredentials) -> Self {
        Self {
            client,
            credentials,
            token: TokenCache::new(TOKEN_REFRESH_MARGIN),
            auth_url: REDDIT_AUTH_URL.to_string(),
            api_url: REDDIT_API_URL.to_string(),
            default_subreddits: DEFAULT_SUBREDDITS.iter().map(ToString::to_string).collect(),
            limit: 8,
        }
    }

    pub fn with_endpoints(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    pub fn with_default_subreddits(mut self, subreddits: Vec<String>) -> Self {
        self.default_subreddits = subreddits;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    async fn access_token(&self, deadline: Option<Deadline>) -> Result<SecretString, SearchError> {
        self.token
            .get_or_refresh(|| self.fetch_token(deadline))
            .await
    }

    async fn fetch_token(
        &self,
        deadline: Option<Deadline>,
    ) -> Result<(SecretString, Duration), SearchError> {
        debug!(service = SERVICE, event = "token_refresh", "requesting Reddit access token");

        let builder = self
            .client
            .post(&self.auth_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose()),
            )
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .form(&[("grant_type", "client_credentials")]);

        let response = bounded(builder, deadline, SERVICE)?
            .send()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(service = SERVICE, status, "Reddit token request rejected");
            return Err(SearchError::from_status(SERVICE, status));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        if token.access_token.trim().is_empty() {
            return Err(SearchError::invalid_response(
                "Reddit token response carried no access token",
            ));
        }

        Ok((
            SecretString::new(token.access_token),
            Duration::from_secs(token.expires_in.unwrap_or(3600)),
        ))
    }

    fn subreddit_path(&self, subreddits: &[String]) -> String {
        let chosen = if subreddits.is_empty() {
            &self.default_subreddits
        } else {
            subreddits
        };

        chosen
            .iter()
            .map(|name| name.trim().trim_start_matches("r/"))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join("+")
    }

    async fn search(
        &self,
        query: &str,
        subreddits: &[String],
        deadline: Option<Deadline>,
    ) -> Result<SearchOutcome, SearchError> {
        let token = self.access_token(deadline).await?;
        let path = self.subreddit_path(subreddits);
        let url = format!("{}/r/{path}/search", self.api_url.trim_end_matches('/'));
        let limit = self.limit.to_string();

        debug!(service = SERVICE, subreddits = %path, query, "searching Reddit");

        let builder = self
            .client
            .get(url)
            .bearer_auth(token.expose())
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .query(&[
                ("q", query),
                ("restrict_sr", "1"),
                ("sort", "relevance"),
                ("t", "year"),
                ("limit", limit.as_str()),
            ]);

        let response = bounded(builder, deadline, SERVICE)?
            .send()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        let status = response.status().as_u16();
        if status == 401 {
            // Token was revoked or expired early; the next call fetches a new one.
            self.token.invalidate();
        }
        if !response.status().is_success() {
            warn!(service = SERVICE, status, "Reddit search rejected");
            return Err(SearchError::from_status(SERVICE, status));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        let hits = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_hit())
            .collect();

        Ok(SearchOutcome::new(query, hits))
    }
}

impl CommunitySearch for RedditSearchClient {
    fn search_community<'a>(
        &'a self,
        query: &'a str,
        subreddits: &'a [String],
        deadline: Option<Deadline>,
    ) -> SearchFuture<'a> {
        Box::pin(self.search(query, subreddits, deadline))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    permalink: String,
    #[serde(default)]
    selftext: String,
}

impl RedditPost {
    fn into_hit(self) -> SearchHit {
        let source = format!("r/{}: {}", self.subreddit, self.title);
        let url = format!("https://www.reddit.com{}", self.permalink);
        let snippet = self.selftext.chars().take(SNIPPET_CHARS).collect::<String>();

        let mut hit = SearchHit::new(self.title, url, source)
            .with_snippet(snippet)
            .with_origin(format!("r/{}", self.subreddit));
        hit.score = Some(self.score);
        hit.comments = Some(self.num_comments);
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RedditSearchClient {
        RedditSearchClient::new(
            Client::new(),
            RedditCredentials::new("id", "secret", "morsel-test/0.1"),
        )
    }

    #[test]
    fn subreddit_path_uses_defaults_and_strips_prefixes() {
        let client = client();
        assert_eq!(client.subreddit_path(&[]), "food+restaurants+FoodLosAngeles");
        assert_eq!(
            client.subreddit_path(&["r/FoodNYC".to_string(), " AskNYC ".to_string()]),
            "FoodNYC+AskNYC"
        );
    }

    #[test]
    fn posts_become_hits_with_subreddit_sources() {
        let post = RedditPost {
            title: "Best slice in Brooklyn?".to_string(),
            subreddit: "FoodNYC".to_string(),
            score: 412,
            num_comments: 88,
            permalink: "/r/FoodNYC/comments/abc/best_slice/".to_string(),
            selftext: String::new(),
        };

        let hit = post.into_hit();
        assert_eq!(hit.source, "r/FoodNYC: Best slice in Brooklyn?");
        assert_eq!(hit.url, "https://www.reddit.com/r/FoodNYC/comments/abc/best_slice/");
        assert_eq!(hit.snippet, None);
        assert_eq!(hit.score, Some(412));
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let rendered = format!("{:?}", RedditCredentials::new("id", "hunter2", "ua"));
        assert!(!rendered.contains("hunter2"));
    }
}
