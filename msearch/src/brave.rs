//! Brave Search web client.

use mcommon::Deadline;
use mprovider::SecretString;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::bounded;
use crate::{SearchError, SearchFuture, SearchHit, SearchOutcome, WebFocus, WebSearch};

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

const SERVICE: &str = "Brave Search";

#[derive(Debug)]
pub struct BraveSearchClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
    count: u32,
}

impl BraveSearchClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: SecretString::new(api_key),
            endpoint: BRAVE_SEARCH_URL.to_string(),
            count: 8,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.clamp(1, 20);
        self
    }

    async fn search(
        &self,
        query: &str,
        focus: WebFocus,
        deadline: Option<Deadline>,
    ) -> Result<SearchOutcome, SearchError> {
        let focused = focus.apply(query);
        let count = self.count.to_string();
        debug!(service = SERVICE, focus = %focus, query = %focused, "searching the web");

        let builder = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", self.api_key.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", focused.as_str()), ("count", count.as_str())]);

        let response = bounded(builder, deadline, SERVICE)?
            .send()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(service = SERVICE, status, "web search rejected");
            return Err(SearchError::from_status(SERVICE, status));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|err| SearchError::from_reqwest(SERVICE, err))?;

        let hits = body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|result| !result.url.trim().is_empty())
            .map(BraveResult::into_hit)
            .collect();

        Ok(SearchOutcome::new(focused, hits))
    }
}

impl WebSearch for BraveSearchClient {
    fn search_web<'a>(
        &'a self,
        query: &'a str,
        focus: WebFocus,
        deadline: Option<Deadline>,
    ) -> SearchFuture<'a> {
        Box::pin(self.search(query, focus, deadline))
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    profile: Option<BraveProfile>,
}

#[derive(Debug, Deserialize)]
struct BraveProfile {
    name: Option<String>,
}

impl BraveResult {
    fn into_hit(self) -> SearchHit {
        let source = self.url.clone();
        let mut hit = SearchHit::new(self.title, self.url, source).with_snippet(self.description);
        if let Some(name) = self.profile.and_then(|profile| profile.name) {
            hit = hit.with_origin(name);
        }
        hit
    }
}
