use std::sync::{Arc, Mutex};

use mcommon::Deadline;
use mprovider::ToolCall;
use msearch::{
    CommunitySearch, SEARCH_COMMUNITY, SEARCH_WEB, SearchError, SearchFuture, SearchHit,
    SearchOutcome, WebFocus, WebSearch, register_search_tools,
};
use mtooling::{
    DefaultToolRuntime, ToolErrorKind, ToolExecutionContext, ToolOutcome, ToolRegistry,
    ToolRuntime,
};

#[derive(Default)]
struct FakeCommunity {
    calls: Mutex<Vec<(String, Vec<String>, bool)>>,
}

impl CommunitySearch for FakeCommunity {
    fn search_community<'a>(
        &'a self,
        query: &'a str,
        subreddits: &'a [String],
        deadline: Option<Deadline>,
    ) -> SearchFuture<'a> {
        Box::pin(async move {
            self.calls.lock().expect("calls lock").push((
                query.to_string(),
                subreddits.to_vec(),
                deadline.is_some(),
            ));
            Ok(SearchOutcome::new(
                query,
                vec![SearchHit::new(
                    "Lucali appreciation thread",
                    "https://www.reddit.com/r/FoodNYC/1",
                    "r/FoodNYC: Lucali appreciation thread",
                )],
            ))
        })
    }
}

#[derive(Default)]
struct FailingWeb {
    focuses: Mutex<Vec<WebFocus>>,
}

impl WebSearch for FailingWeb {
    fn search_web<'a>(
        &'a self,
        _query: &'a str,
        focus: WebFocus,
        _deadline: Option<Deadline>,
    ) -> SearchFuture<'a> {
        Box::pin(async move {
            self.focuses.lock().expect("focus lock").push(focus);
            Err(SearchError::rate_limited("Brave Search returned status 429"))
        })
    }
}

fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

#[tokio::test]
async fn community_tool_passes_arguments_and_reports_sources() {
    let community = Arc::new(FakeCommunity::default());
    let mut registry = ToolRegistry::new();
    let shared: Arc<dyn CommunitySearch> = community.clone();
    register_search_tools(&mut registry, Some(shared), None);
    let runtime = DefaultToolRuntime::new(Arc::new(registry));

    let result = runtime
        .execute(
            call(
                "call_1",
                SEARCH_COMMUNITY,
                r#"{"query":"pizza brooklyn","subreddits":["r/FoodNYC","Brooklyn"]}"#,
            ),
            ToolExecutionContext::new("req-1"),
        )
        .await;

    assert_eq!(result.outcome, ToolOutcome::Success);
    assert_eq!(
        result.sources,
        vec!["r/FoodNYC: Lucali appreciation thread".to_string()]
    );
    assert_eq!(result.payload["query"], "pizza brooklyn");

    let calls = community.calls.lock().expect("calls lock").clone();
    assert_eq!(
        calls,
        vec![(
            "pizza brooklyn".to_string(),
            vec!["FoodNYC".to_string(), "Brooklyn".to_string()],
            true
        )]
    );
}

#[tokio::test]
async fn web_tool_failures_become_fallback_results() {
    let web = Arc::new(FailingWeb::default());
    let mut registry = ToolRegistry::new();
    let shared: Arc<dyn WebSearch> = web.clone();
    register_search_tools(&mut registry, None, Some(shared));
    let runtime = DefaultToolRuntime::new(Arc::new(registry));

    let result = runtime
        .execute(
            call("call_2", SEARCH_WEB, r#"{"query":"lucali","focus":"menu"}"#),
            ToolExecutionContext::new("req-2"),
        )
        .await;

    assert_eq!(
        result.outcome,
        ToolOutcome::Failed(ToolErrorKind::Unavailable)
    );
    assert!(result.sources.is_empty());
    assert_eq!(
        result.payload["fallback"],
        "I'm having trouble accessing web search right now…"
    );
    assert_eq!(
        web.focuses.lock().expect("focus lock").clone(),
        vec![WebFocus::Menu]
    );
}

#[test]
fn only_configured_collaborators_are_registered() {
    let mut registry = ToolRegistry::new();
    let community: Arc<dyn CommunitySearch> = Arc::new(FakeCommunity::default());
    register_search_tools(&mut registry, Some(community), None);
    assert_eq!(registry.names(), vec![SEARCH_COMMUNITY.to_string()]);

    let definition = &registry.definitions()[0];
    let schema: serde_json::Value =
        serde_json::from_str(&definition.input_schema).expect("schema is JSON");
    assert_eq!(schema["required"][0], "query");
}
