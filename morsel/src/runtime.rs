//! Wiring from configuration to a ready [`ChatService`].

use std::sync::Arc;

use msearch::{
    BraveSearchClient, CommunitySearch, RedditCredentials, RedditSearchClient, WebSearch,
    register_search_tools,
};
use reqwest::Client;

use crate::config::MorselConfig;
use crate::providers::registry_from_config;
use crate::{
    ChatService, DefaultToolRuntime, ObservabilityHooks, ProviderError, ProviderOperationHooks,
    ProviderRegistry, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub chat: Arc<ChatService>,
    /// Names of the search tools that were configured.
    pub tool_names: Vec<String>,
}

impl std::fmt::Debug for RuntimeBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeBundle")
            .field("providers", &self.chat.available_provider_names())
            .field("tool_names", &self.tool_names)
            .finish()
    }
}

pub fn http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(concat!("morsel/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

/// Search tools for whichever collaborators have credentials.
pub fn search_tools(config: &MorselConfig, http: &Client) -> ToolRegistry {
    let community = config.reddit_credentials().map(|(client_id, secret)| {
        let credentials = RedditCredentials::new(client_id, secret, config.reddit.user_agent.clone());
        let mut client = RedditSearchClient::new(http.clone(), credentials);
        if !config.reddit.subreddits.is_empty() {
            client = client.with_default_subreddits(config.reddit.subreddits.clone());
        }
        Arc::new(client) as Arc<dyn CommunitySearch>
    });

    let web = config.brave.api_key.as_deref().map(|api_key| {
        Arc::new(BraveSearchClient::new(http.clone(), api_key)) as Arc<dyn WebSearch>
    });

    let mut registry = ToolRegistry::new();
    register_search_tools(&mut registry, community, web);
    registry
}

pub fn build_runtime(config: &MorselConfig) -> Result<RuntimeBundle, ProviderError> {
    let http = http_client()?;
    let providers = registry_from_config(config, &http);
    Ok(build_runtime_with(config, providers, search_tools(config, &http)))
}

/// Assembles the service around an explicit provider and tool registry.
pub fn build_runtime_with(
    config: &MorselConfig,
    providers: ProviderRegistry,
    tools: ToolRegistry,
) -> RuntimeBundle {
    let hooks = Arc::new(ObservabilityHooks::new());
    let tool_names = tools.names();

    let tool_hooks: Arc<dyn ToolRuntimeHooks> = hooks.clone();
    let tool_runtime: Arc<dyn ToolRuntime> = Arc::new(
        DefaultToolRuntime::new(Arc::new(tools))
            .with_hooks(tool_hooks)
            .with_timeout(config.tool_timeout()),
    );

    let provider_hooks: Arc<dyn ProviderOperationHooks> = hooks;
    let chat = ChatService::builder(Arc::new(providers))
        .tool_runtime(tool_runtime)
        .hooks(provider_hooks)
        .provider_timeout(config.provider_timeout())
        .build();

    RuntimeBundle {
        chat: Arc::new(chat),
        tool_names,
    }
}
