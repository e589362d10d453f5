//! Search results shared by every collaborator.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

/// One search hit as shown to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Subreddit or site the hit came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    /// Citation identifier surfaced to the end user.
    #[serde(skip)]
    pub source: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: None,
            origin: None,
            score: None,
            comments: None,
            source: source.into(),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        if !snippet.trim().is_empty() {
            self.snippet = Some(snippet);
        }
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<SearchHit>,
}

impl SearchOutcome {
    pub fn new(query: impl Into<String>, results: Vec<SearchHit>) -> Self {
        Self {
            query: query.into(),
            results,
        }
    }

    /// Source identifiers in result order.
    pub fn sources(&self) -> Vec<String> {
        self.results.iter().map(|hit| hit.source.clone()).collect()
    }
}

/// Hint narrowing a web search toward one kind of page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebFocus {
    Reviews,
    Menu,
    Location,
    #[default]
    General,
}

impl WebFocus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Menu => "menu",
            Self::Location => "location",
            Self::General => "general",
        }
    }

    pub fn query_suffix(self) -> Option<&'static str> {
        match self {
            Self::Reviews => Some("reviews"),
            Self::Menu => Some("menu"),
            Self::Location => Some("location hours"),
            Self::General => None,
        }
    }

    /// Appends the focus suffix to `query` unless it is already there.
    pub fn apply(self, query: &str) -> String {
        match self.query_suffix() {
            Some(suffix) if !query.to_ascii_lowercase().contains(suffix) => {
                format!("{query} {suffix}")
            }
            _ => query.to_string(),
        }
    }

    /// Unknown hints degrade to [`WebFocus::General`].
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl Display for WebFocus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebFocus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reviews" | "review" => Ok(Self::Reviews),
            "menu" | "menus" => Ok(Self::Menu),
            "location" | "hours" | "address" => Ok(Self::Location),
            "general" | "" => Ok(Self::General),
            other => Err(format!("unknown web focus '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_parsing_is_lenient() {
        assert_eq!(WebFocus::parse_lenient("Reviews"), WebFocus::Reviews);
        assert_eq!(WebFocus::parse_lenient("hours"), WebFocus::Location);
        assert_eq!(WebFocus::parse_lenient("vibes"), WebFocus::General);
    }

    #[test]
    fn focus_suffix_is_not_duplicated() {
        assert_eq!(WebFocus::Reviews.apply("lucali"), "lucali reviews");
        assert_eq!(WebFocus::Reviews.apply("lucali Reviews"), "lucali Reviews");
        assert_eq!(WebFocus::Location.apply("lucali"), "lucali location hours");
        assert_eq!(WebFocus::General.apply("lucali"), "lucali");
    }

    #[test]
    fn sources_follow_result_order_and_are_not_serialized() {
        let outcome = SearchOutcome::new(
            "pizza",
            vec![
                SearchHit::new("Lucali", "https://a.example", "https://a.example"),
                SearchHit::new("Di Fara", "https://b.example", "https://b.example")
                    .with_snippet("  "),
            ],
        );

        assert_eq!(outcome.sources(), vec!["https://a.example", "https://b.example"]);
        let json = serde_json::to_value(&outcome).expect("outcome serializes");
        assert!(json["results"][0].get("source").is_none());
        assert!(json["results"][1].get("snippet").is_none());
    }
}
