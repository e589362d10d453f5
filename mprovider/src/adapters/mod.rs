#[cfg(any(feature = "provider-openai", feature = "provider-perplexity"))]
pub mod openai;
#[cfg(feature = "provider-perplexity")]
pub mod perplexity;
