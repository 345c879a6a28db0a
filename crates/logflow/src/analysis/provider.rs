//! Analysis service boundary.
//!
//! Anything that can turn a prompt into free text can act as the analysis
//! service; the extractor never assumes the text is well-formed.

use async_trait::async_trait;

use crate::error::AnalysisError;

/// Trait for text-completion services.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs (e.g., "gemini").
    fn name(&self) -> &'static str;

    /// Check if the provider has a credential configured.
    fn is_configured(&self) -> bool;

    /// Send a single prompt and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}
