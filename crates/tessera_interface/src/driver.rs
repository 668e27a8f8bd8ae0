//! Trait definition for arbitration providers.

use async_trait::async_trait;
use tessera_core::{CompletionRequest, CompletionResponse};
use tessera_error::TesseraResult;

/// Core trait that all arbitration providers must implement.
///
/// This is the only external collaborator the reconciliation engine suspends
/// on. Implementations wrap a concrete LLM client; the engine never touches
/// transport details.
#[async_trait]
pub trait ArbiterDriver: Send + Sync {
    /// Generate a completion for an arbitration query.
    async fn complete(&self, req: &CompletionRequest) -> TesseraResult<CompletionResponse>;

    /// Provider name (e.g., "anthropic", "openai", "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "claude-3-5-sonnet-20241022").
    fn model_name(&self) -> &str;
}
