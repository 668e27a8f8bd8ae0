//! Request and response types for arbitration calls.

use crate::Message;
use serde::{Deserialize, Serialize};

/// A completion request sent to the arbitration provider.
///
/// # Examples
///
/// ```
/// use tessera_core::{CompletionRequest, Message};
///
/// let request = CompletionRequest {
///     messages: vec![Message::user("A, B, merge, or unsure?")],
///     max_tokens: Some(100),
///     temperature: Some(0.0),
/// };
///
/// assert_eq!(request.messages.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// The provider's completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub content: String,
}
