//! Message roles for arbitration conversations.

use serde::{Deserialize, Serialize};

/// The role of a message sender in an arbitration conversation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// System framing for the arbitration task
    System,
    /// The engine's query
    User,
    /// The provider's answer
    Assistant,
}
