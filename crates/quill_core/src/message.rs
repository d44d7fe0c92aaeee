//! Conversation messages sent to a content generator.

use serde::{Deserialize, Serialize};

/// Roles are the same for every generator backend.
///
/// # Examples
///
/// ```
/// use quill_core::Role;
///
/// assert_eq!(format!("{}", Role::System), "System");
/// assert_ne!(Role::User, Role::Assistant);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// Standing instructions
    System,
    /// The pipeline's request
    User,
    /// Prior generator output
    Assistant,
}

/// A single text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}
