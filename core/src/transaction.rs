//! Per-call transaction context

use crate::attributes::{AttributeSet, SourceLocation};
use serde_json::Value;

/// Everything an operation needs to describe one transaction event
///
/// Only the type and status are required. An absent `transaction_msg` selects
/// the default message of the operation it is passed to (`"AUDIT: "`,
/// `"Trip Circuit Breaker: "`, ...). `content` defaults to `null`.
///
/// ```rust
/// use eframework::{ProgressStage, SourceLocation, Transaction};
///
/// let tx = Transaction::new("ORDER_CREATE", ProgressStage::Validate)
///     .message("order rejected")
///     .attribute("orderId", "42")
///     .content(serde_json::json!({"id": 42}))
///     .location(SourceLocation::new("orderFlow").with_line_number(12));
///
/// assert_eq!(tx.transaction_status, "VALIDATE");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub transaction_type: String,
    pub transaction_status: String,
    pub transaction_msg: Option<String>,
    pub attributes: Option<AttributeSet>,
    pub content: Value,
    pub location: Option<SourceLocation>,
}

impl Transaction {
    pub fn new(transaction_type: impl Into<String>, transaction_status: impl Into<String>) -> Self {
        Self {
            transaction_type: transaction_type.into(),
            transaction_status: transaction_status.into(),
            ..Default::default()
        }
    }

    /// Replace the operation's default message
    pub fn message(mut self, transaction_msg: impl Into<String>) -> Self {
        self.transaction_msg = Some(transaction_msg.into());
        self
    }

    /// Replace the caller attributes
    pub fn attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Add one caller attribute
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(AttributeSet::new)
            .insert(key, value);
        self
    }

    pub fn content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    pub fn location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// The caller's message, or `default` when none was given
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.transaction_msg.as_deref().unwrap_or(default)
    }
}
