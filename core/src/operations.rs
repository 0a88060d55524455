//! The operations entry point
//!
//! [`Eframework`] bundles the configuration and the dispatcher. The event
//! operations live in `emitter`, `payload` and `circuit`; this module holds
//! the attribute merges and the aggregate → format → dispatch pipeline they
//! all share.

use crate::attributes::{self, AttributeSet, PAYLOAD_TYPE, TRANSACTION_MSG};
use crate::builder::EframeworkBuilder;
use crate::config::Config;
use crate::dispatcher::{DispatchOutcome, FlowDispatcher};
use crate::errors::ConfigError;
use crate::registry::ExtensionPointRegistry;
use crate::transaction::Transaction;
use crate::EventKind;
use std::sync::Arc;

/// Transaction event operations bound to one application and registry
///
/// Stateless apart from its configuration: every call builds its own
/// attribute set, so one instance can be shared across threads behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct Eframework {
    config: Config,
    dispatcher: FlowDispatcher,
}

impl Eframework {
    /// Create the operations from a validated configuration
    pub fn new(
        config: Config,
        registry: Arc<dyn ExtensionPointRegistry>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            dispatcher: FlowDispatcher::new(registry),
        })
    }

    /// Create a new builder
    pub fn builder(application_id: impl Into<String>) -> EframeworkBuilder {
        EframeworkBuilder::new(application_id)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn application_id(&self) -> &str {
        &self.config.application_id
    }

    pub fn dispatcher(&self) -> &FlowDispatcher {
        &self.dispatcher
    }

    /// Copy `existing` and set `key`; see [`attributes::put`]
    pub fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        existing: Option<&AttributeSet>,
    ) -> AttributeSet {
        attributes::put(key, value, existing)
    }

    /// Copy `existing` and overwrite it with `new_entries`; see [`attributes::put_all`]
    pub fn put_all(&self, new_entries: &AttributeSet, existing: Option<&AttributeSet>) -> AttributeSet {
        attributes::put_all(new_entries, existing)
    }

    /// Aggregate the attribute set for `transaction`, using `default_msg`
    /// when the transaction carries no message of its own
    pub fn build_attributes(&self, transaction: &Transaction, default_msg: &str) -> AttributeSet {
        attributes::aggregate(
            &transaction.transaction_type,
            &transaction.transaction_status,
            transaction.message_or(default_msg),
            transaction.attributes.as_ref(),
            transaction.location.as_ref(),
            self.application_id(),
        )
    }

    /// Build, tag and dispatch one event of `kind`
    ///
    /// Returns the formatted `transactionMsg` along with the dispatch outcome.
    pub(crate) fn emit(&self, kind: EventKind, transaction: Transaction) -> (String, DispatchOutcome) {
        let mut attributes = self.build_attributes(&transaction, kind.default_message());
        if let Some(payload_type) = kind.payload_type() {
            attributes.insert(PAYLOAD_TYPE, payload_type);
        }

        let message = attributes
            .get(TRANSACTION_MSG)
            .unwrap_or_default()
            .to_string();

        let Transaction {
            content, location, ..
        } = transaction;
        let outcome = self.dispatcher.dispatch(
            kind.flow_name(),
            attributes,
            content,
            location.as_ref(),
        );
        (message, outcome)
    }
}
