//! Best-effort routing of events to named handlers
//!
//! Instrumentation must never break the pipeline it observes, so `dispatch`
//! has no failure path: a missing handler is a warning, and a handler that
//! errors or panics is logged against the event's `transactionType`. This is
//! the only place in the crate where failures are swallowed.

use crate::attributes::{AttributeSet, SourceLocation, TRANSACTION_TYPE};
use crate::registry::ExtensionPointRegistry;
use crate::EventEnvelope;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, debug_span, error, warn};

/// What happened to a dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran and returned `Ok`
    Delivered,
    /// No handler is registered under the name; the event was dropped
    MissingHandler,
    /// The handler returned an error or panicked; the failure was logged
    HandlerFailed { reason: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// Routes envelopes to handlers resolved from an [`ExtensionPointRegistry`]
#[derive(Debug, Clone)]
pub struct FlowDispatcher {
    registry: Arc<dyn ExtensionPointRegistry>,
}

impl FlowDispatcher {
    pub fn new(registry: Arc<dyn ExtensionPointRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn ExtensionPointRegistry> {
        &self.registry
    }

    /// Deliver `attributes` and `content` to the handler named `handler_name`
    ///
    /// The handler runs synchronously on the calling thread. The outcome is
    /// informational; callers are free to ignore it.
    pub fn dispatch(
        &self,
        handler_name: &str,
        attributes: AttributeSet,
        content: Value,
        location: Option<&SourceLocation>,
    ) -> DispatchOutcome {
        let _span = debug_span!(
            "dispatch",
            handler = handler_name,
            flow = location.map(|l| l.container_name.as_str())
        )
        .entered();

        let Some(handler) = self.registry.lookup(handler_name) else {
            warn!(handler = handler_name, "{handler_name} does not exist");
            return DispatchOutcome::MissingHandler;
        };

        let transaction_type = attributes
            .get(TRANSACTION_TYPE)
            .unwrap_or_default()
            .to_string();
        let envelope = EventEnvelope::new(content, attributes);

        let reason = match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(envelope))) {
            Ok(Ok(())) => {
                debug!(handler = handler_name, transaction_type = %transaction_type, "Event delivered");
                return DispatchOutcome::Delivered;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        error!(
            handler = handler_name,
            transaction_type = %transaction_type,
            error = %reason,
            "Error during {transaction_type}"
        );
        DispatchOutcome::HandlerFailed { reason }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
