//! Eframework - transaction event instrumentation for integration pipelines
//!
//! This crate lets pipeline stages emit structured transaction events and
//! signal circuit breaker activity to handlers owned by the host pipeline:
//! - Canonical, key-ordered attribute sets built for every event
//! - Notification, error, retry and audit events
//! - Request/response payload logs
//! - Manual and automatic circuit breaker check/trip/reset signals
//! - Best-effort dispatch: a missing or failing handler never breaks the caller
//!
//! # Example
//!
//! ```rust
//! use eframework::{Eframework, MemoryRegistry, Transaction, flows};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(MemoryRegistry::new());
//! registry.register_fn(flows::AUDIT, |envelope| {
//!     println!("audit: {:?}", envelope.attributes.get("transactionMsg"));
//!     Ok(())
//! });
//!
//! let eframework = Eframework::builder("shop")
//!     .registry(registry)
//!     .build()
//!     .expect("valid configuration");
//!
//! eframework.emit_audit(Transaction::new("ORDER_CREATE", "SUCCESS").attribute("orderId", "42"));
//!
//! // A tripped breaker reports itself as an error after signaling the trip flow
//! let tripped = eframework.circuit_breaker_trip(Transaction::new("ORDER_CREATE", "FAILURE"));
//! assert!(tripped.is_err());
//! ```

pub mod attributes;
pub mod board;
pub mod builder;
pub mod callbacks;
pub mod circuit;
pub mod config;
pub mod dispatcher;
pub mod emitter;
pub mod errors;
pub mod logging;
pub mod message;
pub mod operations;
pub mod payload;
pub mod registry;
pub mod stage;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_support;

pub use attributes::{AttributeSet, SourceLocation, aggregate, put, put_all};
pub use board::{BreakerBoard, BreakerMode, BreakerState};
pub use builder::EframeworkBuilder;
pub use config::Config;
pub use dispatcher::{DispatchOutcome, FlowDispatcher};
pub use errors::{CircuitBreakerOpen, ConfigError, HandlerError};
pub use message::format_message;
pub use operations::Eframework;
pub use registry::{ExtensionPointRegistry, FnHandler, Handler, MemoryRegistry, NullRegistry};
pub use stage::ProgressStage;
pub use transaction::Transaction;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handler names the operations dispatch to
pub mod flows {
    pub const NOTIFICATION: &str = "notificationFlow";
    pub const ERROR: &str = "errorTransactionFlow";
    pub const RETRY: &str = "retryTransactionFlow";
    pub const AUDIT: &str = "auditLogFlow";
    pub const REQUEST_PAYLOAD: &str = "requestPayloadLogFlow";
    pub const RESPONSE_PAYLOAD: &str = "responsePayloadLogFlow";
    pub const CIRCUIT_BREAKER_CHECK: &str = "circuitbreaker-check-breaker";
    pub const CIRCUIT_BREAKER_TRIP: &str = "circuitbreaker-trip";
    pub const CIRCUIT_BREAKER_RESET: &str = "circuitbreaker-reset";
    pub const AUTO_CIRCUIT_BREAKER_CHECK: &str = "circuitbreaker-auto-check-breaker";
    pub const AUTO_CIRCUIT_BREAKER_TRIP: &str = "circuitbreaker-auto-trip";
    pub const AUTO_CIRCUIT_BREAKER_RESET: &str = "circuitbreaker-auto-reset";
}

/// Kinds of dispatched transaction event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Notification,
    Error,
    Retry,
    Audit,
    RequestPayload,
    ResponsePayload,
    CircuitBreakerCheck,
    CircuitBreakerTrip,
    CircuitBreakerReset,
    AutoCircuitBreakerCheck,
    AutoCircuitBreakerTrip,
    AutoCircuitBreakerReset,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::Notification,
        EventKind::Error,
        EventKind::Retry,
        EventKind::Audit,
        EventKind::RequestPayload,
        EventKind::ResponsePayload,
        EventKind::CircuitBreakerCheck,
        EventKind::CircuitBreakerTrip,
        EventKind::CircuitBreakerReset,
        EventKind::AutoCircuitBreakerCheck,
        EventKind::AutoCircuitBreakerTrip,
        EventKind::AutoCircuitBreakerReset,
    ];

    /// Handler this kind is dispatched to
    pub fn flow_name(self) -> &'static str {
        match self {
            EventKind::Notification => flows::NOTIFICATION,
            EventKind::Error => flows::ERROR,
            EventKind::Retry => flows::RETRY,
            EventKind::Audit => flows::AUDIT,
            EventKind::RequestPayload => flows::REQUEST_PAYLOAD,
            EventKind::ResponsePayload => flows::RESPONSE_PAYLOAD,
            EventKind::CircuitBreakerCheck => flows::CIRCUIT_BREAKER_CHECK,
            EventKind::CircuitBreakerTrip => flows::CIRCUIT_BREAKER_TRIP,
            EventKind::CircuitBreakerReset => flows::CIRCUIT_BREAKER_RESET,
            EventKind::AutoCircuitBreakerCheck => flows::AUTO_CIRCUIT_BREAKER_CHECK,
            EventKind::AutoCircuitBreakerTrip => flows::AUTO_CIRCUIT_BREAKER_TRIP,
            EventKind::AutoCircuitBreakerReset => flows::AUTO_CIRCUIT_BREAKER_RESET,
        }
    }

    /// Message used when the caller supplies none
    pub fn default_message(self) -> &'static str {
        match self {
            EventKind::Notification => "NOTIFICATION: ",
            EventKind::Error => "ERROR: ",
            EventKind::Retry => "RETRY: ",
            EventKind::Audit => "AUDIT: ",
            EventKind::RequestPayload => "REQUEST Payload: ",
            EventKind::ResponsePayload => "RESPONSE Payload: ",
            EventKind::CircuitBreakerCheck => "Check Circuit Breaker: ",
            EventKind::CircuitBreakerTrip => "Trip Circuit Breaker: ",
            EventKind::CircuitBreakerReset => "Reset Circuit Breaker: ",
            EventKind::AutoCircuitBreakerCheck => "Check Auto Circuit Breaker: ",
            EventKind::AutoCircuitBreakerTrip => "Trip Auto Circuit Breaker: ",
            EventKind::AutoCircuitBreakerReset => "Reset Auto Circuit Breaker: ",
        }
    }

    /// `payloadType` tag added after aggregation, for payload logs only
    pub fn payload_type(self) -> Option<&'static str> {
        match self {
            EventKind::RequestPayload => Some("REQUEST"),
            EventKind::ResponsePayload => Some("RESPONSE"),
            _ => None,
        }
    }
}

/// Unit handed to a handler: the caller's payload plus the event attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub content: Value,
    pub attributes: AttributeSet,
}

impl EventEnvelope {
    pub fn new(content: Value, attributes: AttributeSet) -> Self {
        Self {
            content,
            attributes,
        }
    }

    /// `transactionType` of the event, if the attributes carry one
    pub fn transaction_type(&self) -> Option<&str> {
        self.attributes.get(attributes::TRANSACTION_TYPE)
    }

    /// Formatted `transactionMsg` of the event
    pub fn transaction_msg(&self) -> Option<&str> {
        self.attributes.get(attributes::TRANSACTION_MSG)
    }
}
