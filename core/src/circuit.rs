//! Circuit breaker signaling
//!
//! These operations hold no breaker state. Each call builds a fresh attribute
//! set and signals check, trip or reset to the handler registered for it; the
//! handler owns the CLOSED/OPEN state machine (see [`BreakerBoard`] for an
//! in-memory one). The only decision made here is whether a trip also
//! returns [`CircuitBreakerOpen`] to the caller.
//!
//! [`BreakerBoard`]: crate::BreakerBoard

use crate::{
    EventKind,
    attributes::TRANSACTION_MSG,
    errors::CircuitBreakerOpen,
    operations::Eframework,
    transaction::Transaction,
};
use tracing::debug;

/// Default message for [`Eframework::raise_circuit_breaker_open_error`]
pub const OPEN_ERROR_MESSAGE: &str = "Circuit Breaker Open Error: ";

impl Eframework {
    /// Signal a manual breaker check to `circuitbreaker-check-breaker`
    ///
    /// Never fails; the handler decides what a check means.
    pub fn circuit_breaker_check(&self, transaction: Transaction) {
        self.emit(EventKind::CircuitBreakerCheck, transaction);
    }

    /// Signal a manual trip and return [`CircuitBreakerOpen`]
    pub fn circuit_breaker_trip(&self, transaction: Transaction) -> Result<(), CircuitBreakerOpen> {
        self.circuit_breaker_trip_with(transaction, true)
    }

    /// Signal a manual trip to `circuitbreaker-trip`
    ///
    /// The trip is always dispatched first. With `throw_error` the call then
    /// fails with [`CircuitBreakerOpen`] carrying the formatted message.
    pub fn circuit_breaker_trip_with(
        &self,
        transaction: Transaction,
        throw_error: bool,
    ) -> Result<(), CircuitBreakerOpen> {
        self.trip(EventKind::CircuitBreakerTrip, transaction, throw_error)
    }

    /// Signal a manual reset to `circuitbreaker-reset`
    pub fn circuit_breaker_reset(&self, transaction: Transaction) {
        self.emit(EventKind::CircuitBreakerReset, transaction);
    }

    /// Signal an automatic breaker check to `circuitbreaker-auto-check-breaker`
    pub fn circuit_breaker_auto_check(&self, transaction: Transaction) {
        self.emit(EventKind::AutoCircuitBreakerCheck, transaction);
    }

    /// Signal an automatic trip and return [`CircuitBreakerOpen`]
    pub fn circuit_breaker_auto_trip(
        &self,
        transaction: Transaction,
    ) -> Result<(), CircuitBreakerOpen> {
        self.circuit_breaker_auto_trip_with(transaction, true)
    }

    /// Signal an automatic trip to `circuitbreaker-auto-trip`, failing when
    /// `throw_error` is set
    pub fn circuit_breaker_auto_trip_with(
        &self,
        transaction: Transaction,
        throw_error: bool,
    ) -> Result<(), CircuitBreakerOpen> {
        self.trip(EventKind::AutoCircuitBreakerTrip, transaction, throw_error)
    }

    /// Signal an automatic reset to `circuitbreaker-auto-reset`
    pub fn circuit_breaker_auto_reset(&self, transaction: Transaction) {
        self.emit(EventKind::AutoCircuitBreakerReset, transaction);
    }

    /// Fail with [`CircuitBreakerOpen`] without dispatching anything
    ///
    /// For callers that already know the breaker is open.
    pub fn raise_circuit_breaker_open_error(
        &self,
        transaction: Transaction,
    ) -> Result<(), CircuitBreakerOpen> {
        let attributes = self.build_attributes(&transaction, OPEN_ERROR_MESSAGE);
        let message = attributes.get(TRANSACTION_MSG).unwrap_or_default();
        Err(CircuitBreakerOpen::new(message))
    }

    fn trip(
        &self,
        kind: EventKind,
        transaction: Transaction,
        throw_error: bool,
    ) -> Result<(), CircuitBreakerOpen> {
        let transaction_type = transaction.transaction_type.clone();
        let (message, _) = self.emit(kind, transaction);

        if throw_error {
            debug!(transaction_type = %transaction_type, flow = kind.flow_name(), "Circuit breaker open");
            return Err(CircuitBreakerOpen::new(message));
        }
        Ok(())
    }
}
