//! In-memory breaker state owned on the handler side
//!
//! The circuit breaker operations only signal; something registered under the
//! `circuitbreaker-*` flow names has to keep the state. `BreakerBoard` is that
//! something for hosts without their own: one CLOSED/OPEN machine per
//! `(mode, transactionType)`, driven by the dispatched events.
//!
//! ```text
//! CLOSED --trip--> OPEN
//! OPEN --reset--> CLOSED
//! ```
//!
//! Trips and resets that do not change the state are accepted and ignored.
//! There is no timing policy: a circuit stays open until a reset arrives.

use crate::callbacks::Callbacks;
use crate::errors::HandlerError;
use crate::registry::{Handler, MemoryRegistry};
use crate::{EventEnvelope, flows};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Which operation family drives a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BreakerMode {
    /// `circuitbreaker-check-breaker`, `circuitbreaker-trip`, `circuitbreaker-reset`
    Manual,
    /// `circuitbreaker-auto-*`
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BreakerState {
    #[default]
    Closed,
    Open,
}

impl BreakerState {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPEN",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct CircuitRecord {
    state: BreakerState,
    checks: usize,
    trips: usize,
    last_message: Option<String>,
}

/// Snapshot of one circuit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitStatus {
    pub mode: BreakerMode,
    pub name: String,
    pub state: BreakerState,
    pub checks: usize,
    pub trips: usize,
    /// `transactionMsg` of the last event that reached this circuit
    pub last_message: Option<String>,
}

/// Thread-safe CLOSED/OPEN state for every circuit seen so far
#[derive(Debug, Default)]
pub struct BreakerBoard {
    circuits: RwLock<HashMap<(BreakerMode, String), CircuitRecord>>,
    callbacks: Callbacks,
}

impl BreakerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set callback for when a circuit opens
    ///
    /// Callbacks run after the board lock is released. A trip and a reset
    /// racing on the same circuit from different threads may therefore
    /// deliver `on_close` before `on_open`; query [`state`](Self::state) when
    /// the current state matters. Calls from a single thread are delivered in
    /// order.
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn(BreakerMode, &str) + Send + Sync + 'static,
    {
        self.callbacks.on_open = Some(Arc::new(f));
        self
    }

    /// Set callback for when a circuit closes
    ///
    /// Same ordering caveat as [`on_open`](Self::on_open).
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(BreakerMode, &str) + Send + Sync + 'static,
    {
        self.callbacks.on_close = Some(Arc::new(f));
        self
    }

    /// Register handlers for all six circuit breaker flows on `registry`
    pub fn install(self: &Arc<Self>, registry: &MemoryRegistry) {
        let bindings = [
            (flows::CIRCUIT_BREAKER_CHECK, BreakerMode::Manual, Action::Check),
            (flows::CIRCUIT_BREAKER_TRIP, BreakerMode::Manual, Action::Trip),
            (flows::CIRCUIT_BREAKER_RESET, BreakerMode::Manual, Action::Reset),
            (flows::AUTO_CIRCUIT_BREAKER_CHECK, BreakerMode::Automatic, Action::Check),
            (flows::AUTO_CIRCUIT_BREAKER_TRIP, BreakerMode::Automatic, Action::Trip),
            (flows::AUTO_CIRCUIT_BREAKER_RESET, BreakerMode::Automatic, Action::Reset),
        ];

        for (flow, mode, action) in bindings {
            registry.register(
                flow,
                Arc::new(BoardHandler {
                    board: Arc::clone(self),
                    mode,
                    action,
                }),
            );
        }
        info!("Breaker board installed");
    }

    /// Move `name` to OPEN; returns the state before the trip
    pub fn trip(&self, mode: BreakerMode, name: &str) -> BreakerState {
        self.trip_with_message(mode, name, None)
    }

    /// Move `name` to CLOSED; returns the state before the reset
    pub fn reset(&self, mode: BreakerMode, name: &str) -> BreakerState {
        self.reset_with_message(mode, name, None)
    }

    /// Record a check of `name` and return its current state
    pub fn check(&self, mode: BreakerMode, name: &str) -> BreakerState {
        self.check_with_message(mode, name, None)
    }

    pub fn state(&self, mode: BreakerMode, name: &str) -> BreakerState {
        self.circuits
            .read()
            .get(&(mode, name.to_string()))
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn is_open(&self, mode: BreakerMode, name: &str) -> bool {
        self.state(mode, name) == BreakerState::Open
    }

    pub fn is_closed(&self, mode: BreakerMode, name: &str) -> bool {
        self.state(mode, name) == BreakerState::Closed
    }

    pub fn status(&self, mode: BreakerMode, name: &str) -> Option<CircuitStatus> {
        self.circuits
            .read()
            .get(&(mode, name.to_string()))
            .map(|record| snapshot(mode, name, record))
    }

    /// Every known circuit, ordered by mode then name
    pub fn circuits(&self) -> Vec<CircuitStatus> {
        let mut circuits: Vec<CircuitStatus> = self
            .circuits
            .read()
            .iter()
            .map(|((mode, name), record)| snapshot(*mode, name, record))
            .collect();
        circuits.sort_by(|a, b| (a.mode, &a.name).cmp(&(b.mode, &b.name)));
        circuits
    }

    /// Forget every circuit
    pub fn clear(&self) {
        self.circuits.write().clear();
    }

    fn trip_with_message(
        &self,
        mode: BreakerMode,
        name: &str,
        message: Option<&str>,
    ) -> BreakerState {
        let previous = self.update(mode, name, message, |record| {
            record.trips += 1;
            std::mem::replace(&mut record.state, BreakerState::Open)
        });

        if previous == BreakerState::Closed {
            info!(?mode, circuit = name, "Circuit opened");
            self.callbacks.trigger_open(mode, name);
        }
        previous
    }

    fn reset_with_message(
        &self,
        mode: BreakerMode,
        name: &str,
        message: Option<&str>,
    ) -> BreakerState {
        let previous = self.update(mode, name, message, |record| {
            std::mem::replace(&mut record.state, BreakerState::Closed)
        });

        if previous == BreakerState::Open {
            info!(?mode, circuit = name, "Circuit closed");
            self.callbacks.trigger_close(mode, name);
        }
        previous
    }

    fn check_with_message(
        &self,
        mode: BreakerMode,
        name: &str,
        message: Option<&str>,
    ) -> BreakerState {
        let state = self.update(mode, name, message, |record| {
            record.checks += 1;
            record.state
        });
        debug!(?mode, circuit = name, state = %state, "Circuit checked");
        state
    }

    // Callbacks run after the lock is released, so they may query the board.
    fn update<R>(
        &self,
        mode: BreakerMode,
        name: &str,
        message: Option<&str>,
        f: impl FnOnce(&mut CircuitRecord) -> R,
    ) -> R {
        let mut circuits = self.circuits.write();
        let record = circuits.entry((mode, name.to_string())).or_default();
        if let Some(message) = message {
            record.last_message = Some(message.to_string());
        }
        f(record)
    }
}

fn snapshot(mode: BreakerMode, name: &str, record: &CircuitRecord) -> CircuitStatus {
    CircuitStatus {
        mode,
        name: name.to_string(),
        state: record.state,
        checks: record.checks,
        trips: record.trips,
        last_message: record.last_message.clone(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Check,
    Trip,
    Reset,
}

/// Handler bound to one board, mode and action
#[derive(Debug)]
struct BoardHandler {
    board: Arc<BreakerBoard>,
    mode: BreakerMode,
    action: Action,
}

impl Handler for BoardHandler {
    fn invoke(&self, envelope: EventEnvelope) -> Result<(), HandlerError> {
        let name = envelope
            .transaction_type()
            .ok_or("circuit breaker event has no transactionType")?;
        let message = envelope.transaction_msg();

        match self.action {
            Action::Check => {
                self.board.check_with_message(self.mode, name, message);
            }
            Action::Trip => {
                self.board.trip_with_message(self.mode, name, message);
            }
            Action::Reset => {
                self.board.reset_with_message(self.mode, name, message);
            }
        }
        Ok(())
    }
}
