//! Callback system for breaker board state transitions

use crate::board::BreakerMode;
use std::sync::Arc;

pub type TransitionCallback = Arc<dyn Fn(BreakerMode, &str) + Send + Sync>;

/// Callbacks fired when a circuit on a [`BreakerBoard`](crate::BreakerBoard) changes state
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_open: Option<TransitionCallback>,
    pub on_close: Option<TransitionCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger_open(&self, mode: BreakerMode, circuit: &str) {
        if let Some(ref callback) = self.on_open {
            callback(mode, circuit);
        }
    }

    pub fn trigger_close(&self, mode: BreakerMode, circuit: &str) {
        if let Some(ref callback) = self.on_close {
            callback(mode, circuit);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
