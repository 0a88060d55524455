//! Extension point registries
//!
//! A registry resolves the symbolic flow names the operations dispatch to
//! (`auditLogFlow`, `circuitbreaker-trip`, ...) into invocable handlers. The
//! host pipeline owns the real one; this module provides:
//! - `MemoryRegistry`: thread-safe in-memory name → handler map
//! - `NullRegistry`: resolves nothing, for hosts that only want the failure signal

use crate::EventEnvelope;
use crate::errors::HandlerError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An externally registered unit of work that receives transaction events
pub trait Handler: Send + Sync {
    /// Process one event. Runs synchronously on the emitting thread.
    fn invoke(&self, envelope: EventEnvelope) -> Result<(), HandlerError>;
}

/// Lookup contract between the operations and the host pipeline
///
/// Implementations must return `None` for unknown names rather than fail, and
/// must tolerate concurrent lookups from many threads.
pub trait ExtensionPointRegistry: Send + Sync + std::fmt::Debug {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>>;
}

/// Handler backed by a closure
///
/// # Example
///
/// ```rust
/// use eframework::{FnHandler, Handler, EventEnvelope, AttributeSet};
///
/// let handler = FnHandler::new(|envelope: EventEnvelope| {
///     println!("{:?}", envelope.attributes);
///     Ok(())
/// });
/// handler.invoke(EventEnvelope::new(serde_json::Value::Null, AttributeSet::new())).unwrap();
/// ```
pub struct FnHandler<F>
where
    F: Fn(EventEnvelope) -> Result<(), HandlerError> + Send + Sync,
{
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(EventEnvelope) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(EventEnvelope) -> Result<(), HandlerError> + Send + Sync,
{
    fn invoke(&self, envelope: EventEnvelope) -> Result<(), HandlerError> {
        (self.f)(envelope)
    }
}

impl<F> std::fmt::Debug for FnHandler<F>
where
    F: Fn(EventEnvelope) -> Result<(), HandlerError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("f", &"<closure>").finish()
    }
}

/// Thread-safe in-memory registry
///
/// Registration goes through `&self`, so a registry can be shared behind an
/// `Arc` and still be populated after the operations were built.
#[derive(Default)]
pub struct MemoryRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn Handler>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, returning the handler it replaced
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        let name = name.into();
        debug!(handler = %name, "Registered handler");
        self.handlers.write().insert(name, handler)
    }

    /// Register a closure under `name`
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F) -> Option<Arc<dyn Handler>>
    where
        F: Fn(EventEnvelope) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnHandler::new(f)))
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl ExtensionPointRegistry for MemoryRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.read().get(name).cloned()
    }
}

impl std::fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Registry that resolves nothing
///
/// Every dispatch through it is dropped with a warning. Circuit breaker trips
/// still return their failure, so this is enough for callers that only need
/// the open signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRegistry;

impl NullRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl ExtensionPointRegistry for NullRegistry {
    fn lookup(&self, _name: &str) -> Option<Arc<dyn Handler>> {
        None
    }
}
