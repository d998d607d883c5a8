//! Application context: phased lifecycle around the [`Registry`].

use std::fmt;

use tracing::info;

use crate::component::{ComponentRef, Module};
use crate::executor::{AffinityExecutor, JobPump};
use crate::registry::Registry;
use crate::ContainerError;

/// Lifecycle phase of an [`AppContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Configured,
    Initialized,
}

impl ContextState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Initialized => "initialized",
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owner of the registry and the single thread components live on.
///
/// The context moves strictly forward through [`ContextState`]:
/// [`configure`](Self::configure) collects modules, [`initialize`](Self::initialize)
/// scans them, and only then does component retrieval become legal. Calls in
/// the wrong phase fail with [`ContainerError::StateError`] naming both
/// states. [`reset`](Self::reset) returns a used context to the beginning.
///
/// Foreign threads reach the context through [`executor`](Self::executor);
/// the owning thread services them with [`run_pending`](Self::run_pending).
pub struct AppContext {
    state: ContextState,
    modules: Vec<Module>,
    registry: Registry,
    executor: AffinityExecutor<AppContext>,
    pump: JobPump<AppContext>,
}

impl AppContext {
    #[must_use]
    pub fn new() -> Self {
        let (executor, pump) = AffinityExecutor::new();
        Self {
            state: ContextState::Uninitialized,
            modules: Vec::new(),
            registry: Registry::new(),
            executor,
            pump,
        }
    }

    #[must_use]
    pub fn state(&self) -> ContextState {
        self.state
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.state != ContextState::Uninitialized
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state == ContextState::Initialized
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle for submitting work from other threads.
    #[must_use]
    pub fn executor(&self) -> AffinityExecutor<AppContext> {
        self.executor.clone()
    }

    /// Run jobs queued by foreign threads. Call from the owning thread.
    pub fn run_pending(&self) -> usize {
        self.pump.run_pending(self)
    }

    fn require(&self, expected: ContextState) -> Result<(), ContainerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ContainerError::StateError {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    /// Record the modules to scan. Legal only on a fresh or reset context.
    pub fn configure(&mut self, modules: Vec<Module>) -> Result<(), ContainerError> {
        self.require(ContextState::Uninitialized)?;
        self.modules = modules;
        self.state = ContextState::Configured;
        Ok(())
    }

    /// Scan the configured modules, eagerly constructing non-lazy
    /// singletons.
    pub fn initialize(&mut self) -> Result<(), ContainerError> {
        self.require(ContextState::Configured)?;
        for module in &self.modules {
            self.registry.scan(module)?;
        }
        info!(modules = self.modules.len(), "context initialized");
        self.state = ContextState::Initialized;
        Ok(())
    }

    /// Drop all definitions and instances and start over.
    pub fn reset(&mut self) {
        let (executor, pump) = AffinityExecutor::new();
        self.registry = Registry::new();
        self.modules.clear();
        self.executor = executor;
        self.pump = pump;
        self.state = ContextState::Uninitialized;
        info!("context reset");
    }

    // ---- retrieval ------------------------------------------------------

    pub fn get_by_id(&self, id: &str) -> Result<Option<ComponentRef>, ContainerError> {
        self.require(ContextState::Initialized)?;
        self.registry.get_by_id(id)
    }

    pub fn get_by_type<T: 'static>(&self) -> Result<Option<ComponentRef>, ContainerError> {
        self.require(ContextState::Initialized)?;
        self.registry.get_by_type::<T>()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
