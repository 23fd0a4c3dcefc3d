//! Ownership of the engine handle.
//!
//! [`EngineGuard`] pairs the engine's acquisition with exactly one
//! teardown. Explicit [`release`](EngineGuard::release) and `Drop` share
//! the same path, and the handle is taken out of the guard the first time
//! it runs, so a second teardown cannot happen.

use jqbridge_engine::Engine;
use tracing::debug;

/// RAII owner of an engine handle.
pub struct EngineGuard<E: Engine> {
    engine: Option<E>,
}

impl<E: Engine> EngineGuard<E> {
    /// Take ownership of a live engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Borrow the engine, or `None` once released.
    pub fn get(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Mutably borrow the engine, or `None` once released.
    pub fn get_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Whether teardown has already run.
    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// Tear the engine down. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.engine.take() {
            Some(mut engine) => {
                engine.teardown();
                debug!(target: "jqbridge::session", "Engine torn down");
                true
            }
            None => false,
        }
    }
}

impl<E: Engine> Drop for EngineGuard<E> {
    fn drop(&mut self) {
        self.release();
    }
}
