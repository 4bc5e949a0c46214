//! Registration disposers.

use std::fmt;

use parking_lot::Mutex;

type DisposeFn = Box<dyn FnOnce() + Send>;

/// Handle returned by every registration; removes exactly that registration.
///
/// `dispose` may be called any number of times. Only the first call runs
/// the removal. Dropping a `Disposer` does **not** dispose it.
pub struct Disposer {
    action: Mutex<Option<DisposeFn>>,
}

impl Disposer {
    /// Creates a disposer running `action` on first disposal.
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// Runs the removal if it has not run yet.
    pub fn dispose(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    /// Returns whether the disposer has already run.
    pub fn is_disposed(&self) -> bool {
        self.action.lock().is_none()
    }

    /// Combines several disposers into one.
    pub fn all(disposers: Vec<Disposer>) -> Self {
        Self::new(move || {
            for disposer in &disposers {
                disposer.dispose();
            }
        })
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
