//! The run event and the hook handler trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use catalog_core::AppResult;
use catalog_entity::CatalogEntity;

/// Event shared by every before-run hook of one run attempt.
#[derive(Debug)]
pub struct CatalogRunEvent {
    target: Arc<dyn CatalogEntity>,
    default_prevented: bool,
}

impl CatalogRunEvent {
    /// Creates an event for `target`.
    pub fn new(target: Arc<dyn CatalogEntity>) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }

    /// The entity about to run.
    pub fn target(&self) -> &Arc<dyn CatalogEntity> {
        &self.target
    }

    /// Stops the remaining hooks and the entity's own run action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a hook called [`CatalogRunEvent::prevent_default`].
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// An interceptor consulted before an entity runs.
///
/// Returning an error does not prevent the run; only
/// [`CatalogRunEvent::prevent_default`] does.
#[async_trait]
pub trait BeforeRunHook: Send + Sync {
    /// Inspects and possibly vetoes the run.
    async fn handle(&self, event: &mut CatalogRunEvent) -> AppResult<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Adapts a synchronous closure into a [`BeforeRunHook`].
pub struct FnHook<F> {
    name: String,
    handler: F,
}

impl<F> FnHook<F>
where
    F: Fn(&mut CatalogRunEvent) -> AppResult<()> + Send + Sync,
{
    /// Wraps `handler` under `name`.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F> BeforeRunHook for FnHook<F>
where
    F: Fn(&mut CatalogRunEvent) -> AppResult<()> + Send + Sync,
{
    async fn handle(&self, event: &mut CatalogRunEvent) -> AppResult<()> {
        (self.handler)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook").field("name", &self.name).finish_non_exhaustive()
    }
}
