//! Hook dispatcher — runs before-run hooks sequentially.
//!
//! - Hooks run one at a time in registration order, each awaited.
//! - A hook that calls `prevent_default` stops the remaining hooks.
//! - A hook that fails or times out is logged and skipped; it does not
//!   prevent the run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use catalog_entity::CatalogEntity;

use super::definitions::CatalogRunEvent;
use super::registry::HookRegistry;

/// Aggregated result of one before-run dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeforeRunOutcome {
    /// Whether a hook prevented the run.
    pub prevented: bool,
    /// Name of the hook that prevented it.
    pub prevented_by: Option<String>,
    /// Number of hooks that ran to completion or failure.
    pub invoked: usize,
    /// Number of hooks that failed or timed out.
    pub failures: usize,
}

impl BeforeRunOutcome {
    /// Whether the entity may run.
    pub fn may_run(&self) -> bool {
        !self.prevented
    }
}

/// Dispatches run events to every registered hook.
#[derive(Debug)]
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
    timeout: Duration,
}

impl HookDispatcher {
    /// Creates a dispatcher bounding each hook by `timeout`.
    pub fn new(registry: Arc<HookRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Runs all hooks for `entity`.
    pub async fn dispatch(&self, entity: &Arc<dyn CatalogEntity>) -> BeforeRunOutcome {
        let hooks = self.registry.snapshot();
        let mut outcome = BeforeRunOutcome::default();

        if hooks.is_empty() {
            return outcome;
        }

        debug!(
            uid = %entity.get_id(),
            hook_count = hooks.len(),
            "Dispatching before-run hooks"
        );

        let mut event = CatalogRunEvent::new(Arc::clone(entity));

        for hook in &hooks {
            outcome.invoked += 1;

            match tokio::time::timeout(self.timeout, hook.handle(&mut event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    outcome.failures += 1;
                    error!(
                        hook = %hook.name(),
                        uid = %entity.get_id(),
                        name = %entity.get_name(),
                        error = %e,
                        "Before-run hook failed"
                    );
                }
                Err(_) => {
                    outcome.failures += 1;
                    error!(
                        hook = %hook.name(),
                        uid = %entity.get_id(),
                        name = %entity.get_name(),
                        timeout_secs = self.timeout.as_secs_f64(),
                        "Before-run hook timed out"
                    );
                }
            }

            if event.is_default_prevented() {
                info!(
                    hook = %hook.name(),
                    uid = %entity.get_id(),
                    "Before-run hook prevented the run"
                );
                outcome.prevented = true;
                outcome.prevented_by = Some(hook.name().to_string());
                break;
            }
        }

        outcome
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use catalog_core::{AppError, AppResult, EntityDescriptor};
    use catalog_entity::EntityCore;

    use super::*;
    use crate::hooks::definitions::{BeforeRunHook, FnHook};

    #[derive(Debug)]
    struct Target {
        core: EntityCore,
    }

    impl CatalogEntity for Target {
        fn core(&self) -> &EntityCore {
            &self.core
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn target() -> Arc<dyn CatalogEntity> {
        Arc::new(Target {
            core: EntityCore::from_descriptor(&EntityDescriptor::new("v1", "Target", "t1", "target")),
        })
    }

    fn dispatcher() -> HookDispatcher {
        HookDispatcher::new(Arc::new(HookRegistry::new()), Duration::from_secs(1))
    }

    struct SlowHook;

    #[async_trait]
    impl BeforeRunHook for SlowHook {
        async fn handle(&self, event: &mut CatalogRunEvent) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            event.prevent_default();
            Ok(())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_no_hooks_allows_run() {
        let outcome = dispatcher().dispatch(&target()).await;
        assert!(outcome.may_run());
        assert_eq!(outcome.invoked, 0);
    }

    #[tokio::test]
    async fn test_prevent_default_short_circuits() {
        let dispatcher = dispatcher();
        let second_ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&second_ran);

        dispatcher.registry().register(Arc::new(FnHook::new("veto", |event: &mut CatalogRunEvent| {
            event.prevent_default();
            Ok(())
        })));
        dispatcher.registry().register(Arc::new(FnHook::new("recorder", move |_: &mut CatalogRunEvent| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })));

        let outcome = dispatcher.dispatch(&target()).await;
        assert!(!outcome.may_run());
        assert_eq!(outcome.prevented_by.as_deref(), Some("veto"));
        assert!(!second_ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_hook_is_isolated() {
        let dispatcher = dispatcher();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        dispatcher.registry().register(Arc::new(FnHook::new("broken", |_: &mut CatalogRunEvent| {
            Err(AppError::hook("boom"))
        })));
        dispatcher.registry().register(Arc::new(FnHook::new("counter", move |_: &mut CatalogRunEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));

        let outcome = dispatcher.dispatch(&target()).await;
        assert!(outcome.may_run());
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.invoked, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disposed_hook_no_longer_runs() {
        let dispatcher = dispatcher();
        let disposer = dispatcher.registry().register(Arc::new(FnHook::new("veto", |event: &mut CatalogRunEvent| {
            event.prevent_default();
            Ok(())
        })));
        disposer.dispose();
        disposer.dispose();
        assert!(dispatcher.dispatch(&target()).await.may_run());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_hook_does_not_prevent() {
        let dispatcher = dispatcher();
        dispatcher.registry().register(Arc::new(SlowHook));
        let outcome = dispatcher.dispatch(&target()).await;
        assert!(outcome.may_run());
        assert_eq!(outcome.failures, 1);
    }
}
