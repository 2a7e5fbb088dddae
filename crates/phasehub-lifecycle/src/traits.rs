//! The hook callback trait and a closure adapter.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use phasehub_core::config::ConfigSection;
use phasehub_core::context::SharedContext;

use crate::hooks::definitions::{HookError, RunContext};

/// A lifecycle callback implemented per module.
///
/// The hook receives its module's configuration section and the current
/// shared context, and returns the context to install for the hooks that
/// follow. Returning `ctx.clone()` leaves the context unchanged.
#[async_trait]
pub trait Hook: Send + Sync + std::fmt::Debug {
    /// Runs the hook.
    async fn invoke(
        &self,
        run: &RunContext,
        config: &ConfigSection,
        ctx: &SharedContext,
    ) -> Result<SharedContext, HookError>;
}

type HookFn = dyn Fn(RunContext, ConfigSection, SharedContext) -> BoxFuture<'static, Result<SharedContext, HookError>>
    + Send
    + Sync;

/// A closure-based hook for quick hook creation.
pub struct FnHook {
    /// Name shown in diagnostics.
    name: String,
    /// Hook function.
    f: Arc<HookFn>,
}

impl std::fmt::Debug for FnHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHook")
            .field("name", &self.name)
            .field("f", &"<closure>")
            .finish()
    }
}

impl FnHook {
    /// Creates a hook from an async closure.
    pub fn new<F, Fut>(name: &str, f: F) -> Self
    where
        F: Fn(RunContext, ConfigSection, SharedContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SharedContext, HookError>> + Send + 'static,
    {
        let f: Arc<HookFn> = Arc::new(
            move |run: RunContext, config: ConfigSection, ctx: SharedContext| {
                f(run, config, ctx).boxed()
            },
        );
        Self {
            name: name.to_string(),
            f,
        }
    }

    /// Creates a hook from a synchronous closure.
    pub fn from_fn<F>(name: &str, f: F) -> Self
    where
        F: Fn(&RunContext, &ConfigSection, &SharedContext) -> Result<SharedContext, HookError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, move |run, config, ctx| {
            let result = f(&run, &config, &ctx);
            async move { result }
        })
    }

    /// Wraps the hook into an `Arc<dyn Hook>`.
    pub fn into_hook(self) -> Arc<dyn Hook> {
        Arc::new(self)
    }
}

#[async_trait]
impl Hook for FnHook {
    async fn invoke(
        &self,
        run: &RunContext,
        config: &ConfigSection,
        ctx: &SharedContext,
    ) -> Result<SharedContext, HookError> {
        (self.f)(run.clone(), config.clone(), ctx.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::Phase;

    #[derive(Debug, PartialEq)]
    struct Marker(&'static str);

    #[tokio::test]
    async fn test_async_closure_hook() {
        let hook = FnHook::new("marker", |_run, _config, ctx| async move {
            Ok(ctx.with_extension(Marker("async")))
        });
        let run = RunContext::new(Phase::Start, 1);
        let section = ConfigSection::new("test", serde_json::json!({}));

        let out = hook
            .invoke(&run, &section, &SharedContext::new())
            .await
            .expect("invoke");
        assert_eq!(out.extension::<Marker>().as_deref(), Some(&Marker("async")));
    }

    #[tokio::test]
    async fn test_sync_closure_hook_error() {
        let hook = FnHook::from_fn("broken", |_run, _config, _ctx| {
            Err(HookError::failed("nope"))
        });
        let run = RunContext::new(Phase::Start, 1);
        let section = ConfigSection::new("test", serde_json::Value::Null);

        let err = hook
            .invoke(&run, &section, &SharedContext::new())
            .await
            .expect_err("should fail");
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_debug_hides_closure() {
        let hook = FnHook::from_fn("noop", |_run, _config, ctx| Ok(ctx.clone()));
        let rendered = format!("{hook:?}");
        assert!(rendered.contains("noop"));
        assert!(rendered.contains("<closure>"));
    }
}
