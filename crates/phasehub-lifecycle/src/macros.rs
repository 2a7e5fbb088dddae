//! Convenience macros for module authors.

/// Builds a module's hook table.
///
/// # Example
/// ```rust,ignore
/// let records = hook_records![MODULE_NAME;
///     Validate @ PreSystem => hook.clone(),
///     Start @ PreSystem => hook.clone(),
///     Reload @ PreSystem => hook,
/// ];
/// registry.register(records).await;
/// ```
#[macro_export]
macro_rules! hook_records {
    ($owner:expr; $($phase:ident @ $priority:ident => $hook:expr),* $(,)?) => {
        vec![
            $(
                $crate::hooks::definitions::HookRecord::new(
                    $owner,
                    $crate::hooks::definitions::Phase::$phase,
                    $crate::hooks::definitions::Priority::$priority,
                    $hook,
                )
            ),*
        ]
    };
}
