//! Process-wide default container.

use once_cell::sync::Lazy;

use super::Container;

// Created on first access, exactly once, and kept for the life of the process.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(|| {
    let container = Container::new();
    tracing::debug!(container = container.id(), "initialized global container");
    container
});

/// The process-wide default container.
///
/// Prefer passing an explicit [`Container`] to the code that needs one. The
/// global instance is for bootstrap code and collaborators that cannot be
/// handed a container. It uses default options and is never torn down.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::global;
/// use std::sync::Arc;
///
/// global()
///     .register_instance_named::<String>("app.title", Arc::new("Inbox".into()))
///     .unwrap();
///
/// let title = global().get_instance_named::<String>("app.title").unwrap();
/// assert_eq!(*title, "Inbox");
/// assert!(global().ptr_eq(global()));
/// ```
pub fn global() -> &'static Container {
    &GLOBAL_CONTAINER
}
