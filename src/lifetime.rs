//! Registration lifetimes.

use std::fmt;

/// Whether a type registration hands out one shared instance or a fresh one
/// per resolution.
///
/// Only type registrations carry a lifetime. Instance registrations always
/// return their instance, and factory registrations call the factory every
/// time.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Injectable, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>().default_constructor(|| Clock).build()
///     }
/// }
///
/// let container = Container::new();
///
/// // Transient by default: every resolution constructs a new Clock.
/// container.register::<Clock>().unwrap();
/// let a = container.get_instance::<Clock>().unwrap();
/// let b = container.get_instance::<Clock>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
///
/// // Singleton: the first instance is cached.
/// container.register_named::<Clock>("shared").unwrap().as_singleton();
/// let a = container.get_instance_named::<Clock>("shared").unwrap();
/// let b = container.get_instance_named::<Clock>("shared").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Lifetime {
    /// New instance per resolution, never cached.
    #[default]
    Transient,
    /// First constructed instance is cached and returned until the cache is
    /// cleared or the registration removed.
    Singleton,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("transient"),
            Lifetime::Singleton => f.write_str("singleton"),
        }
    }
}
