//! Registration and resolution notifications.
//!
//! Observers subscribe to a container and hear about every successful
//! register call (auto-registrations included) and every successful
//! resolution, cache hits included. Notifications are delivered synchronously
//! on the calling thread after the container has released its locks, so an
//! observer may call back into the container.

use std::fmt;
use std::sync::Arc;

use crate::registration::Registration;
use crate::service::AnyService;

/// Receives container notifications.
///
/// Both methods default to doing nothing, so an observer only implements the
/// events it cares about.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{AnyService, Container, ContainerObserver, Registration};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Counter {
///     resolved: AtomicUsize,
/// }
///
/// impl ContainerObserver for Counter {
///     fn resolved(&self, _registration: &Registration, _instance: &AnyService) {
///         self.resolved.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let container = Container::new();
/// let counter = Arc::new(Counter::default());
/// let id = container.subscribe(counter.clone());
///
/// container.register_instance::<u32>(Arc::new(7)).unwrap();
/// container.get_instance::<u32>().unwrap();
/// container.get_instance::<u32>().unwrap();
/// assert_eq!(counter.resolved.load(Ordering::SeqCst), 2);
///
/// assert!(container.unsubscribe(id));
/// container.get_instance::<u32>().unwrap();
/// assert_eq!(counter.resolved.load(Ordering::SeqCst), 2);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// A registration was stored.
    fn registered(&self, registration: &Registration) {
        let _ = registration;
    }

    /// `instance` was produced or retrieved for `registration`.
    fn resolved(&self, registration: &Registration, instance: &AnyService) {
        let _ = (registration, instance);
    }
}

/// Handle returned by [`Container::subscribe`](crate::Container::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribed observers, in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Arc<dyn ContainerObserver>)>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        before != self.observers.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Clones the observer list so callers can notify without holding a lock.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn ContainerObserver>> {
        self.observers.iter().map(|(_, o)| o.clone()).collect()
    }
}

type RegisteredFn = dyn Fn(&Registration) + Send + Sync;
type ResolvedFn = dyn Fn(&Registration, &AnyService) + Send + Sync;

/// Observer built from a closure by `on_registered` / `on_resolved`.
pub(crate) enum FnObserver {
    Registered(Box<RegisteredFn>),
    Resolved(Box<ResolvedFn>),
}

impl ContainerObserver for FnObserver {
    fn registered(&self, registration: &Registration) {
        if let FnObserver::Registered(f) = self {
            f(registration);
        }
    }

    fn resolved(&self, registration: &Registration, instance: &AnyService) {
        if let FnObserver::Resolved(f) = self {
            f(registration, instance);
        }
    }
}

/// Observer that forwards notifications to `tracing` at debug level.
///
/// ```rust
/// use ferrous_ioc::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.subscribe(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    target: &'static str,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { target: "ferrous-ioc" }
    }

    /// Uses `target` as the `container` field of every event.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggingObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingObserver")
            .field("target", &self.target)
            .finish()
    }
}

impl ContainerObserver for LoggingObserver {
    fn registered(&self, registration: &Registration) {
        tracing::debug!(
            container = self.target,
            key = %registration.key(),
            kind = %registration.kind(),
            lifetime = %registration.lifetime(),
            auto = registration.is_auto_registered(),
            "registered"
        );
    }

    fn resolved(&self, registration: &Registration, instance: &AnyService) {
        tracing::debug!(
            container = self.target,
            key = %registration.key(),
            instance = instance.type_name(),
            "resolved"
        );
    }
}
