//! Type-erased service handles.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A resolved service with its static type erased.
///
/// Internally this is an `Arc<dyn Any>` holding an `Arc<T>`, so the same
/// representation serves concrete types and trait objects alike (`T` may be
/// `dyn Trait`). Cloning is cheap and preserves identity: every clone
/// downcasts to the same `Arc<T>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::AnyService;
/// use std::sync::Arc;
///
/// let service = AnyService::new(Arc::new(42u32));
/// let value = service.downcast::<u32>().unwrap();
/// assert_eq!(*value, 42);
/// assert!(service.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct AnyService {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyService {
    /// Wraps an `Arc<T>`.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            inner: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recovers the typed `Arc<T>` if this service holds one.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    /// Returns true if the service holds an `Arc<T>`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.inner.is::<Arc<T>>()
    }

    /// `TypeId` of the wrapped `T`.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name of the wrapped `T`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true when both handles were cloned from the same wrap.
    pub fn ptr_eq(&self, other: &AnyService) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AnyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyService")
            .field("type_name", &self.type_name)
            .finish()
    }
}
