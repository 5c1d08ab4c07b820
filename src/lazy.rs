//! Deferred accessors injected in place of eager dependencies.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::WeakContainer;
use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::types::{Resolvable, TypeRef};

/// A zero-argument accessor that resolves `T` when called.
///
/// Declare a constructor parameter with [`lazy_param`](crate::lazy_param) (or
/// a property with `lazy_dependency`) to receive one of these instead of a
/// resolved `Arc<T>`. Nothing is resolved until [`get`](Self::get) runs, and
/// every call goes through the container again, so lifetimes are honoured.
///
/// The accessor holds a weak handle: it does not keep the container alive,
/// and fails with `ContainerDropped` once the container is gone.
pub struct LazyService<T: ?Sized> {
    container: WeakContainer,
    name: Option<&'static str>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Resolvable> LazyService<T> {
    pub(crate) fn new(container: WeakContainer, name: Option<&'static str>) -> Self {
        Self {
            container,
            name,
            _marker: PhantomData,
        }
    }

    /// Resolves `T` through the owning container.
    pub fn get(&self) -> DiResult<Arc<T>> {
        let container = self.container.upgrade().ok_or_else(|| {
            DiError::resolution(
                TypeRef::of::<T>().key(self.name),
                ResolutionFailure::ContainerDropped,
            )
        })?;
        container.get_instance_of_name::<T>(self.name)
    }

    /// Registration name the accessor resolves under.
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

impl<T: ?Sized> Clone for LazyService<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for LazyService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyService")
            .field("type", &std::any::type_name::<T>())
            .field("name", &self.name)
            .finish()
    }
}
