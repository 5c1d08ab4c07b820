//! Declared types: what the resolver knows about a type without reflection.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::container::WeakContainer;
use crate::descriptors::{Injectable, TypeDescriptor};
use crate::key::Key;
use crate::lazy::LazyService;
use crate::service::AnyService;
use crate::value::{ValueKind, ValueType};

/// Types the container can register and resolve.
///
/// Every [`Injectable`] type is resolvable as a concrete type. Value types
/// implement it as literals, and trait objects opt in through
/// [`interface!`](crate::interface).
pub trait Resolvable: Send + Sync + 'static {
    /// Declared type information for `Self`.
    fn type_ref() -> TypeRef;
}

impl<T: Injectable> Resolvable for T {
    fn type_ref() -> TypeRef {
        TypeRef::concrete::<T>()
    }
}

/// What kind of type a [`TypeRef`] names.
#[derive(Clone)]
pub enum TypeKind {
    /// Constructible through its descriptor.
    Concrete(fn() -> TypeDescriptor),
    /// Trait object; only resolvable when registered.
    Abstract,
    /// Literal value type.
    Value(ValueKind),
    /// Deferred accessor for another type.
    Lazy(LazyTarget),
}

/// Target of a lazy accessor parameter.
#[derive(Clone, Copy)]
pub struct LazyTarget {
    target: fn() -> TypeRef,
    make: fn(WeakContainer, Option<&'static str>) -> AnyService,
}

impl LazyTarget {
    /// Declared type the accessor resolves.
    pub fn target(&self) -> TypeRef {
        (self.target)()
    }

    pub(crate) fn make(&self, container: WeakContainer, name: Option<&'static str>) -> AnyService {
        (self.make)(container, name)
    }
}

/// A declared type: identity, display name and kind.
///
/// Parameters and properties carry a `TypeRef` for their declared type; the
/// resolver decides how to supply a value from its kind alone.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{TypeRef, TypeKind};
///
/// let ty = TypeRef::of::<String>();
/// assert!(ty.is_value());
/// assert!(matches!(ty.kind(), TypeKind::Value(_)));
/// ```
#[derive(Clone)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeRef {
    /// The declared type information of `T`.
    pub fn of<T: ?Sized + Resolvable>() -> Self {
        T::type_ref()
    }

    /// A concrete, descriptor-backed type.
    pub fn concrete<T: Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: TypeKind::Concrete(T::descriptor),
        }
    }

    /// An abstract type (trait object).
    pub fn abstract_type<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: TypeKind::Abstract,
        }
    }

    /// A literal value type.
    pub fn value<V: ValueType>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: std::any::type_name::<V>(),
            kind: TypeKind::Value(V::value_kind()),
        }
    }

    /// A deferred accessor ([`LazyService<T>`]) for `T`.
    pub fn lazy<T: ?Sized + Resolvable>() -> Self {
        Self {
            id: TypeId::of::<LazyService<T>>(),
            name: std::any::type_name::<LazyService<T>>(),
            kind: TypeKind::Lazy(LazyTarget {
                target: T::type_ref,
                make: make_lazy::<T>,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Registration key for this type under `name`.
    #[inline]
    pub fn key(&self, name: Option<&'static str>) -> Key {
        Key::new(self.id, self.name, name)
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, TypeKind::Concrete(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Abstract)
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, TypeKind::Value(_))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.kind, TypeKind::Lazy(_))
    }

    /// Descriptor of a concrete type, built fresh.
    pub(crate) fn describe(&self) -> Option<TypeDescriptor> {
        match self.kind {
            TypeKind::Concrete(describe) => Some(describe()),
            _ => None,
        }
    }
}

fn make_lazy<T: ?Sized + Resolvable>(container: WeakContainer, name: Option<&'static str>) -> AnyService {
    AnyService::new(Arc::new(LazyService::<T>::new(container, name)))
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TypeKind::Concrete(_) => "concrete",
            TypeKind::Abstract => "abstract",
            TypeKind::Value(_) => "value",
            TypeKind::Lazy(_) => "lazy",
        };
        f.debug_struct("TypeRef")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Declares trait objects as abstract, resolvable types.
///
/// Abstract types can be registered (with a concrete implementation, an
/// instance or a factory) but are never auto-registered.
///
/// ```rust
/// use ferrous_ioc::{interface, TypeRef};
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
/// interface!(dyn Clock);
///
/// assert!(TypeRef::of::<dyn Clock>().is_abstract());
/// ```
#[macro_export]
macro_rules! interface {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Resolvable for $ty {
                fn type_ref() -> $crate::TypeRef {
                    $crate::TypeRef::abstract_type::<Self>()
                }
            }
        )+
    };
}
