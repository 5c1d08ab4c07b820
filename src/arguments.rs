//! Resolved constructor arguments.

use std::sync::Arc;

use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::key::Key;
use crate::lazy::LazyService;
use crate::service::AnyService;
use crate::value::{Value, ValueType};

#[cfg(feature = "smallvec")]
pub(crate) type ArgVec = smallvec::SmallVec<[(&'static str, Argument); 4]>;
#[cfg(not(feature = "smallvec"))]
pub(crate) type ArgVec = Vec<(&'static str, Argument)>;

/// One resolved argument.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A literal (from a value container, or a default value).
    Value(Value),
    /// A resolved service, or a lazy accessor wrapped as one.
    Service(AnyService),
}

impl Argument {
    /// Short shape description used in error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Argument::Value(_) => "literal value",
            Argument::Service(service) => service.type_name(),
        }
    }

    /// Reads a value type from either a literal or a registered `Arc<V>`.
    pub(crate) fn to_value<V: ValueType>(&self) -> Result<V, String> {
        match self {
            Argument::Value(value) => V::from_value(value).ok_or_else(|| {
                format!(
                    "literal {} cannot be read as {}",
                    value,
                    std::any::type_name::<V>()
                )
            }),
            Argument::Service(service) => service
                .downcast::<V>()
                .map(|v| (*v).clone())
                .ok_or_else(|| {
                    format!(
                        "expected {}, got {}",
                        std::any::type_name::<V>(),
                        service.type_name()
                    )
                }),
        }
    }

    /// Reads a resolved `Arc<T>`.
    pub(crate) fn to_service<T: ?Sized + 'static>(&self) -> Result<Arc<T>, String> {
        match self {
            Argument::Service(service) => service.downcast::<T>().ok_or_else(|| {
                format!(
                    "expected {}, got {}",
                    std::any::type_name::<T>(),
                    service.type_name()
                )
            }),
            Argument::Value(value) => Err(format!(
                "expected {}, got literal {}",
                std::any::type_name::<T>(),
                value
            )),
        }
    }
}

/// The ordered arguments handed to a constructor.
///
/// Constructors read them by position with the accessor matching the
/// parameter's declaration: [`service`](Self::service) for dependencies,
/// [`value`](Self::value) for literals, [`lazy`](Self::lazy) for deferred
/// accessors.
#[derive(Debug, Clone)]
pub struct Arguments {
    owner: Key,
    items: ArgVec,
}

impl Arguments {
    pub(crate) fn new(owner: Key) -> Self {
        Self {
            owner,
            items: ArgVec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, argument: Argument) {
        self.items.push((name, argument));
    }

    /// Key of the registration being constructed.
    pub fn owner(&self) -> &Key {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parameter name at `index`.
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.items.get(index).map(|(name, _)| *name)
    }

    /// Raw argument at `index`.
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.items.get(index).map(|(_, arg)| arg)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(&'static str, Argument)> {
        self.items.iter()
    }

    /// Resolved dependency at `index`.
    pub fn service<T: ?Sized + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let (name, arg) = self.at(index)?;
        arg.to_service::<T>()
            .map_err(|message| self.invalid(index, name, message))
    }

    /// Literal (or registered value-type instance) at `index`.
    pub fn value<V: ValueType>(&self, index: usize) -> DiResult<V> {
        let (name, arg) = self.at(index)?;
        arg.to_value::<V>()
            .map_err(|message| self.invalid(index, name, message))
    }

    /// Lazy accessor at `index`.
    pub fn lazy<T: ?Sized + 'static>(&self, index: usize) -> DiResult<LazyService<T>> {
        self.service::<LazyService<T>>(index).map(|lazy| (*lazy).clone())
    }

    fn at(&self, index: usize) -> DiResult<(&'static str, &Argument)> {
        self.items
            .get(index)
            .map(|(name, arg)| (*name, arg))
            .ok_or_else(|| self.invalid(index, "?", format!("only {} arguments supplied", self.items.len())))
    }

    fn invalid(&self, index: usize, parameter: &'static str, message: String) -> DiError {
        DiError::resolution(
            self.owner,
            ResolutionFailure::InvalidArgument {
                index,
                parameter,
                message,
            },
        )
    }
}
