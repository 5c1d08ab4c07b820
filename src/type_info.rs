//! Type information cache and constructor selection.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptors::{ConstructorInfo, ParameterInfo, TypeDescriptor};
use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::internal::FastMap;
use crate::types::TypeRef;

/// The constructor chosen for one implementation type, with its descriptor.
#[derive(Debug, Clone)]
pub struct TypeInformation {
    descriptor: Arc<TypeDescriptor>,
    constructor: ConstructorInfo,
}

impl TypeInformation {
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The selected constructor.
    pub fn constructor(&self) -> &ConstructorInfo {
        &self.constructor
    }

    /// Ordered parameters of the selected constructor.
    pub fn parameters(&self) -> &[ParameterInfo] {
        self.constructor.parameters()
    }
}

/// Picks the constructor the container will use.
///
/// Only constructors visible under `allow_non_public` are considered. A
/// visible constructor marked preferred wins outright (the first declared,
/// if several are marked). Otherwise the one with the most parameters wins,
/// and among equal maximal arity the first declared is chosen.
///
/// ```rust
/// use ferrous_ioc::{param, select_constructor, Injectable, TypeDescriptor};
///
/// struct Report { title: String }
///
/// impl Injectable for Report {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .default_constructor(|| Report { title: String::new() })
///             .constructor([param::<String>("title")], |args| {
///                 Ok(Report { title: args.value(0)? })
///             })
///             .build()
///     }
/// }
///
/// let descriptor = Report::descriptor();
/// let chosen = select_constructor(&descriptor, false).unwrap();
/// assert_eq!(chosen.arity(), 1);
/// ```
pub fn select_constructor(descriptor: &TypeDescriptor, allow_non_public: bool) -> Option<&ConstructorInfo> {
    let mut visible = descriptor
        .constructors()
        .iter()
        .filter(|c| c.is_visible(allow_non_public));

    if let Some(preferred) = visible.clone().find(|c| c.is_preferred()) {
        return Some(preferred);
    }

    let first = visible.next()?;
    Some(visible.fold(first, |best, c| if c.arity() > best.arity() { c } else { best }))
}

/// Caches descriptors and constructor selections per implementation type.
///
/// Selections are keyed by `(TypeId, allow_non_public)` so flipping the
/// non-public policy on a container never returns a stale choice.
#[derive(Default)]
pub(crate) struct TypeInfoCache {
    descriptors: RwLock<FastMap<TypeId, Arc<TypeDescriptor>>>,
    selections: RwLock<FastMap<(TypeId, bool), Arc<TypeInformation>>>,
}

impl TypeInfoCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Descriptor of a concrete type, built on first request.
    pub(crate) fn descriptor(&self, ty: &TypeRef) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.descriptors.read().get(&ty.id()) {
            return Some(found.clone());
        }
        let built = Arc::new(ty.describe()?);
        Some(
            self.descriptors
                .write()
                .entry(ty.id())
                .or_insert(built)
                .clone(),
        )
    }

    /// Cached or freshly computed constructor selection for `ty`.
    pub(crate) fn type_information(&self, ty: &TypeRef, allow_non_public: bool) -> DiResult<Arc<TypeInformation>> {
        let cache_key = (ty.id(), allow_non_public);
        if let Some(found) = self.selections.read().get(&cache_key) {
            return Ok(found.clone());
        }

        let descriptor = self
            .descriptor(ty)
            .ok_or_else(|| DiError::resolution(ty.key(None), ResolutionFailure::AbstractType))?;
        let constructor = select_constructor(&descriptor, allow_non_public)
            .cloned()
            .ok_or_else(|| DiError::resolution(ty.key(None), ResolutionFailure::NoEligibleConstructor))?;

        tracing::trace!(
            type_name = ty.name(),
            constructor = constructor.id().index,
            arity = constructor.arity(),
            "selected constructor"
        );

        let info = Arc::new(TypeInformation {
            descriptor,
            constructor,
        });
        Ok(self
            .selections
            .write()
            .entry(cache_key)
            .or_insert(info)
            .clone())
    }

    pub(crate) fn is_cached(&self, type_id: TypeId) -> bool {
        let selections = self.selections.read();
        selections.contains_key(&(type_id, false)) || selections.contains_key(&(type_id, true))
    }

    /// Evicts everything cached for `type_id`.
    pub(crate) fn remove(&self, type_id: TypeId) {
        self.descriptors.write().remove(&type_id);
        self.selections.write().retain(|(id, _), _| *id != type_id);
    }

    pub(crate) fn clear(&self) {
        self.descriptors.write().clear();
        self.selections.write().clear();
    }
}
