//! Type descriptors: the declarative metadata the container reads instead of
//! reflecting over types at runtime.
//!
//! A constructible type implements [`Injectable`] and returns a
//! [`TypeDescriptor`] listing its constructors (with ordered, named, typed
//! parameters), the properties it exposes for build-up, and the abstract
//! types it can be used as. Descriptors are built once per type and cached by
//! the container.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::arguments::{Argument, Arguments};
use crate::error::DiResult;
use crate::key::Key;
use crate::lazy::LazyService;
use crate::lifetime::Lifetime;
use crate::registration::RegistrationKindTag;
use crate::service::AnyService;
use crate::types::{Resolvable, TypeRef};
use crate::value::ValueType;

/// A type the container can construct.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{param, Container, Injectable, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// impl Injectable for Database {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .constructor([param::<String>("url")], |args| {
///                 Ok(Database { url: args.value(0)? })
///             })
///             .build()
///     }
/// }
///
/// impl Injectable for UserService {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .constructor([param::<Database>("db")], |args| {
///                 Ok(UserService { db: args.service(0)? })
///             })
///             .build()
///     }
/// }
///
/// let container = Container::new();
/// container.register::<Database>().unwrap()
///     .as_singleton()
///     .with_value("url", "postgres://localhost");
///
/// let users = container.get_instance::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Describes how to construct and build up `Self`.
    fn descriptor() -> TypeDescriptor;
}

/// Constructor visibility. Non-public constructors are only eligible when
/// the container allows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

/// Identity of one constructor: owning type plus declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructorId {
    pub type_id: TypeId,
    pub index: usize,
}

pub(crate) type Invoker = Arc<dyn Fn(&Arguments) -> DiResult<AnyService> + Send + Sync>;
type Setter = Arc<dyn Fn(&AnyService, &Argument) -> Result<(), String> + Send + Sync>;
type Cast = Arc<dyn Fn(&AnyService) -> Option<AnyService> + Send + Sync>;

/// A named, typed constructor parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    name: &'static str,
    ty: TypeRef,
}

impl ParameterInfo {
    pub fn new(name: &'static str, ty: TypeRef) -> Self {
        Self { name, ty }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type.
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

/// Parameter of declared type `T`.
pub fn param<T: ?Sized + Resolvable>(name: &'static str) -> ParameterInfo {
    ParameterInfo::new(name, TypeRef::of::<T>())
}

/// Parameter receiving a [`LazyService<T>`] accessor.
pub fn lazy_param<T: ?Sized + Resolvable>(name: &'static str) -> ParameterInfo {
    ParameterInfo::new(name, TypeRef::lazy::<T>())
}

/// One declared constructor.
#[derive(Clone)]
pub struct ConstructorInfo {
    id: ConstructorId,
    type_name: &'static str,
    parameters: Vec<ParameterInfo>,
    preferred: bool,
    visibility: Visibility,
    invoke: Invoker,
}

impl ConstructorInfo {
    pub fn id(&self) -> ConstructorId {
        self.id
    }

    /// Name of the type this constructor builds.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Carries the preferred-constructor marker.
    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Visible under the given non-public policy.
    pub fn is_visible(&self, allow_non_public: bool) -> bool {
        self.visibility == Visibility::Public || allow_non_public
    }

    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoke
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("type_name", &self.type_name)
            .field("index", &self.id.index)
            .field("parameters", &self.parameters)
            .field("preferred", &self.preferred)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Injection marker on a property, with an optional lookup-name override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub name: Option<&'static str>,
}

/// A settable property.
#[derive(Clone)]
pub struct PropertyInfo {
    name: &'static str,
    ty: TypeRef,
    dependency: Option<Dependency>,
    setter: Setter,
}

impl PropertyInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type.
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// The injection marker, if the property carries one.
    pub fn dependency(&self) -> Option<&Dependency> {
        self.dependency.as_ref()
    }

    /// Name used for value-container lookups: the marker override, or the
    /// property name.
    pub fn lookup_name(&self) -> &'static str {
        self.dependency
            .and_then(|d| d.name)
            .unwrap_or(self.name)
    }

    pub(crate) fn assign(&self, target: &AnyService, value: &Argument) -> Result<(), String> {
        (self.setter)(target, value)
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("dependency", &self.dependency)
            .finish()
    }
}

/// Conversion from the described type to an abstract type it implements.
#[derive(Clone)]
pub struct Upcast {
    target: TypeId,
    target_name: &'static str,
    cast: Cast,
}

impl Upcast {
    pub fn target(&self) -> TypeId {
        self.target
    }

    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    pub(crate) fn apply(&self, service: &AnyService) -> Option<AnyService> {
        (self.cast)(service)
    }
}

/// Declarative metadata for one constructible type.
#[derive(Clone)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    constructors: Vec<ConstructorInfo>,
    properties: Vec<PropertyInfo>,
    interfaces: Vec<Upcast>,
}

impl TypeDescriptor {
    /// Starts describing `T`.
    pub fn builder<T: Injectable>() -> TypeBuilder<T> {
        TypeBuilder {
            descriptor: TypeDescriptor {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                constructors: Vec::new(),
                properties: Vec::new(),
                interfaces: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Constructors in declaration order.
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// All declared properties, marked or not.
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Properties carrying the injection marker.
    pub fn dependency_properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.iter().filter(|p| p.dependency.is_some())
    }

    /// Abstract types this type can be registered as.
    pub fn interfaces(&self) -> &[Upcast] {
        &self.interfaces
    }

    /// The described type itself, or one of its declared interfaces.
    pub fn is_assignable_to(&self, target: TypeId) -> bool {
        target == self.type_id || self.upcast_to(target).is_some()
    }

    pub fn upcast_to(&self, target: TypeId) -> Option<&Upcast> {
        self.interfaces.iter().find(|u| u.target == target)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .field(
                "interfaces",
                &self.interfaces.iter().map(|u| u.target_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Fluent builder for a [`TypeDescriptor`].
pub struct TypeBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> TypeBuilder<T> {
    /// Adds a public constructor.
    pub fn constructor<P, F>(self, parameters: P, f: F) -> Self
    where
        P: IntoIterator<Item = ParameterInfo>,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(parameters, f, false, Visibility::Public)
    }

    /// Adds a public parameterless constructor.
    pub fn default_constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.push_constructor(Vec::new(), move |_| Ok(f()), false, Visibility::Public)
    }

    /// Adds a public constructor carrying the preferred-constructor marker.
    pub fn preferred_constructor<P, F>(self, parameters: P, f: F) -> Self
    where
        P: IntoIterator<Item = ParameterInfo>,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(parameters, f, true, Visibility::Public)
    }

    /// Adds a constructor only eligible when non-public constructors are allowed.
    pub fn non_public_constructor<P, F>(self, parameters: P, f: F) -> Self
    where
        P: IntoIterator<Item = ParameterInfo>,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.push_constructor(parameters, f, false, Visibility::NonPublic)
    }

    fn push_constructor<P, F>(mut self, parameters: P, f: F, preferred: bool, visibility: Visibility) -> Self
    where
        P: IntoIterator<Item = ParameterInfo>,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        let index = self.descriptor.constructors.len();
        let invoke: Invoker = Arc::new(move |args: &Arguments| -> DiResult<AnyService> {
            Ok(AnyService::new(Arc::new(f(args)?)))
        });
        self.descriptor.constructors.push(ConstructorInfo {
            id: ConstructorId {
                type_id: self.descriptor.type_id,
                index,
            },
            type_name: self.descriptor.type_name,
            parameters: parameters.into_iter().collect(),
            preferred,
            visibility,
            invoke,
        });
        self
    }

    /// Declares that `T` can be registered as `R`.
    ///
    /// ```rust
    /// use ferrous_ioc::{interface, Injectable, TypeDescriptor};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {}
    /// interface!(dyn Greeter);
    ///
    /// struct English;
    /// impl Greeter for English {}
    ///
    /// impl Injectable for English {
    ///     fn descriptor() -> TypeDescriptor {
    ///         TypeDescriptor::builder::<Self>()
    ///             .default_constructor(|| English)
    ///             .implements::<dyn Greeter>(|this| this)
    ///             .build()
    ///     }
    /// }
    /// ```
    pub fn implements<R>(mut self, cast: fn(Arc<T>) -> Arc<R>) -> Self
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let erased: Cast = Arc::new(move |service: &AnyService| {
            service
                .downcast::<T>()
                .map(|concrete| AnyService::new(cast(concrete)))
        });
        self.descriptor.interfaces.push(Upcast {
            target: TypeId::of::<R>(),
            target_name: std::any::type_name::<R>(),
            cast: erased,
        });
        self
    }

    /// Declares a dependency property resolved by type during build-up.
    pub fn dependency<D, F>(self, name: &'static str, set: F) -> Self
    where
        D: ?Sized + Resolvable,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        self.service_property(name, Some(Dependency { name: None }), set)
    }

    /// Declares a dependency property resolved under `lookup_name`.
    pub fn dependency_named<D, F>(self, name: &'static str, lookup_name: &'static str, set: F) -> Self
    where
        D: ?Sized + Resolvable,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        self.service_property(name, Some(Dependency { name: Some(lookup_name) }), set)
    }

    /// Declares a property without the injection marker. Build-up ignores it.
    pub fn property<D, F>(self, name: &'static str, set: F) -> Self
    where
        D: ?Sized + Resolvable,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        self.service_property(name, None, set)
    }

    /// Declares a value-typed dependency property, filled from the owning
    /// registration's literals. `lookup_name` overrides the property name.
    pub fn value_dependency<V, F>(mut self, name: &'static str, lookup_name: Option<&'static str>, set: F) -> Self
    where
        V: ValueType + Resolvable,
        F: Fn(&T, V) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |target: &AnyService, value: &Argument| -> Result<(), String> {
            let target = downcast_target::<T>(target)?;
            set(&target, value.to_value::<V>()?);
            Ok(())
        });
        self.descriptor.properties.push(PropertyInfo {
            name,
            ty: TypeRef::of::<V>(),
            dependency: Some(Dependency { name: lookup_name }),
            setter,
        });
        self
    }

    /// Declares a dependency property receiving a lazy accessor.
    pub fn lazy_dependency<D, F>(mut self, name: &'static str, set: F) -> Self
    where
        D: ?Sized + Resolvable,
        F: Fn(&T, LazyService<D>) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |target: &AnyService, value: &Argument| -> Result<(), String> {
            let target = downcast_target::<T>(target)?;
            let lazy = value.to_service::<LazyService<D>>()?;
            set(&target, (*lazy).clone());
            Ok(())
        });
        self.descriptor.properties.push(PropertyInfo {
            name,
            ty: TypeRef::lazy::<D>(),
            dependency: Some(Dependency { name: None }),
            setter,
        });
        self
    }

    fn service_property<D, F>(mut self, name: &'static str, dependency: Option<Dependency>, set: F) -> Self
    where
        D: ?Sized + Resolvable,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |target: &AnyService, value: &Argument| -> Result<(), String> {
            let target = downcast_target::<T>(target)?;
            set(&target, value.to_service::<D>()?);
            Ok(())
        });
        self.descriptor.properties.push(PropertyInfo {
            name,
            ty: TypeRef::of::<D>(),
            dependency,
            setter,
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

fn downcast_target<T: 'static>(target: &AnyService) -> Result<Arc<T>, String> {
    target.downcast::<T>().ok_or_else(|| {
        format!(
            "build-up target is {}, not {}",
            target.type_name(),
            std::any::type_name::<T>()
        )
    })
}

/// Registration descriptor for introspection and diagnostics.
///
/// ```rust
/// use ferrous_ioc::{Container, RegistrationKindTag};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.register_instance_named::<u32>("port", Arc::new(8080)).unwrap();
///
/// let descriptors = container.registrations();
/// assert_eq!(descriptors.len(), 1);
/// assert_eq!(descriptors[0].kind, RegistrationKindTag::Instance);
/// assert_eq!(descriptors[0].key.name(), Some("port"));
/// assert!(!descriptors[0].is_cached);
/// ```
#[derive(Debug, Clone)]
pub struct RegistrationDescriptor {
    /// Requested type and name.
    pub key: Key,
    /// Registration kind.
    pub kind: RegistrationKindTag,
    /// Lifetime, for type registrations.
    pub lifetime: Option<Lifetime>,
    /// Implementation type name, for type registrations.
    pub implementation: Option<&'static str>,
    /// Whether the instance cache currently holds a value for the key.
    pub is_cached: bool,
    /// Number of literals in the registration's value container.
    pub value_count: usize,
}
