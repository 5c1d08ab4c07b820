//! The container facade.
//!
//! [`Container`] composes the registry, the type information cache, the
//! activation strategy, the parameter resolver and the instance cache behind
//! one handle. It is cheap to clone; clones share the same state.

mod global;
mod options;

pub use global::global;
pub use options::{RegistrationOptions, TypeRegistrationOptions};

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::activation::{ActivationKind, ActivationStrategy, ActivatorCache};
use crate::config::ContainerOptions;
use crate::descriptors::{Injectable, RegistrationDescriptor};
use crate::error::{DiError, DiResult, RegistrationFailure, ResolutionFailure};
use crate::instance_cache::InstanceCache;
use crate::key::Key;
use crate::observer::{ContainerObserver, FnObserver, Observers, SubscriptionId};
use crate::registration::{FactoryFn, Registration, RegistrationKind, Registry};
use crate::resolution::Mode;
use crate::service::AnyService;
use crate::type_info::TypeInfoCache;
use crate::types::{Resolvable, TypeRef};

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) struct ContainerInner {
    pub(crate) id: usize,
    pub(crate) registry: RwLock<Registry>,
    pub(crate) type_info: TypeInfoCache,
    pub(crate) instances: InstanceCache,
    pub(crate) activators: ActivatorCache,
    pub(crate) strategy: RwLock<Arc<dyn ActivationStrategy>>,
    pub(crate) options: RwLock<ContainerOptions>,
    pub(crate) observers: RwLock<Observers>,
}

/// Inversion-of-control container.
///
/// Registrations are keyed by (requested type, name). Resolving a key
/// returns the stored instance, calls the factory, or constructs the
/// implementation type through its [`TypeDescriptor`](crate::TypeDescriptor),
/// resolving constructor parameters recursively.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{interface, param, Container, Injectable, TypeDescriptor};
/// use std::sync::Arc;
///
/// trait Repository: Send + Sync {
///     fn find(&self, id: u32) -> String;
/// }
/// interface!(dyn Repository);
///
/// struct MemoryRepository;
/// impl Repository for MemoryRepository {
///     fn find(&self, id: u32) -> String { format!("user-{}", id) }
/// }
///
/// impl Injectable for MemoryRepository {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .default_constructor(|| MemoryRepository)
///             .implements::<dyn Repository>(|this| this)
///             .build()
///     }
/// }
///
/// struct UserService { repository: Arc<dyn Repository> }
///
/// impl Injectable for UserService {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .constructor([param::<dyn Repository>("repository")], |args| {
///                 Ok(UserService { repository: args.service(0)? })
///             })
///             .build()
///     }
/// }
///
/// let container = Container::new();
/// container
///     .register_type::<dyn Repository, MemoryRepository>()
///     .unwrap()
///     .as_singleton();
///
/// // UserService is not registered: auto-discovery registers it on first use.
/// let users = container.get_instance::<UserService>().unwrap();
/// assert_eq!(users.repository.find(7), "user-7");
/// assert!(container.is_registered::<UserService>());
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

/// Non-owning handle to a [`Container`].
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ContainerInner>,
}

impl WeakContainer {
    /// The container, if it is still alive.
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl fmt::Debug for WeakContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContainer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("registrations", &self.inner.registry.read().len())
            .field("cached", &self.inner.instances.len())
            .field("options", &*self.inner.options.read())
            .finish()
    }
}

impl Container {
    /// Creates a container with default options: auto-discovery on,
    /// public constructors only, compiled activation.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(container = id, ?options, "created container");
        Self {
            inner: Arc::new(ContainerInner {
                id,
                registry: RwLock::new(Registry::new()),
                type_info: TypeInfoCache::new(),
                instances: InstanceCache::new(),
                activators: ActivatorCache::new(),
                strategy: RwLock::new(options.activation.strategy()),
                options: RwLock::new(options),
                observers: RwLock::new(Observers::new()),
            }),
        }
    }

    /// Weak handle that does not keep the container alive.
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Process-unique id of this container.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Returns true if both handles share the same state.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ----- Settings -------------------------------------------------------

    /// Snapshot of the current settings.
    pub fn options(&self) -> ContainerOptions {
        self.inner.options.read().clone()
    }

    pub fn auto_discovery(&self) -> bool {
        self.inner.options.read().auto_discovery
    }

    pub fn set_auto_discovery(&self, enabled: bool) {
        self.inner.options.write().auto_discovery = enabled;
    }

    pub fn allow_non_public_constructors(&self) -> bool {
        self.inner.options.read().allow_non_public_constructors
    }

    pub fn set_allow_non_public_constructors(&self, allowed: bool) {
        self.inner.options.write().allow_non_public_constructors = allowed;
    }

    /// Switches to a built-in activation strategy. Compiled activators are
    /// kept.
    pub fn set_activation(&self, kind: ActivationKind) {
        self.inner.options.write().activation = kind;
        *self.inner.strategy.write() = kind.strategy();
        tracing::debug!(container = self.inner.id, ?kind, "activation strategy changed");
    }

    /// Installs a custom activation strategy.
    pub fn set_activation_strategy(&self, strategy: Arc<dyn ActivationStrategy>) {
        tracing::debug!(
            container = self.inner.id,
            strategy = strategy.name(),
            "activation strategy changed"
        );
        *self.inner.strategy.write() = strategy;
    }

    /// Name of the active strategy.
    pub fn activation_strategy_name(&self) -> &'static str {
        self.inner.strategy.read().name()
    }

    /// The container's compiled activators.
    pub fn activators(&self) -> &ActivatorCache {
        &self.inner.activators
    }

    // ----- Registration ---------------------------------------------------

    /// Returns true if the default name of `T` is registered.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered_key(&Key::of::<T>())
    }

    pub fn is_registered_named<T: ?Sized + 'static>(&self, name: &'static str) -> bool {
        self.is_registered_key(&Key::named::<T>(name))
    }

    pub fn is_registered_key(&self, key: &Key) -> bool {
        self.inner.registry.read().contains_key(key)
    }

    /// Registers `I` as the implementation of `R` under the default name.
    ///
    /// Fails if `I` is neither `R` itself nor declares `R` through
    /// [`implements`](crate::TypeBuilder::implements), or if the key is
    /// taken.
    pub fn register_type<R, I>(&self) -> DiResult<TypeRegistrationOptions<R>>
    where
        R: ?Sized + Resolvable,
        I: Injectable,
    {
        self.register_type_key::<R, I>(None)
    }

    pub fn register_type_named<R, I>(&self, name: &'static str) -> DiResult<TypeRegistrationOptions<R>>
    where
        R: ?Sized + Resolvable,
        I: Injectable,
    {
        self.register_type_key::<R, I>(Some(name))
    }

    /// Registers `T` as its own implementation.
    pub fn register<T: Injectable>(&self) -> DiResult<TypeRegistrationOptions<T>> {
        self.register_type_key::<T, T>(None)
    }

    pub fn register_named<T: Injectable>(&self, name: &'static str) -> DiResult<TypeRegistrationOptions<T>> {
        self.register_type_key::<T, T>(Some(name))
    }

    fn register_type_key<R, I>(&self, name: Option<&'static str>) -> DiResult<TypeRegistrationOptions<R>>
    where
        R: ?Sized + Resolvable,
        I: Injectable,
    {
        let registration = self.register_type_ref(&TypeRef::of::<R>(), &TypeRef::concrete::<I>(), name)?;
        Ok(TypeRegistrationOptions::new(registration))
    }

    /// Registers `implementation` for `requested` without static types.
    pub fn register_type_ref(
        &self,
        requested: &TypeRef,
        implementation: &TypeRef,
        name: Option<&'static str>,
    ) -> DiResult<Arc<Registration>> {
        let key = requested.key(name);
        let descriptor = self.inner.type_info.descriptor(implementation).ok_or_else(|| {
            DiError::registration(
                key,
                RegistrationFailure::NotConstructible {
                    implementation: implementation.name(),
                },
            )
        })?;

        let upcast = if requested.id() == implementation.id() {
            None
        } else {
            let upcast = descriptor.upcast_to(requested.id()).cloned().ok_or_else(|| {
                DiError::registration(
                    key,
                    RegistrationFailure::NotAssignable {
                        implementation: implementation.name(),
                    },
                )
            })?;
            Some(upcast)
        };

        self.store(Registration::new(
            key,
            RegistrationKind::Type {
                implementation: implementation.clone(),
                upcast,
            },
        ))
    }

    /// Registers a pre-built instance under the default name.
    pub fn register_instance<T: ?Sized + Resolvable>(&self, instance: Arc<T>) -> DiResult<RegistrationOptions<T>> {
        self.register_instance_key(None, instance)
    }

    pub fn register_instance_named<T: ?Sized + Resolvable>(
        &self,
        name: &'static str,
        instance: Arc<T>,
    ) -> DiResult<RegistrationOptions<T>> {
        self.register_instance_key(Some(name), instance)
    }

    fn register_instance_key<T: ?Sized + Resolvable>(
        &self,
        name: Option<&'static str>,
        instance: Arc<T>,
    ) -> DiResult<RegistrationOptions<T>> {
        let key = TypeRef::of::<T>().key(name);
        let registration = self.store(Registration::new(
            key,
            RegistrationKind::Instance(AnyService::new(instance)),
        ))?;
        Ok(RegistrationOptions::new(registration))
    }

    /// Registers a producer called on every resolution. Its results are never
    /// cached.
    pub fn register_factory<T, F>(&self, factory: F) -> DiResult<RegistrationOptions<T>>
    where
        T: ?Sized + Resolvable,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.register_factory_key(None, Arc::new(move |_: &Container| -> DiResult<AnyService> { Ok(AnyService::new(factory())) }))
    }

    pub fn register_factory_named<T, F>(&self, name: &'static str, factory: F) -> DiResult<RegistrationOptions<T>>
    where
        T: ?Sized + Resolvable,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.register_factory_key(Some(name), Arc::new(move |_: &Container| -> DiResult<AnyService> { Ok(AnyService::new(factory())) }))
    }

    /// Registers a producer that may resolve its own dependencies.
    ///
    /// ```rust
    /// use ferrous_ioc::Container;
    /// use std::sync::Arc;
    ///
    /// let container = Container::new();
    /// container.register_instance_named::<String>("host", Arc::new("localhost".into())).unwrap();
    /// container
    ///     .register_factory_with::<String, _>(|c| {
    ///         let host = c.get_instance_named::<String>("host")?;
    ///         Ok(Arc::new(format!("http://{}:8080", host)))
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(*container.get_instance::<String>().unwrap(), "http://localhost:8080");
    /// ```
    pub fn register_factory_with<T, F>(&self, factory: F) -> DiResult<RegistrationOptions<T>>
    where
        T: ?Sized + Resolvable,
        F: Fn(&Container) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register_factory_key(None, Arc::new(move |c: &Container| -> DiResult<AnyService> { factory(c).map(AnyService::new) }))
    }

    pub fn register_factory_with_named<T, F>(&self, name: &'static str, factory: F) -> DiResult<RegistrationOptions<T>>
    where
        T: ?Sized + Resolvable,
        F: Fn(&Container) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.register_factory_key(Some(name), Arc::new(move |c: &Container| -> DiResult<AnyService> { factory(c).map(AnyService::new) }))
    }

    fn register_factory_key<T: ?Sized + Resolvable>(
        &self,
        name: Option<&'static str>,
        factory: FactoryFn,
    ) -> DiResult<RegistrationOptions<T>> {
        let key = TypeRef::of::<T>().key(name);
        let registration = self.store(Registration::new(key, RegistrationKind::Factory(factory)))?;
        Ok(RegistrationOptions::new(registration))
    }

    /// Stores a registration and raises "registered".
    pub(crate) fn store(&self, registration: Registration) -> DiResult<Arc<Registration>> {
        let registration = Arc::new(registration);
        let key = *registration.key();
        if !self.inner.registry.write().insert(registration.clone()) {
            return Err(DiError::registration(key, RegistrationFailure::Duplicate));
        }
        tracing::debug!(
            container = self.inner.id,
            %key,
            kind = %registration.kind(),
            auto = registration.is_auto_registered(),
            "registered"
        );
        self.notify_registered(&registration);
        Ok(registration)
    }

    /// Removes one key, evicting its cached instance and type information.
    /// Returns whether the key was registered.
    pub fn unregister<T: ?Sized + 'static>(&self) -> bool {
        self.unregister_key(&Key::of::<T>())
    }

    pub fn unregister_named<T: ?Sized + 'static>(&self, name: &'static str) -> bool {
        self.unregister_key(&Key::named::<T>(name))
    }

    pub fn unregister_key(&self, key: &Key) -> bool {
        let removed = self.inner.registry.write().remove(key);
        match removed {
            Some(registration) => {
                self.evict(&registration);
                tracing::debug!(container = self.inner.id, %key, "unregistered");
                true
            }
            None => false,
        }
    }

    /// Removes every name registered under `T`. Returns how many were removed.
    pub fn unregister_all<T: ?Sized + 'static>(&self) -> usize {
        self.unregister_all_of(TypeId::of::<T>())
    }

    pub fn unregister_all_of(&self, type_id: TypeId) -> usize {
        let removed = self.inner.registry.write().remove_type(type_id);
        self.inner.instances.remove_type(type_id);
        for implementation in removed.iter().filter_map(|r| r.implementation()) {
            self.inner.type_info.remove(implementation.id());
        }
        if !removed.is_empty() {
            tracing::debug!(container = self.inner.id, count = removed.len(), "unregistered all names");
        }
        removed.len()
    }

    fn evict(&self, registration: &Registration) {
        self.inner.instances.remove(registration.key());
        if let Some(implementation) = registration.implementation() {
            self.inner.type_info.remove(implementation.id());
        }
    }

    /// Empties the instance cache and the type information cache.
    /// Registrations are kept.
    pub fn clear_cache(&self) {
        self.inner.instances.clear();
        self.inner.type_info.clear();
        tracing::debug!(container = self.inner.id, "cleared caches");
    }

    /// Removes every registration and empties all caches, compiled
    /// activators included. Settings and subscriptions are kept.
    pub fn clear(&self) {
        self.inner.registry.write().clear();
        self.inner.instances.clear();
        self.inner.type_info.clear();
        self.inner.activators.clear();
        tracing::debug!(container = self.inner.id, "cleared container");
    }

    // ----- Resolution -----------------------------------------------------

    /// Resolves the default name of `T`.
    ///
    /// Singleton type registrations and instance registrations are cached
    /// after their first resolution; factories run every call. With
    /// auto-discovery on, an unregistered concrete `T` is registered first.
    pub fn get_instance<T: ?Sized + Resolvable>(&self) -> DiResult<Arc<T>> {
        self.get_instance_of_name::<T>(None)
    }

    pub fn get_instance_named<T: ?Sized + Resolvable>(&self, name: &'static str) -> DiResult<Arc<T>> {
        self.get_instance_of_name::<T>(Some(name))
    }

    /// Resolves `T` under an optional name.
    pub fn get_instance_of_name<T: ?Sized + Resolvable>(&self, name: Option<&'static str>) -> DiResult<Arc<T>> {
        let ty = TypeRef::of::<T>();
        let service = self.resolve(&ty, name, Mode::Cached)?;
        downcast::<T>(service, ty.key(name))
    }

    /// Erased resolution.
    pub fn get_instance_of(&self, ty: &TypeRef, name: Option<&'static str>) -> DiResult<AnyService> {
        self.resolve(ty, name, Mode::Cached)
    }

    /// Constructs a fresh `T`, bypassing the instance cache.
    ///
    /// Fails with `NotATypeRegistration` for instance and factory
    /// registrations.
    pub fn get_new_instance<T: ?Sized + Resolvable>(&self) -> DiResult<Arc<T>> {
        self.get_new_instance_of_name::<T>(None)
    }

    pub fn get_new_instance_named<T: ?Sized + Resolvable>(&self, name: &'static str) -> DiResult<Arc<T>> {
        self.get_new_instance_of_name::<T>(Some(name))
    }

    fn get_new_instance_of_name<T: ?Sized + Resolvable>(&self, name: Option<&'static str>) -> DiResult<Arc<T>> {
        let ty = TypeRef::of::<T>();
        let service = self.resolve(&ty, name, Mode::New)?;
        downcast::<T>(service, ty.key(name))
    }

    /// Resolves every registration under `T`, oldest first.
    pub fn get_all_instances<T: ?Sized + Resolvable>(&self) -> DiResult<Vec<Arc<T>>> {
        let registrations = self.inner.registry.read().all_for(TypeId::of::<T>());
        registrations
            .iter()
            .map(|registration| {
                let service = self.resolve_registration(registration, Mode::Cached)?;
                downcast::<T>(service, *registration.key())
            })
            .collect()
    }

    /// Resolves the default name of `T`, then injects its dependency
    /// properties.
    pub fn build_up<T: Injectable>(&self) -> DiResult<Arc<T>> {
        self.build_up_of_name::<T>(None)
    }

    pub fn build_up_named<T: Injectable>(&self, name: &'static str) -> DiResult<Arc<T>> {
        self.build_up_of_name::<T>(Some(name))
    }

    fn build_up_of_name<T: Injectable>(&self, name: Option<&'static str>) -> DiResult<Arc<T>> {
        let instance = self.get_instance_of_name::<T>(name)?;
        self.build_up_instance(&instance, name)?;
        Ok(instance)
    }

    /// Injects the dependency properties of an existing instance.
    ///
    /// Literals come from the registration of `(T, name)`, when one exists.
    pub fn build_up_instance<T: Injectable>(&self, instance: &Arc<T>, name: Option<&'static str>) -> DiResult<()> {
        self.inject_properties(&TypeRef::concrete::<T>(), &AnyService::new(instance.clone()), name)
    }

    /// Returns true if the default name of `T` holds a cached instance.
    pub fn is_cached<T: ?Sized + 'static>(&self) -> bool {
        self.inner.instances.is_cached(&Key::of::<T>())
    }

    pub fn is_cached_named<T: ?Sized + 'static>(&self, name: &'static str) -> bool {
        self.inner.instances.is_cached(&Key::named::<T>(name))
    }

    /// Cached instance for `key`; fails with `NotCached` when absent.
    pub fn cached_instance(&self, key: &Key) -> DiResult<AnyService> {
        self.inner.instances.get(key)
    }

    // ----- Introspection --------------------------------------------------

    /// The stored registration of `T` under `name`.
    pub fn registration<T: ?Sized + 'static>(&self, name: Option<&'static str>) -> Option<Arc<Registration>> {
        let key = Key::of::<T>().with_name(name);
        self.inner.registry.read().get(&key).cloned()
    }

    /// Descriptors of every registration, in registration order.
    pub fn registrations(&self) -> Vec<RegistrationDescriptor> {
        let snapshot = self.inner.registry.read().snapshot();
        snapshot
            .iter()
            .map(|registration| RegistrationDescriptor {
                key: *registration.key(),
                kind: registration.kind(),
                lifetime: registration.implementation().map(|_| registration.lifetime()),
                implementation: registration.implementation().map(TypeRef::name),
                is_cached: self.inner.instances.is_cached(registration.key()),
                value_count: registration.value_count(),
            })
            .collect()
    }

    // ----- Observers ------------------------------------------------------

    pub fn subscribe(&self, observer: Arc<dyn ContainerObserver>) -> SubscriptionId {
        self.inner.observers.write().add(observer)
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.write().remove(id)
    }

    /// Subscribes a closure to "registered".
    pub fn on_registered<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Registration) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver::Registered(Box::new(callback))))
    }

    /// Subscribes a closure to "resolved".
    pub fn on_resolved<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Registration, &AnyService) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver::Resolved(Box::new(callback))))
    }

    fn notify_registered(&self, registration: &Registration) {
        let observers = {
            let observers = self.inner.observers.read();
            if observers.is_empty() {
                return;
            }
            observers.snapshot()
        };
        for observer in observers {
            observer.registered(registration);
        }
    }

    pub(crate) fn notify_resolved(&self, registration: &Registration, instance: &AnyService) {
        if let Some(callback) = registration.on_resolved() {
            callback(registration, instance);
        }
        let observers = {
            let observers = self.inner.observers.read();
            if observers.is_empty() {
                return;
            }
            observers.snapshot()
        };
        for observer in observers {
            observer.resolved(registration, instance);
        }
    }
}

fn downcast<T: ?Sized + 'static>(service: AnyService, key: Key) -> DiResult<Arc<T>> {
    service.downcast::<T>().ok_or_else(|| {
        DiError::resolution(
            key,
            ResolutionFailure::TypeMismatch {
                expected: std::any::type_name::<T>(),
            },
        )
    })
}
