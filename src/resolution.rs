//! Parameter and property resolution, including auto-discovery.
//!
//! Each constructor parameter is supplied by the first rule that applies:
//!
//! 1. lazy accessor parameters get a [`LazyService`](crate::LazyService)
//!    that resolves on demand;
//! 2. a literal stored under the parameter name in the owning registration;
//! 3. the most recently added registration for the declared type, under any
//!    name;
//! 4. with auto-discovery on, value types get their default value, which is
//!    remembered in the owning registration;
//! 5. with auto-discovery on, concrete types are registered and resolved;
//! 6. otherwise the parameter is unresolvable.

use crate::arguments::{Argument, Arguments};
use crate::container::Container;
use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::internal::StackGuard;
use crate::key::Key;
use crate::registration::{Registration, RegistrationKind};
use crate::service::AnyService;
use crate::types::{TypeKind, TypeRef};
use std::sync::Arc;

/// Whether a resolution may use and fill the instance cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Cached,
    New,
}

impl Container {
    /// Resolves `(ty, name)`, auto-registering it when allowed.
    pub(crate) fn resolve(&self, ty: &TypeRef, name: Option<&'static str>, mode: Mode) -> DiResult<AnyService> {
        if let TypeKind::Lazy(target) = ty.kind() {
            return Ok(target.make(self.downgrade(), name));
        }
        let registration = self.lookup_or_discover(ty, ty.key(name))?;
        self.resolve_registration(&registration, mode)
    }

    fn lookup_or_discover(&self, ty: &TypeRef, key: Key) -> DiResult<Arc<Registration>> {
        if let Some(found) = self.inner.registry.read().get(&key) {
            return Ok(found.clone());
        }

        if !self.auto_discovery() {
            return Err(DiError::resolution(key, ResolutionFailure::NotRegistered));
        }
        match ty.kind() {
            TypeKind::Concrete(_) => self.auto_register(ty, key),
            TypeKind::Abstract => Err(DiError::resolution(key, ResolutionFailure::AbstractType)),
            _ => Err(DiError::resolution(key, ResolutionFailure::NotRegistered)),
        }
    }

    /// Registers a concrete type as transient on first reference. A
    /// registration stored concurrently under the same key wins.
    fn auto_register(&self, ty: &TypeRef, key: Key) -> DiResult<Arc<Registration>> {
        match self.store(Registration::auto(key, ty.clone())) {
            Ok(registration) => Ok(registration),
            Err(err) => self
                .inner
                .registry
                .read()
                .get(&key)
                .cloned()
                .ok_or(err),
        }
    }

    /// Produces a value for an existing registration and raises "resolved".
    pub(crate) fn resolve_registration(&self, registration: &Arc<Registration>, mode: Mode) -> DiResult<AnyService> {
        let key = *registration.key();
        let service = match registration.kind_ref() {
            RegistrationKind::Instance(instance) => {
                if mode == Mode::New {
                    return Err(DiError::resolution(key, ResolutionFailure::NotATypeRegistration));
                }
                self.inner.instances.try_add(registration, instance.clone()).1
            }
            RegistrationKind::Factory(factory) => {
                if mode == Mode::New {
                    return Err(DiError::resolution(key, ResolutionFailure::NotATypeRegistration));
                }
                let produced = {
                    let _guard = self.enter(key)?;
                    factory(self)?
                };
                if produced.type_id() != key.type_id() {
                    return Err(DiError::resolution(
                        key,
                        ResolutionFailure::TypeMismatch {
                            expected: key.type_name(),
                        },
                    ));
                }
                produced
            }
            RegistrationKind::Type { implementation, upcast } => {
                let cached = match mode {
                    Mode::Cached if registration.is_singleton() => self.inner.instances.try_get(&key),
                    _ => None,
                };
                match cached {
                    Some(hit) => {
                        tracing::trace!(container = self.inner.id, %key, "cache hit");
                        hit
                    }
                    None => {
                        let built = {
                            let _guard = self.enter(key)?;
                            self.construct(registration, implementation)?
                        };
                        let service = match upcast {
                            Some(upcast) => upcast.apply(&built).ok_or_else(|| {
                                DiError::resolution(
                                    key,
                                    ResolutionFailure::TypeMismatch {
                                        expected: key.type_name(),
                                    },
                                )
                            })?,
                            None => built,
                        };
                        match mode {
                            Mode::Cached => self.inner.instances.try_add(registration, service).1,
                            Mode::New => service,
                        }
                    }
                }
            }
        };

        self.notify_resolved(registration, &service);
        Ok(service)
    }

    fn enter(&self, key: Key) -> DiResult<StackGuard> {
        let max_depth = self.inner.options.read().max_resolution_depth.max(1);
        StackGuard::enter(self.inner.id, key, max_depth)
    }

    /// Builds one instance of `implementation` for `registration`.
    fn construct(&self, registration: &Registration, implementation: &TypeRef) -> DiResult<AnyService> {
        let allow_non_public = self.allow_non_public_constructors();
        let info = self
            .inner
            .type_info
            .type_information(implementation, allow_non_public)?;

        let mut arguments = Arguments::new(*registration.key());
        for parameter in info.parameters() {
            let argument = self.resolve_parameter(registration, parameter.name(), parameter.ty())?;
            arguments.push(parameter.name(), argument);
        }

        let strategy = self.inner.strategy.read().clone();
        tracing::trace!(
            container = self.inner.id,
            key = %registration.key(),
            implementation = implementation.name(),
            arity = arguments.len(),
            strategy = strategy.name(),
            "constructing"
        );
        strategy.create_instance(&info, &arguments, &self.inner.activators)
    }

    fn resolve_parameter(&self, owner: &Registration, name: &'static str, ty: &TypeRef) -> DiResult<Argument> {
        if let TypeKind::Lazy(target) = ty.kind() {
            return Ok(Argument::Service(target.make(self.downgrade(), None)));
        }

        if let Some(value) = owner.value(name) {
            return Ok(Argument::Value(value));
        }

        let latest = self.inner.registry.read().latest_for(ty.id()).cloned();
        if let Some(registration) = latest {
            return self
                .resolve_registration(&registration, Mode::Cached)
                .map(Argument::Service);
        }

        if self.auto_discovery() {
            match ty.kind() {
                TypeKind::Value(kind) => {
                    let value = owner.remember_value(name, kind.default_value());
                    tracing::debug!(
                        container = self.inner.id,
                        key = %owner.key(),
                        parameter = name,
                        %value,
                        "supplied default value"
                    );
                    return Ok(Argument::Value(value));
                }
                TypeKind::Concrete(_) => {
                    return self.resolve(ty, None, Mode::Cached).map(Argument::Service);
                }
                _ => {}
            }
        }

        Err(DiError::resolution(
            *owner.key(),
            ResolutionFailure::UnresolvableParameter {
                parameter: name,
                type_name: ty.name(),
            },
        ))
    }

    /// Injects the dependency-marked properties of `target`, an instance of
    /// the concrete type `ty`.
    pub(crate) fn inject_properties(
        &self,
        ty: &TypeRef,
        target: &AnyService,
        name: Option<&'static str>,
    ) -> DiResult<()> {
        let key = ty.key(name);
        let descriptor = self
            .inner
            .type_info
            .descriptor(ty)
            .ok_or_else(|| DiError::resolution(key, ResolutionFailure::AbstractType))?;
        let owner = self.inner.registry.read().get(&key).cloned();

        for (index, property) in descriptor.dependency_properties().enumerate() {
            let override_name = property.dependency().and_then(|d| d.name);
            let argument = match property.ty().kind() {
                TypeKind::Value(_) => {
                    match owner.as_ref().and_then(|o| o.value(property.lookup_name())) {
                        Some(value) => Argument::Value(value),
                        None => continue,
                    }
                }
                TypeKind::Lazy(target) => Argument::Service(target.make(self.downgrade(), override_name)),
                _ => Argument::Service(self.resolve(property.ty(), override_name, Mode::Cached)?),
            };

            property.assign(target, &argument).map_err(|message| {
                DiError::resolution(
                    key,
                    ResolutionFailure::InvalidArgument {
                        index,
                        parameter: property.name(),
                        message,
                    },
                )
            })?;
            tracing::trace!(container = self.inner.id, %key, property = property.name(), "injected property");
        }
        Ok(())
    }
}
