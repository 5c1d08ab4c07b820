//! Fluent handles returned by register calls.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::Registration;
use crate::service::AnyService;
use crate::value::{Value, ValueContainer};

/// Options for a type registration.
///
/// Every method mutates the stored registration in place, so the handle can
/// be dropped at any point. Configure before the first resolution: an
/// instance that is already cached keeps the state it was built with.
///
/// ```rust
/// use ferrous_ioc::{param, Container, Injectable, Lifetime, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Greeter { greeting: String }
///
/// impl Injectable for Greeter {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>()
///             .constructor([param::<String>("greeting")], |args| {
///                 Ok(Greeter { greeting: args.value(0)? })
///             })
///             .build()
///     }
/// }
///
/// let container = Container::new();
/// let options = container
///     .register::<Greeter>()
///     .unwrap()
///     .as_singleton()
///     .with_value("greeting", "hello");
/// assert_eq!(options.registration().lifetime(), Lifetime::Singleton);
///
/// assert_eq!(container.get_instance::<Greeter>().unwrap().greeting, "hello");
/// ```
pub struct TypeRegistrationOptions<R: ?Sized = dyn Any + Send + Sync> {
    registration: Arc<Registration>,
    _marker: PhantomData<fn() -> Arc<R>>,
}

/// Options for an instance or factory registration.
pub struct RegistrationOptions<R: ?Sized = dyn Any + Send + Sync> {
    registration: Arc<Registration>,
    _marker: PhantomData<fn() -> Arc<R>>,
}

macro_rules! shared_options {
    ($handle:ident) => {
        impl<R: ?Sized + 'static> $handle<R> {
            pub(crate) fn new(registration: Arc<Registration>) -> Self {
                Self {
                    registration,
                    _marker: PhantomData,
                }
            }

            /// The stored registration.
            pub fn registration(&self) -> &Arc<Registration> {
                &self.registration
            }

            pub fn key(&self) -> &Key {
                self.registration.key()
            }

            /// Runs `callback` after every successful resolution of this key,
            /// before global observers are notified.
            pub fn on_resolved<F>(self, callback: F) -> Self
            where
                F: Fn(&Registration, Arc<R>) + Send + Sync + 'static,
            {
                self.registration
                    .set_on_resolved(Arc::new(move |registration: &Registration, instance: &AnyService| {
                        if let Some(typed) = instance.downcast::<R>() {
                            callback(registration, typed);
                        }
                    }));
                self
            }

            /// Untyped form of [`on_resolved`](Self::on_resolved).
            pub fn on_resolved_any<F>(self, callback: F) -> Self
            where
                F: Fn(&Registration, &AnyService) + Send + Sync + 'static,
            {
                self.registration.set_on_resolved(Arc::new(callback));
                self
            }

            /// Merges `values` into the registration's literals.
            pub fn with_values(self, values: ValueContainer) -> Self {
                self.registration.merge_values(values);
                self
            }

            /// Sets one literal.
            pub fn with_value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
                self.registration.insert_value(name, value.into());
                self
            }
        }

        impl<R: ?Sized> fmt::Debug for $handle<R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("registration", &self.registration)
                    .finish()
            }
        }
    };
}

shared_options!(TypeRegistrationOptions);
shared_options!(RegistrationOptions);

impl<R: ?Sized + 'static> TypeRegistrationOptions<R> {
    /// Caches the first constructed instance.
    pub fn as_singleton(self) -> Self {
        self.registration.set_lifetime(Lifetime::Singleton);
        self
    }

    /// Constructs a new instance on every resolution. This is the default.
    pub fn as_transient(self) -> Self {
        self.registration.set_lifetime(Lifetime::Transient);
        self
    }

    pub fn lifetime(self, lifetime: Lifetime) -> Self {
        self.registration.set_lifetime(lifetime);
        self
    }
}
