//! # ferrous-ioc
//!
//! Runtime inversion-of-control container: registers type, instance and
//! factory bindings keyed by (type, name), builds object graphs through
//! constructor injection, injects marked properties on demand, and manages
//! singleton and transient lifetimes.
//!
//! ## Features
//!
//! - **Declarative metadata**: types describe their constructors and
//!   injectable properties once through [`Injectable`]; no runtime reflection
//! - **Constructor selection**: preferred marker, else most parameters
//! - **Literal values**: per-registration [`ValueContainer`]s feed value-typed
//!   parameters by name
//! - **Auto-discovery**: unregistered concrete types are registered on first
//!   use; trait objects never are
//! - **Swappable activation**: compiled or reflective, switchable at runtime
//! - **Cycle detection**: circular graphs fail with the full path instead of
//!   overflowing the stack
//! - **Notifications**: observe every registration and resolution
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{param, Container, Injectable, TypeDescriptor};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! impl Injectable for Database {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .constructor([param::<String>("connection_string")], |args| {
//!                 Ok(Database { connection_string: args.value(0)? })
//!             })
//!             .build()
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .constructor([param::<Database>("db")], |args| {
//!                 Ok(UserService { db: args.service(0)? })
//!             })
//!             .build()
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register::<Database>()
//!     .unwrap()
//!     .as_singleton()
//!     .with_value("connection_string", "postgres://localhost");
//!
//! let user_service = container.get_instance::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient** (default): a new instance per resolution
//! - **Singleton**: the first instance is cached until the key is
//!   unregistered or the cache cleared
//!
//! Instance registrations always hand out their instance; factory
//! registrations run on every resolution and are never cached.
//!
//! ## Trait Resolution
//!
//! ```rust
//! use ferrous_ioc::{interface, Container, Injectable, TypeDescriptor};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//! interface!(dyn Logger);
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! impl Injectable for ConsoleLogger {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .default_constructor(|| ConsoleLogger)
//!             .implements::<dyn Logger>(|this| this)
//!             .build()
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_type::<dyn Logger, ConsoleLogger>().unwrap();
//!
//! let logger = container.get_instance::<dyn Logger>().unwrap();
//! assert_eq!(logger.log("Hello"), "[LOG] Hello");
//! ```
//!
//! ## Property Injection
//!
//! ```rust
//! use ferrous_ioc::{Container, Injectable, TypeDescriptor};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! struct Clock;
//! impl Injectable for Clock {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>().default_constructor(|| Clock).build()
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Page {
//!     clock: Mutex<Option<Arc<Clock>>>,
//!     title: Mutex<String>,
//! }
//!
//! impl Injectable for Page {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .default_constructor(Page::default)
//!             .dependency::<Clock, _>("clock", |page, clock| *page.clock.lock() = Some(clock))
//!             .value_dependency::<String, _>("title", None, |page, title| *page.title.lock() = title)
//!             .build()
//!     }
//! }
//!
//! let container = Container::new();
//! container.register::<Page>().unwrap().with_value("title", "Home");
//!
//! let page = container.build_up::<Page>().unwrap();
//! assert!(page.clock.lock().is_some());
//! assert_eq!(*page.title.lock(), "Home");
//! ```

pub mod activation;
pub mod arguments;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lazy;
pub mod lifetime;
pub mod observer;
pub mod registration;
pub mod service;
pub mod type_info;
pub mod types;
pub mod value;

// Internal modules
mod instance_cache;
mod internal;
mod resolution;

// Re-export core types
pub use activation::{
    ActivationKind, ActivationStrategy, Activator, ActivatorCache, CompiledActivation, ReflectiveActivation,
};
pub use arguments::{Argument, Arguments};
pub use config::{ContainerOptions, DEFAULT_MAX_RESOLUTION_DEPTH};
pub use container::{global, Container, RegistrationOptions, TypeRegistrationOptions, WeakContainer};
pub use descriptors::{
    lazy_param, param, ConstructorId, ConstructorInfo, Dependency, Injectable, ParameterInfo, PropertyInfo,
    RegistrationDescriptor, TypeBuilder, TypeDescriptor, Upcast, Visibility,
};
pub use error::{DiError, DiResult, RegistrationFailure, ResolutionFailure};
pub use key::{Key, DEFAULT_NAME};
pub use lazy::LazyService;
pub use lifetime::Lifetime;
pub use observer::{ContainerObserver, LoggingObserver, SubscriptionId};
pub use registration::{FactoryFn, Registration, RegistrationKindTag, ResolvedCallback};
pub use service::AnyService;
pub use type_info::{select_constructor, TypeInformation};
pub use types::{LazyTarget, Resolvable, TypeKind, TypeRef};
pub use value::{Value, ValueContainer, ValueKind, ValueType};
