//! Object creation strategies.
//!
//! A strategy turns a selected constructor plus resolved arguments into an
//! instance. Two are built in:
//!
//! - [`CompiledActivation`] compiles an activator per constructor the first
//!   time it is used and reuses it afterwards.
//! - [`ReflectiveActivation`] checks every argument against the constructor's
//!   parameter descriptors and invokes it directly, every time.
//!
//! Compiled activators live in the container's [`ActivatorCache`], keyed by
//! constructor identity, so swapping strategies at runtime keeps them.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::arguments::{Argument, Arguments};
use crate::descriptors::{ConstructorId, ConstructorInfo, Invoker, ParameterInfo};
use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::internal::FastMap;
use crate::service::AnyService;
use crate::type_info::TypeInformation;
use crate::types::TypeKind;

/// Built-in strategy selector used by [`ContainerOptions`](crate::ContainerOptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum ActivationKind {
    /// [`CompiledActivation`]
    #[default]
    Compiled,
    /// [`ReflectiveActivation`]
    Reflective,
}

impl ActivationKind {
    pub(crate) fn strategy(self) -> Arc<dyn ActivationStrategy> {
        match self {
            ActivationKind::Compiled => Arc::new(CompiledActivation),
            ActivationKind::Reflective => Arc::new(ReflectiveActivation),
        }
    }
}

/// Creates instances from a constructor descriptor and its arguments.
///
/// Implementations must produce the same instance as a direct call of the
/// constructor with the same arguments.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{
///     ActivationStrategy, ActivatorCache, AnyService, Arguments, Container, DiResult,
///     Injectable, TypeDescriptor, TypeInformation,
/// };
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct Counting(AtomicUsize);
///
/// impl ActivationStrategy for Counting {
///     fn name(&self) -> &'static str { "counting" }
///
///     fn create_instance(
///         &self,
///         info: &TypeInformation,
///         arguments: &Arguments,
///         activators: &ActivatorCache,
///     ) -> DiResult<AnyService> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         activators.get_or_compile(info.constructor()).activate(arguments)
///     }
/// }
///
/// struct Job;
/// impl Injectable for Job {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::builder::<Self>().default_constructor(|| Job).build()
///     }
/// }
///
/// let strategy = Arc::new(Counting(AtomicUsize::new(0)));
/// let container = Container::new();
/// container.set_activation_strategy(strategy.clone());
/// container.get_instance::<Job>().unwrap();
/// container.get_instance::<Job>().unwrap();
/// assert_eq!(strategy.0.load(Ordering::SeqCst), 2);
/// ```
pub trait ActivationStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Builds one instance of the type described by `info`.
    fn create_instance(
        &self,
        info: &TypeInformation,
        arguments: &Arguments,
        activators: &ActivatorCache,
    ) -> DiResult<AnyService>;
}

/// A compiled constructor call: the invoker plus the argument plan it was
/// compiled against.
pub struct Activator {
    id: ConstructorId,
    type_name: &'static str,
    arity: usize,
    invoke: Invoker,
}

impl Activator {
    fn compile(constructor: &ConstructorInfo) -> Self {
        Self {
            id: constructor.id(),
            type_name: constructor.type_name(),
            arity: constructor.arity(),
            invoke: constructor.invoker().clone(),
        }
    }

    pub fn id(&self) -> ConstructorId {
        self.id
    }

    /// Calls the constructor. Only the argument count is checked.
    pub fn activate(&self, arguments: &Arguments) -> DiResult<AnyService> {
        if arguments.len() != self.arity {
            return Err(DiError::resolution(
                *arguments.owner(),
                ResolutionFailure::InvalidArgument {
                    index: arguments.len(),
                    parameter: "?",
                    message: format!(
                        "{} expects {} arguments, got {}",
                        self.type_name,
                        self.arity,
                        arguments.len()
                    ),
                },
            ));
        }
        (self.invoke)(arguments)
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("type_name", &self.type_name)
            .field("index", &self.id.index)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Compiled activators of one container, keyed by constructor identity.
#[derive(Default)]
pub struct ActivatorCache {
    activators: RwLock<FastMap<ConstructorId, Arc<Activator>>>,
}

impl ActivatorCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The activator for `constructor`, compiling it on first use.
    pub fn get_or_compile(&self, constructor: &ConstructorInfo) -> Arc<Activator> {
        if let Some(found) = self.activators.read().get(&constructor.id()) {
            return found.clone();
        }
        let mut activators = self.activators.write();
        activators
            .entry(constructor.id())
            .or_insert_with(|| {
                tracing::trace!(
                    type_name = constructor.type_name(),
                    constructor = constructor.id().index,
                    "compiled activator"
                );
                Arc::new(Activator::compile(constructor))
            })
            .clone()
    }

    pub fn contains(&self, id: ConstructorId) -> bool {
        self.activators.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.activators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.activators.read().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.activators.write().clear();
    }
}

/// Compiles an activator per constructor and reuses it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompiledActivation;

impl ActivationStrategy for CompiledActivation {
    fn name(&self) -> &'static str {
        "compiled"
    }

    fn create_instance(
        &self,
        info: &TypeInformation,
        arguments: &Arguments,
        activators: &ActivatorCache,
    ) -> DiResult<AnyService> {
        activators.get_or_compile(info.constructor()).activate(arguments)
    }
}

/// Validates arguments against the parameter descriptors and invokes the
/// constructor on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectiveActivation;

impl ActivationStrategy for ReflectiveActivation {
    fn name(&self) -> &'static str {
        "reflective"
    }

    fn create_instance(
        &self,
        info: &TypeInformation,
        arguments: &Arguments,
        _activators: &ActivatorCache,
    ) -> DiResult<AnyService> {
        let parameters = info.parameters();
        if arguments.len() != parameters.len() {
            return Err(invalid(
                arguments,
                arguments.len(),
                "?",
                format!("expected {} arguments, got {}", parameters.len(), arguments.len()),
            ));
        }

        for (index, ((name, argument), parameter)) in arguments.iter().zip(parameters).enumerate() {
            if *name != parameter.name() {
                return Err(invalid(
                    arguments,
                    index,
                    parameter.name(),
                    format!("argument supplied for '{}'", name),
                ));
            }
            if !accepts(parameter, argument) {
                return Err(invalid(
                    arguments,
                    index,
                    parameter.name(),
                    format!("{} cannot be passed as {}", argument.describe(), parameter.ty().name()),
                ));
            }
        }

        (info.constructor().invoker())(arguments)
    }
}

/// Whether `argument` has the shape the parameter's declared type needs.
fn accepts(parameter: &ParameterInfo, argument: &Argument) -> bool {
    match (parameter.ty().kind(), argument) {
        (TypeKind::Value(_), Argument::Value(_)) => true,
        (_, Argument::Service(service)) => service.type_id() == parameter.ty().id(),
        (_, Argument::Value(_)) => false,
    }
}

fn invalid(arguments: &Arguments, index: usize, parameter: &'static str, message: String) -> DiError {
    DiError::resolution(
        *arguments.owner(),
        ResolutionFailure::InvalidArgument {
            index,
            parameter,
            message,
        },
    )
}
