//! Error types for the container.

use crate::key::Key;

/// Container errors.
///
/// Every failure is a configuration fault detected synchronously at the call
/// that hit it. A failed call never leaves a partial registration or a
/// partial cache write behind, so later calls are unaffected.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{interface, Container, ContainerOptions, DiError, ResolutionFailure};
///
/// trait Mailer: Send + Sync {}
/// interface!(dyn Mailer);
///
/// let container = Container::with_options(ContainerOptions::new().auto_discovery(false));
/// match container.get_instance::<dyn Mailer>() {
///     Err(DiError::ResolutionFailed { key, reason: ResolutionFailure::NotRegistered }) => {
///         assert_eq!(key.name(), None);
///         assert!(key.type_name().ends_with("Mailer"));
///     }
///     other => panic!("unexpected: {:?}", other.map(|_| ())),
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// A register call was rejected; nothing was stored.
    #[error("Registration failed for {key}: {reason}")]
    RegistrationFailed {
        /// Key the caller tried to register.
        key: Key,
        /// Why the registration was refused.
        reason: RegistrationFailure,
    },
    /// A resolve / build-up call could not produce a value.
    #[error("Resolution failed for {key}: {reason}")]
    ResolutionFailed {
        /// Key being resolved when the failure was detected.
        key: Key,
        /// Why resolution stopped.
        reason: ResolutionFailure,
    },
}

/// Reasons a registration is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationFailure {
    /// The (type, name) key already holds a registration.
    #[error("key is already registered")]
    Duplicate,
    /// The implementation type is not assignable to the requested type.
    #[error("{implementation} is not assignable to the requested type")]
    NotAssignable {
        /// Implementation type name.
        implementation: &'static str,
    },
    /// The implementation type has no descriptor to construct it from.
    #[error("{implementation} is not a concrete, constructible type")]
    NotConstructible {
        /// Implementation type name.
        implementation: &'static str,
    },
}

/// Reasons a resolution fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionFailure {
    /// No registration for the key and auto-discovery cannot help.
    #[error("type is not registered")]
    NotRegistered,
    /// Auto-discovery refuses abstract (trait object) and value types.
    #[error("type is abstract and cannot be auto-registered")]
    AbstractType,
    /// A constructor parameter or dependency property could not be supplied.
    #[error("cannot resolve parameter '{parameter}' of type {type_name}")]
    UnresolvableParameter {
        /// Parameter or property name.
        parameter: &'static str,
        /// Declared type of the parameter.
        type_name: &'static str,
    },
    /// No constructor is visible under the current non-public policy.
    #[error("no eligible constructor found")]
    NoEligibleConstructor,
    /// `get_new_instance` was called on an instance or factory registration.
    #[error("registration is not a type registration")]
    NotATypeRegistration,
    /// The instance cache was read for a key it does not hold.
    #[error("no cached instance")]
    NotCached,
    /// A constructor received an argument it cannot use.
    #[error("argument {index} ('{parameter}'): {message}")]
    InvalidArgument {
        /// Zero-based argument position.
        index: usize,
        /// Parameter name.
        parameter: &'static str,
        /// What went wrong.
        message: String,
    },
    /// A stored value could not be downcast to the requested type.
    #[error("stored value is not a {expected}")]
    TypeMismatch {
        /// Type the caller asked for.
        expected: &'static str,
    },
    /// The key re-entered its own construction.
    #[error("circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Nested resolution went deeper than the configured limit.
    #[error("max resolution depth {0} exceeded")]
    DepthExceeded(usize),
    /// A lazy accessor outlived its container.
    #[error("container has been dropped")]
    ContainerDropped,
}

impl DiError {
    /// Shorthand for a registration failure.
    pub fn registration(key: Key, reason: RegistrationFailure) -> Self {
        DiError::RegistrationFailed { key, reason }
    }

    /// Shorthand for a resolution failure.
    pub fn resolution(key: Key, reason: ResolutionFailure) -> Self {
        DiError::ResolutionFailed { key, reason }
    }

    /// The key the failing call was working on.
    pub fn key(&self) -> &Key {
        match self {
            DiError::RegistrationFailed { key, .. } | DiError::ResolutionFailed { key, .. } => key,
        }
    }

    /// True for `RegistrationFailed`.
    pub fn is_registration_failure(&self) -> bool {
        matches!(self, DiError::RegistrationFailed { .. })
    }

    /// True for `ResolutionFailed`.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, DiError::ResolutionFailed { .. })
    }
}

/// Result type for container operations.
///
/// ```rust
/// use ferrous_ioc::{DiError, DiResult, Key, ResolutionFailure};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::resolution(Key::of::<u32>(), ResolutionFailure::NotRegistered))
/// }
///
/// assert!(failing_operation().unwrap_err().is_resolution_failure());
/// ```
pub type DiResult<T> = Result<T, DiError>;
