//! Container configuration.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::activation::ActivationKind;

/// Default limit on nested resolutions before the container gives up.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

/// Settings a [`Container`](crate::Container) starts with.
///
/// Every setting except the depth limit can also be changed at runtime on
/// the container.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{ActivationKind, Container, ContainerOptions};
///
/// let options = ContainerOptions::new()
///     .auto_discovery(false)
///     .activation(ActivationKind::Reflective)
///     .max_resolution_depth(16);
///
/// let container = Container::with_options(options.clone());
/// assert_eq!(container.options(), options);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Silently register unregistered concrete types on first reference.
    pub auto_discovery: bool,
    /// Consider non-public constructors during constructor selection.
    pub allow_non_public_constructors: bool,
    /// Object creation strategy.
    pub activation: ActivationKind,
    /// Nested resolutions allowed on one thread before failing with
    /// `DepthExceeded`.
    pub max_resolution_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            auto_discovery: true,
            allow_non_public_constructors: false,
            activation: ActivationKind::Compiled,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_discovery(mut self, enabled: bool) -> Self {
        self.auto_discovery = enabled;
        self
    }

    pub fn allow_non_public_constructors(mut self, allowed: bool) -> Self {
        self.allow_non_public_constructors = allowed;
        self
    }

    pub fn activation(mut self, kind: ActivationKind) -> Self {
        self.activation = kind;
        self
    }

    /// Sets the nesting limit. Zero is raised to one so top-level calls
    /// still work.
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth.max(1);
        self
    }

    /// Parses options from JSON. Missing fields keep their defaults.
    ///
    /// ```rust
    /// # #[cfg(feature = "config")]
    /// # {
    /// use ferrous_ioc::{ActivationKind, ContainerOptions};
    ///
    /// let options = ContainerOptions::from_json(r#"{ "activation": "reflective" }"#).unwrap();
    /// assert_eq!(options.activation, ActivationKind::Reflective);
    /// assert!(options.auto_discovery);
    /// # }
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(feature = "config")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
