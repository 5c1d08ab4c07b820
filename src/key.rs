//! Registration key types for the container.

use std::any::TypeId;
use std::fmt;

/// Display form of the reserved "unnamed" registration name.
pub const DEFAULT_NAME: &str = "<default>";

/// Key for registration storage and lookup.
///
/// A key is the pair (requested type, name). The name `None` is the reserved
/// default sentinel used by every unnamed registration. Each key holds at
/// most one live registration.
///
/// Equality and hashing only look at the `TypeId` and the name; the type
/// name is carried along for diagnostics and error messages.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::Key;
///
/// let unnamed = Key::of::<String>();
/// let named = Key::named::<String>("greeting");
///
/// assert_eq!(unnamed.name(), None);
/// assert_eq!(named.name(), Some("greeting"));
/// assert_ne!(unnamed, named);
/// assert_eq!(unnamed.to_string(), "alloc::string::String [<default>]");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<&'static str>,
}

impl Key {
    /// Creates a key from its raw parts.
    pub fn new(type_id: TypeId, type_name: &'static str, name: Option<&'static str>) -> Self {
        Self { type_id, type_name, name }
    }

    /// Default-named key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeId::of::<T>(), std::any::type_name::<T>(), None)
    }

    /// Named key for `T`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(TypeId::of::<T>(), std::any::type_name::<T>(), Some(name))
    }

    /// Same type, different name.
    #[inline]
    pub fn with_name(self, name: Option<&'static str>) -> Self {
        Self { name, ..self }
    }

    /// `TypeId` of the requested type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable requested type name (`std::any::type_name`).
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Registration name, `None` for the default name.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Registration name with the default sentinel spelled out.
    pub fn display_name(&self) -> &'static str {
        self.name.unwrap_or(DEFAULT_NAME)
    }

    /// Returns true for the unnamed (default) registration of a type.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.name.is_none()
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.type_name, self.display_name())
    }
}
