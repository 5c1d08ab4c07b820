//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::StackGuard;

/// Hash map used for the container's internal tables.
#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
