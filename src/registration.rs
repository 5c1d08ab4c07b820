//! Registration model and registry.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::container::Container;
use crate::descriptors::Upcast;
use crate::error::DiResult;
use crate::internal::FastMap;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::service::AnyService;
use crate::types::TypeRef;
use crate::value::{Value, ValueContainer};

/// Producer stored by a factory registration.
pub type FactoryFn = Arc<dyn Fn(&Container) -> DiResult<AnyService> + Send + Sync>;

/// Per-registration callback run after every successful resolution.
pub type ResolvedCallback = Arc<dyn Fn(&Registration, &AnyService) + Send + Sync>;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Which of the three registration kinds a registration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKindTag {
    /// Constructed from the implementation type's descriptor.
    Type,
    /// A pre-built instance.
    Instance,
    /// A producer called on every resolution.
    Factory,
}

impl fmt::Display for RegistrationKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKindTag::Type => f.write_str("type"),
            RegistrationKindTag::Instance => f.write_str("instance"),
            RegistrationKindTag::Factory => f.write_str("factory"),
        }
    }
}

pub(crate) enum RegistrationKind {
    Type {
        implementation: TypeRef,
        /// Conversion to the requested type, when it differs from the
        /// implementation.
        upcast: Option<Upcast>,
    },
    Instance(AnyService),
    Factory(FactoryFn),
}

struct RegistrationState {
    lifetime: Lifetime,
    values: ValueContainer,
    on_resolved: Option<ResolvedCallback>,
}

/// A stored binding from a key to a way of producing a value.
///
/// The kind is fixed at registration time. Lifetime, literal values and the
/// resolved callback are set through the options handle returned by the
/// register call and are read on every resolution. Changing them after the
/// key has been cached has no effect on the cached instance.
pub struct Registration {
    key: Key,
    kind: RegistrationKind,
    sequence: u64,
    auto_registered: bool,
    state: RwLock<RegistrationState>,
}

impl Registration {
    pub(crate) fn new(key: Key, kind: RegistrationKind) -> Self {
        Self {
            key,
            kind,
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            auto_registered: false,
            state: RwLock::new(RegistrationState {
                lifetime: Lifetime::Transient,
                values: ValueContainer::new(),
                on_resolved: None,
            }),
        }
    }

    pub(crate) fn auto(key: Key, implementation: TypeRef) -> Self {
        Self {
            auto_registered: true,
            ..Self::new(
                key,
                RegistrationKind::Type {
                    implementation,
                    upcast: None,
                },
            )
        }
    }

    /// Requested type and name.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn kind(&self) -> RegistrationKindTag {
        match self.kind {
            RegistrationKind::Type { .. } => RegistrationKindTag::Type,
            RegistrationKind::Instance(_) => RegistrationKindTag::Instance,
            RegistrationKind::Factory(_) => RegistrationKindTag::Factory,
        }
    }

    pub(crate) fn kind_ref(&self) -> &RegistrationKind {
        &self.kind
    }

    /// Implementation type of a type registration.
    pub fn implementation(&self) -> Option<&TypeRef> {
        match &self.kind {
            RegistrationKind::Type { implementation, .. } => Some(implementation),
            _ => None,
        }
    }

    /// Effective lifetime: the configured one for type registrations,
    /// `Singleton` for instances and `Transient` for factories.
    pub fn lifetime(&self) -> Lifetime {
        match self.kind {
            RegistrationKind::Type { .. } => self.state.read().lifetime,
            RegistrationKind::Instance(_) => Lifetime::Singleton,
            RegistrationKind::Factory(_) => Lifetime::Transient,
        }
    }

    /// True when resolutions go through the instance cache.
    pub fn is_singleton(&self) -> bool {
        self.lifetime() == Lifetime::Singleton
    }

    /// True if auto-discovery created this registration.
    pub fn is_auto_registered(&self) -> bool {
        self.auto_registered
    }

    /// Snapshot of the literal values.
    pub fn values(&self) -> ValueContainer {
        self.state.read().values.clone()
    }

    /// Literal registered under `name`.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.state.read().values.get(name).cloned()
    }

    pub(crate) fn value_count(&self) -> usize {
        self.state.read().values.len()
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn set_lifetime(&self, lifetime: Lifetime) {
        self.state.write().lifetime = lifetime;
    }

    pub(crate) fn set_on_resolved(&self, callback: ResolvedCallback) {
        self.state.write().on_resolved = Some(callback);
    }

    pub(crate) fn on_resolved(&self) -> Option<ResolvedCallback> {
        self.state.read().on_resolved.clone()
    }

    pub(crate) fn merge_values(&self, values: ValueContainer) {
        self.state.write().values.merge(values);
    }

    pub(crate) fn insert_value(&self, name: impl Into<String>, value: Value) {
        self.state.write().values.insert(name, value);
    }

    /// Stores `value` under `name` unless a literal is already there, and
    /// returns whichever literal ends up stored.
    pub(crate) fn remember_value(&self, name: &str, value: Value) -> Value {
        let mut state = self.state.write();
        match state.values.get(name) {
            Some(existing) => existing.clone(),
            None => {
                state.values.insert(name, value.clone());
                value
            }
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .field("lifetime", &self.lifetime())
            .field("implementation", &self.implementation().map(TypeRef::name))
            .field("auto_registered", &self.auto_registered)
            .finish()
    }
}

/// All registrations of one container.
///
/// Keys map to registrations; a per-type list keeps insertion order so the
/// resolver can find the most recently added registration for a type and
/// `get_all_instances` can return them in order.
#[derive(Default)]
pub(crate) struct Registry {
    entries: FastMap<Key, Arc<Registration>>,
    by_type: FastMap<TypeId, Vec<Key>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `registration`. Returns false, storing nothing, if its key is
    /// already taken.
    pub(crate) fn insert(&mut self, registration: Arc<Registration>) -> bool {
        let key = *registration.key();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, registration);
        self.by_type.entry(key.type_id()).or_default().push(key);
        true
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<&Arc<Registration>> {
        self.entries.get(key)
    }

    #[inline]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Most recently added registration for `type_id`, under any name.
    pub(crate) fn latest_for(&self, type_id: TypeId) -> Option<&Arc<Registration>> {
        self.by_type
            .get(&type_id)
            .and_then(|keys| keys.last())
            .and_then(|key| self.entries.get(key))
    }

    /// Every registration for `type_id`, oldest first.
    pub(crate) fn all_for(&self, type_id: TypeId) -> Vec<Arc<Registration>> {
        self.by_type
            .get(&type_id)
            .map(|keys| keys.iter().filter_map(|k| self.entries.get(k)).cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Arc<Registration>> {
        let removed = self.entries.remove(key)?;
        if let Some(keys) = self.by_type.get_mut(&key.type_id()) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.by_type.remove(&key.type_id());
            }
        }
        Some(removed)
    }

    /// Removes every name under `type_id`.
    pub(crate) fn remove_type(&mut self, type_id: TypeId) -> Vec<Arc<Registration>> {
        let keys = self.by_type.remove(&type_id).unwrap_or_default();
        keys.iter().filter_map(|k| self.entries.remove(k)).collect()
    }

    /// All registrations, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Registration>> {
        let mut all: Vec<_> = self.entries.values().cloned().collect();
        all.sort_by_key(|r| r.sequence());
        all
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.by_type.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
