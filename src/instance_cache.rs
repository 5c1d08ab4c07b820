//! Cache of singleton instances keyed by (type, name).

use std::any::TypeId;

use parking_lot::RwLock;

use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::internal::FastMap;
use crate::key::Key;
use crate::registration::Registration;
use crate::service::AnyService;

#[derive(Default)]
pub(crate) struct InstanceCache {
    instances: RwLock<FastMap<Key, AnyService>>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `instance` when the registration has singleton semantics.
    ///
    /// If another thread cached the key first, its instance is kept and
    /// returned so every caller observes the same value.
    pub(crate) fn try_add(&self, registration: &Registration, instance: AnyService) -> (bool, AnyService) {
        if !registration.is_singleton() {
            return (false, instance);
        }
        let mut instances = self.instances.write();
        match instances.get(registration.key()) {
            Some(existing) => (false, existing.clone()),
            None => {
                instances.insert(*registration.key(), instance.clone());
                (true, instance)
            }
        }
    }

    #[inline]
    pub(crate) fn is_cached(&self, key: &Key) -> bool {
        self.instances.read().contains_key(key)
    }

    pub(crate) fn try_get(&self, key: &Key) -> Option<AnyService> {
        self.instances.read().get(key).cloned()
    }

    /// Cached instance for `key`; fails if none is stored.
    pub(crate) fn get(&self, key: &Key) -> DiResult<AnyService> {
        self.try_get(key)
            .ok_or_else(|| DiError::resolution(*key, ResolutionFailure::NotCached))
    }

    pub(crate) fn remove(&self, key: &Key) -> bool {
        self.instances.write().remove(key).is_some()
    }

    /// Evicts every name under `type_id`, returning how many were dropped.
    pub(crate) fn remove_type(&self, type_id: TypeId) -> usize {
        let mut instances = self.instances.write();
        let before = instances.len();
        instances.retain(|key, _| key.type_id() != type_id);
        before - instances.len()
    }

    pub(crate) fn clear(&self) {
        self.instances.write().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.read().len()
    }
}
