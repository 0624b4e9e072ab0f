use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use crate::any::{AnyInstance, Map, TypeInfo};

/// Singleton registry of one scope: at most one instance per resolution
/// key, shared by reference with every consumer.
#[derive(Default)]
pub struct Registry {
    instances: Map,
}

impl Registry {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { instances: Map::new() }
    }

    /// Inserts iff the key is absent and reports whether the insert
    /// happened. The first registration for a key is permanent; later
    /// attempts are logged and ignored, never an error.
    pub fn try_register(&mut self, key: TypeInfo, instance: AnyInstance) -> bool {
        match self.instances.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(instance);
                debug!(key = key.short_name(), "Registered");
                true
            }
            Entry::Occupied(_) => {
                warn!(key = key.short_name(), "Instance already registered, ignoring duplicate");
                false
            }
        }
    }

    /// Pure lookup; absence is a normal outcome.
    #[must_use]
    pub fn get(&self, key: &TypeInfo) -> Option<AnyInstance> {
        self.instances.get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
