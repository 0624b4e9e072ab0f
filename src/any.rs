use std::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    collections::BTreeMap,
    sync::Arc,
};

use parking_lot::RwLock;

/// Resolution key: a type descriptor with the type name kept around for
/// diagnostics. Both concrete types and capability trait objects are keys.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

/// A singleton instance shared between its scope and every consumer.
/// Writable behind the lock so the injection pass can fill members of an
/// instance that is already discoverable by its peers.
pub type Shared<T> = Arc<RwLock<T>>;

/// Erased shared instance as stored in a registry.
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

pub(crate) type Map = BTreeMap<TypeInfo, AnyInstance>;
