use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    any::{AnyInstance, Shared, TypeInfo},
    dependency_resolver::Dependency,
};

/// Resolved singleton handle for a concrete type, pattern-matched in
/// injection-point closures: `|target: &mut T, Inject(dep): Inject<Dep>| ..`.
#[derive(Debug)]
pub struct Inject<Dep>(pub Shared<Dep>);

impl<Dep: Send + Sync + 'static> Dependency for Inject<Dep> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Dep>()
    }

    fn extract(instance: AnyInstance) -> Option<Self> {
        instance.downcast::<RwLock<Dep>>().ok().map(Self)
    }
}

/// Resolved handle for a capability key (trait object).
///
/// The capability trait must carry `Send + Sync` supertraits so the shared
/// handle stays transferable: `trait Renderer: Send + Sync { .. }`, then
/// `InjectDyn<dyn Renderer>`.
pub struct InjectDyn<Dep: ?Sized>(pub Shared<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> Dependency for InjectDyn<Dep> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Dep>()
    }

    fn extract(instance: AnyInstance) -> Option<Self> {
        instance
            .downcast::<Shared<Dep>>()
            .ok()
            .map(|shared| Self(Arc::clone(&*shared)))
    }
}
