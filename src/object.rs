use std::{fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    any::{AnyInstance, Shared, TypeInfo},
    config::Config,
    errors::InjectErrorKind,
    injectable::{run_injection_pass, Injectable, ResolveFn},
    provider::{ErasedProvideMethod, Provider},
};

type InjectFn = Box<dyn Fn(ResolveFn<'_>, Config) -> Result<(), InjectErrorKind> + Send + Sync>;

/// Erased handle for one object of a scope's domain.
///
/// Built once per object by the host; carries the shared instance, the
/// precomputed registration keys (concrete type plus capabilities) and the
/// erased injection/provide machinery the scope drives.
pub struct SceneObject {
    type_info: TypeInfo,
    instance: AnyInstance,
    bindings: Vec<(TypeInfo, AnyInstance)>,
    has_points: bool,
    is_provider: bool,
    inject: InjectFn,
    provides: Vec<ErasedProvideMethod>,
}

impl SceneObject {
    /// Wraps a component for scope membership.
    #[must_use]
    pub fn new<C: Injectable>(component: C) -> Self {
        let shared = Arc::new(RwLock::new(component));
        Self::from_shared(shared, Vec::new(), false)
    }

    /// Wraps a component that also exposes the provider capability.
    #[must_use]
    pub fn provider<C: Provider>(component: C) -> Self {
        let shared = Arc::new(RwLock::new(component));
        let provides = C::provide_methods()
            .into_iter()
            .map(|method| method.erase(Arc::clone(&shared)))
            .collect();
        Self::from_shared(shared, provides, true)
    }

    fn from_shared<C: Injectable>(shared: Shared<C>, provides: Vec<ErasedProvideMethod>, is_provider: bool) -> Self {
        let type_info = TypeInfo::of::<C>();
        let points = C::injection_points();
        let has_points = !points.is_empty();

        let mut bindings = vec![(type_info, Arc::clone(&shared) as AnyInstance)];
        for capability in C::capabilities() {
            bindings.push((capability.type_info(), capability.erase(Arc::clone(&shared))));
        }

        let inject: InjectFn = {
            let shared = Arc::clone(&shared);
            Box::new(move |resolve, config| {
                let mut guard = shared.write();
                run_injection_pass(type_info, &mut *guard, &points, resolve, config)
            })
        };

        Self {
            type_info,
            instance: shared as AnyInstance,
            bindings,
            has_points,
            is_provider,
            inject,
            provides,
        }
    }

    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[must_use]
    pub fn is_provider(&self) -> bool {
        self.is_provider
    }

    #[must_use]
    pub fn has_injection_points(&self) -> bool {
        self.has_points
    }

    /// Typed access to the wrapped component, for the host that created the
    /// handle.
    #[must_use]
    pub fn downcast<C: Send + Sync + 'static>(&self) -> Option<Shared<C>> {
        Arc::clone(&self.instance).downcast::<RwLock<C>>().ok()
    }

    /// Registration keys, the concrete type first.
    pub(crate) fn bindings(&self) -> &[(TypeInfo, AnyInstance)] {
        &self.bindings
    }

    pub(crate) fn provide_methods(&self) -> &[ErasedProvideMethod] {
        &self.provides
    }

    pub(crate) fn inject_with(&self, resolve: ResolveFn<'_>, config: Config) -> Result<(), InjectErrorKind> {
        (self.inject)(resolve, config)
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("type", &self.type_info.name)
            .field("provider", &self.is_provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SceneObject;
    use crate::{
        any::TypeInfo,
        capabilities,
        injectable::{CapabilityBinding, Injectable},
    };

    trait Pickup: Send + Sync {
        fn weight(&self) -> u32;
    }

    struct Coin {
        value: u32,
    }

    impl Pickup for Coin {
        fn weight(&self) -> u32 {
            self.value
        }
    }

    impl Injectable for Coin {
        fn capabilities() -> Vec<CapabilityBinding<Self>> {
            capabilities![dyn Pickup]
        }
    }

    #[test]
    fn test_bindings_cover_concrete_type_and_capabilities() {
        let object = SceneObject::new(Coin { value: 5 });
        let keys: Vec<_> = object.bindings().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, [TypeInfo::of::<Coin>(), TypeInfo::of::<dyn Pickup>()]);
        assert!(!object.is_provider());
        assert!(!object.has_injection_points());
    }

    #[test]
    fn test_downcast() {
        let object = SceneObject::new(Coin { value: 5 });
        let coin = object.downcast::<Coin>().unwrap();
        assert_eq!(coin.read().value, 5);
        assert!(object.downcast::<u32>().is_none());
    }
}
