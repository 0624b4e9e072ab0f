use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{Shared, TypeInfo},
    config::Config,
    errors::{InstantiateErrorKind, ProviderErrorKind},
    injectable::{Injectable, ResolveFn},
    object::SceneObject,
    registry::Registry,
};

/// Exposes factory methods whose outputs seed a scope's registry.
///
/// Providers must not rely on the relative ordering of their own
/// provide-methods.
pub trait Provider: Injectable {
    #[must_use]
    fn provide_methods() -> Vec<ProvideMethod<Self>>;
}

type ProduceFn<C> = Box<dyn Fn(&C) -> Result<SceneObject, InstantiateErrorKind> + Send + Sync>;

/// One factory method of a provider.
pub struct ProvideMethod<C> {
    method: &'static str,
    provides: TypeInfo,
    produce: ProduceFn<C>,
}

impl<C: Provider> ProvideMethod<C> {
    /// Declares a factory producing `T`. An `Err` from the factory is a
    /// contract violation and aborts the provider's registration pass.
    #[must_use]
    pub fn new<T, F>(method: &'static str, factory: F) -> Self
    where
        T: Injectable,
        F: Fn(&C) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self {
            method,
            provides: TypeInfo::of::<T>(),
            produce: Box::new(move |component| factory(component).map(SceneObject::new)),
        }
    }

    pub(crate) fn erase(self, shared: Shared<C>) -> ErasedProvideMethod {
        let Self {
            method,
            provides,
            produce,
        } = self;
        ErasedProvideMethod {
            method,
            provides,
            produce: Box::new(move || produce(&shared.read())),
        }
    }
}

pub(crate) struct ErasedProvideMethod {
    pub(crate) method: &'static str,
    pub(crate) provides: TypeInfo,
    pub(crate) produce: Box<dyn Fn() -> Result<SceneObject, InstantiateErrorKind> + Send + Sync>,
}

/// Registers every provide-method output of `object` into `registry`:
/// invoke the factory, fill the produced value's own members, then insert
/// it under its concrete type and capabilities. A produced value is never
/// observable in a partially initialized state.
pub(crate) fn register_provider_with(
    object: &SceneObject,
    registry: &Mutex<Registry>,
    resolve: ResolveFn<'_>,
    config: Config,
) -> Result<(), ProviderErrorKind> {
    let provider = object.type_info();
    for method in object.provide_methods() {
        let span = info_span!("provide", provider = provider.short_name(), method = method.method);
        let _guard = span.enter();

        let produced = match (method.produce)() {
            Ok(produced) => produced,
            Err(source) => {
                let err = ProviderErrorKind::Factory {
                    provider,
                    provides: method.provides,
                    source,
                };
                error!("{err}");
                return Err(err);
            }
        };

        if let Err(source) = produced.inject_with(resolve, config) {
            let err = ProviderErrorKind::Inject {
                provider,
                provides: method.provides,
                source,
            };
            error!("{err}");
            return Err(err);
        }

        let mut guard = registry.lock();
        for (key, instance) in produced.bindings() {
            guard.try_register(*key, Arc::clone(instance));
        }
        debug!(provides = method.provides.short_name(), "Provider output registered");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{register_provider_with, ProvideMethod, Provider};
    use crate::{
        any::{AnyInstance, Shared, TypeInfo},
        config::Config,
        errors::{InstantiateErrorKind, ProviderErrorKind},
        inject::Inject,
        injectable::{Injectable, InjectionPoint},
        object::SceneObject,
        registry::Registry,
    };

    use parking_lot::{Mutex, RwLock};
    use std::sync::Arc;
    use tracing_test::traced_test;

    struct SaveSlot;

    impl Injectable for SaveSlot {}

    struct Autosaver {
        slot: Option<Shared<SaveSlot>>,
    }

    impl Injectable for Autosaver {
        fn injection_points() -> Vec<InjectionPoint<Self>> {
            vec![InjectionPoint::field(
                "slot",
                |autosaver: &mut Self, Inject(slot): Inject<SaveSlot>| {
                    autosaver.slot = Some(slot);
                },
            )]
        }
    }

    struct Persistence;

    impl Injectable for Persistence {}

    impl Provider for Persistence {
        fn provide_methods() -> Vec<ProvideMethod<Self>> {
            vec![ProvideMethod::new("provide_autosaver", |_: &Self| {
                Ok(Autosaver { slot: None })
            })]
        }
    }

    #[test]
    #[traced_test]
    fn test_output_filled_before_registration() {
        let registry = Mutex::new(Registry::new());
        registry.lock().try_register(
            TypeInfo::of::<SaveSlot>(),
            Arc::new(RwLock::new(SaveSlot)) as AnyInstance,
        );

        let object = SceneObject::provider(Persistence);
        register_provider_with(&object, &registry, &|key| registry.lock().get(key), Config::default()).unwrap();

        let autosaver = registry
            .lock()
            .get(&TypeInfo::of::<Autosaver>())
            .unwrap()
            .downcast::<RwLock<Autosaver>>()
            .unwrap();
        assert!(autosaver.read().slot.is_some());
    }

    struct Hollow;

    impl Injectable for Hollow {}

    impl Provider for Hollow {
        fn provide_methods() -> Vec<ProvideMethod<Self>> {
            vec![ProvideMethod::new("provide_slot", |_: &Self| {
                Err::<SaveSlot, _>(InstantiateErrorKind::Missing)
            })]
        }
    }

    struct Corrupt;

    impl Injectable for Corrupt {}

    impl Provider for Corrupt {
        fn provide_methods() -> Vec<ProvideMethod<Self>> {
            vec![ProvideMethod::new("provide_slot", |_: &Self| {
                Err::<SaveSlot, _>(anyhow::anyhow!("save directory is unreadable").into())
            })]
        }
    }

    #[test]
    #[traced_test]
    fn test_factory_error_carries_cause() {
        let registry = Mutex::new(Registry::new());
        let object = SceneObject::provider(Corrupt);

        let err = register_provider_with(&object, &registry, &|_| None, Config::default()).unwrap_err();
        let ProviderErrorKind::Factory { source, .. } = err else {
            panic!("unexpected error: {err}");
        };
        assert!(source.to_string().contains("save directory is unreadable"));
    }

    #[test]
    #[traced_test]
    fn test_factory_error_is_fatal_with_context() {
        let registry = Mutex::new(Registry::new());
        let object = SceneObject::provider(Hollow);

        let err = register_provider_with(&object, &registry, &|_| None, Config::default()).unwrap_err();
        match err {
            ProviderErrorKind::Factory { provider, provides, .. } => {
                assert_eq!(provider, TypeInfo::of::<Hollow>());
                assert_eq!(provides, TypeInfo::of::<SaveSlot>());
            }
            err => panic!("unexpected error: {err}"),
        }
        assert!(registry.lock().is_empty());
    }
}
