use std::{collections::BTreeSet, sync::Arc};

use parking_lot::Mutex;
use tracing::debug;

use crate::{any::TypeInfo, object::SceneObject};

/// Types visited by the injection pass: any type with at least one
/// injection point, or with the provider capability.
pub type InjectableTypeSet = BTreeSet<TypeInfo>;

#[must_use]
pub fn compute_injectable_types(objects: &[SceneObject]) -> InjectableTypeSet {
    objects
        .iter()
        .filter(|object| object.has_injection_points() || object.is_provider())
        .map(SceneObject::type_info)
        .collect()
}

/// Per-scope cache: the set is computed at most once per scope and treated
/// as an immutable snapshot afterwards.
#[derive(Default)]
pub(crate) struct Classifier {
    cache: Mutex<Option<Arc<InjectableTypeSet>>>,
}

impl Classifier {
    pub(crate) fn classify(&self, objects: &[SceneObject]) -> Arc<InjectableTypeSet> {
        let mut guard = self.cache.lock();
        if let Some(set) = guard.as_ref() {
            return Arc::clone(set);
        }

        let set = Arc::new(compute_injectable_types(objects));
        debug!(count = set.len(), "Injectable types cached");
        *guard = Some(Arc::clone(&set));
        set
    }

    pub(crate) fn snapshot(&self) -> Option<Arc<InjectableTypeSet>> {
        self.cache.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_injectable_types, Classifier};
    use crate::{
        any::{Shared, TypeInfo},
        inject::Inject,
        injectable::{Injectable, InjectionPoint},
        object::SceneObject,
        provider::{ProvideMethod, Provider},
    };

    use std::sync::Arc;

    struct Skybox;

    impl Injectable for Skybox {}

    struct Weather;

    impl Injectable for Weather {}

    struct Horizon {
        weather: Option<Shared<Weather>>,
    }

    impl Injectable for Horizon {
        fn injection_points() -> Vec<InjectionPoint<Self>> {
            vec![InjectionPoint::field(
                "weather",
                |horizon: &mut Self, Inject(weather): Inject<Weather>| {
                    horizon.weather = Some(weather);
                },
            )]
        }
    }

    struct Forecast;

    impl Injectable for Forecast {}

    impl Provider for Forecast {
        fn provide_methods() -> Vec<ProvideMethod<Self>> {
            vec![ProvideMethod::new("provide_weather", |_: &Self| Ok(Weather))]
        }
    }

    #[test]
    fn test_empty_universe() {
        assert!(compute_injectable_types(&[]).is_empty());
    }

    #[test]
    fn test_membership() {
        let objects = [
            SceneObject::new(Skybox),
            SceneObject::new(Horizon { weather: None }),
            SceneObject::provider(Forecast),
        ];
        let set = compute_injectable_types(&objects);

        assert!(!set.contains(&TypeInfo::of::<Skybox>()));
        assert!(set.contains(&TypeInfo::of::<Horizon>()));
        assert!(set.contains(&TypeInfo::of::<Forecast>()));
    }

    #[test]
    fn test_snapshot_is_stable() {
        let classifier = Classifier::default();
        assert!(classifier.snapshot().is_none());

        let first = classifier.classify(&[SceneObject::new(Horizon { weather: None })]);
        // The cached snapshot wins even if a different universe is offered.
        let second = classifier.classify(&[SceneObject::new(Skybox)]);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(classifier.snapshot().is_some());
    }
}
