use criterion::{criterion_group, criterion_main, Criterion};

use stagewire::{
    GlobalScope, Inject, Injectable, InjectionPoint, InstantiateErrorKind, LocalScope, ProvideMethod, Provider,
    SceneObject, Shared,
};

struct Logger;

impl Injectable for Logger {}

struct Bootstrap;

impl Injectable for Bootstrap {}

impl Provider for Bootstrap {
    fn provide_methods() -> Vec<ProvideMethod<Self>> {
        vec![ProvideMethod::new("provide_logger", |_: &Self| {
            Ok::<_, InstantiateErrorKind>(Logger)
        })]
    }
}

struct Hud {
    logger: Option<Shared<Logger>>,
}

impl Injectable for Hud {
    fn injection_points() -> Vec<InjectionPoint<Self>> {
        vec![InjectionPoint::field("logger", |hud: &mut Self, Inject(logger): Inject<Logger>| {
            hud.logger = Some(logger);
        })]
    }
}

fn bench_resolve(c: &mut Criterion) {
    let global = GlobalScope::new();
    global.initialize(&[SceneObject::provider(Bootstrap)]).unwrap();

    c.bench_function("global_scope_get", |b| b.iter(|| global.get::<Logger>()));
}

fn bench_initialize(c: &mut Criterion) {
    c.bench_function("local_scope_initialize_64", |b| {
        b.iter(|| {
            let objects: Vec<_> = (0..64)
                .map(|_| SceneObject::new(Hud { logger: None }))
                .chain([SceneObject::provider(Bootstrap)])
                .collect();

            let scope = LocalScope::new(GlobalScope::new());
            scope.initialize(&objects).unwrap();
            scope
        });
    });
}

criterion_group!(benches, bench_resolve, bench_initialize);
criterion_main!(benches);
