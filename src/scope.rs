use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info_span};

use crate::{
    any::{AnyInstance, Shared, TypeInfo},
    classifier::Classifier,
    config::Config,
    errors::{InjectErrorKind, ProviderErrorKind, ScopeErrorKind},
    injectable::Injectable,
    object::SceneObject,
    provider::register_provider_with,
    registry::Registry,
};

/// Common surface of the two scope types — the seam hosts hold when either
/// scope will do.
pub trait Injector {
    /// Looks the key up in this scope's resolution chain.
    fn resolve(&self, key: &TypeInfo) -> Option<AnyInstance>;

    /// Runs the injection pass on the object if its type is classified
    /// injectable; a no-op otherwise.
    ///
    /// # Errors
    /// Propagates the pass failure under the strict policy.
    fn inject(&self, object: &SceneObject) -> Result<(), InjectErrorKind>;
}

struct ScopeInner {
    registry: Mutex<Registry>,
    classifier: Classifier,
    config: Config,
}

impl ScopeInner {
    fn new(config: Config) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            classifier: Classifier::default(),
            config,
        }
    }

    /// Before initialization caches a snapshot, falls back to the handle's
    /// own capability test so late-created objects can still be served.
    fn is_injectable(&self, object: &SceneObject) -> bool {
        match self.classifier.snapshot() {
            Some(set) => set.contains(&object.type_info()),
            None => object.has_injection_points() || object.is_provider(),
        }
    }
}

fn insert_bindings(registry: &Mutex<Registry>, object: &SceneObject) -> bool {
    let mut guard = registry.lock();
    let mut bindings = object.bindings().iter();
    let concrete = match bindings.next() {
        Some((key, instance)) => guard.try_register(*key, Arc::clone(instance)),
        None => false,
    };
    for (key, instance) in bindings {
        guard.try_register(*key, Arc::clone(instance));
    }
    concrete
}

fn get_in<S, T>(scope: &S) -> Option<Shared<T>>
where
    S: Injector + ?Sized,
    T: Send + Sync + 'static,
{
    scope.resolve(&TypeInfo::of::<T>())?.downcast::<RwLock<T>>().ok()
}

fn get_dyn_in<S, T>(scope: &S) -> Option<Shared<T>>
where
    S: Injector + ?Sized,
    T: ?Sized + Send + Sync + 'static,
{
    let shared = scope.resolve(&TypeInfo::of::<T>())?.downcast::<Shared<T>>().ok()?;
    Some(Arc::clone(&*shared))
}

/// Process-wide scope. Created once at application start and handed to
/// every local scope; never reads from anything else.
#[derive(Clone)]
pub struct GlobalScope {
    inner: Arc<ScopeInner>,
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalScope {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(ScopeInner::new(config)),
        }
    }

    /// Initializes the scope with every object of its domain: classifies
    /// member types, registers provider outputs, then injects every
    /// injectable member. Providers finish populating the registry before
    /// any member is injected.
    ///
    /// # Errors
    /// - [`ScopeErrorKind::Provider`] if a provider factory fails or its
    ///   output can't be filled
    /// - [`ScopeErrorKind::Inject`] if a member fails the pass under the
    ///   strict policy
    pub fn initialize(&self, objects: &[SceneObject]) -> Result<(), ScopeErrorKind> {
        let span = info_span!("initialize", scope = "global", objects = objects.len());
        let _guard = span.enter();

        let injectable = self.inner.classifier.classify(objects);

        for object in objects.iter().filter(|object| object.is_provider()) {
            self.register_provider(object)?;
        }

        for object in objects.iter().filter(|object| injectable.contains(&object.type_info())) {
            object.inject_with(&|key| self.resolve(key), self.inner.config)?;
        }

        debug!("Scope initialized");
        Ok(())
    }

    /// Invokes every provide-method of the object and registers the
    /// produced values into this scope.
    ///
    /// # Errors
    /// See [`ProviderErrorKind`].
    pub fn register_provider(&self, object: &SceneObject) -> Result<(), ProviderErrorKind> {
        register_provider_with(object, &self.inner.registry, &|key| self.resolve(key), self.inner.config)
    }

    /// Registers a pre-built host value under its concrete type and
    /// capabilities, as-is: its injection points, if any, are not filled.
    /// Returns whether the concrete-type registration happened.
    pub fn register_instance<T: Injectable>(&self, value: T) -> bool {
        insert_bindings(&self.inner.registry, &SceneObject::new(value))
    }

    #[must_use]
    pub fn resolve(&self, key: &TypeInfo) -> Option<AnyInstance> {
        self.inner.registry.lock().get(key)
    }

    /// Runs the injection pass on the object if its type is classified
    /// injectable; a no-op otherwise.
    ///
    /// # Errors
    /// Propagates the pass failure under the strict policy.
    pub fn inject(&self, object: &SceneObject) -> Result<(), InjectErrorKind> {
        if !self.inner.is_injectable(object) {
            debug!(object = object.type_info().short_name(), "Not injectable, skipped");
            return Ok(());
        }
        object.inject_with(&|key| self.resolve(key), self.inner.config)
    }

    /// Resolves a concrete type.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Shared<T>> {
        get_in(self)
    }

    /// Resolves a capability key.
    #[must_use]
    pub fn get_dyn<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Shared<T>> {
        get_dyn_in(self)
    }

    #[must_use]
    pub fn is_injectable(&self, object: &SceneObject) -> bool {
        self.inner.is_injectable(object)
    }
}

impl Injector for GlobalScope {
    fn resolve(&self, key: &TypeInfo) -> Option<AnyInstance> {
        GlobalScope::resolve(self, key)
    }

    fn inject(&self, object: &SceneObject) -> Result<(), InjectErrorKind> {
        GlobalScope::inject(self, object)
    }
}

/// Scope of one logical subgroup of objects. Resolution falls back to the
/// global scope on a miss; sibling local scopes are invisible to each
/// other, and the fallback is read-only.
#[derive(Clone)]
pub struct LocalScope {
    inner: Arc<ScopeInner>,
    global: GlobalScope,
}

impl LocalScope {
    /// The policy config is inherited from the global scope so one policy
    /// applies uniformly across the whole chain.
    #[inline]
    #[must_use]
    pub fn new(global: GlobalScope) -> Self {
        let config = global.inner.config;
        Self {
            inner: Arc::new(ScopeInner::new(config)),
            global,
        }
    }

    /// Initializes the scope: classify, register provider outputs,
    /// self-register every member under its concrete type and
    /// capabilities, then inject. Self-registration precedes injection so
    /// any member resolves as a dependency of any other regardless of
    /// enumeration order.
    ///
    /// # Errors
    /// - [`ScopeErrorKind::Provider`] if a provider factory fails or its
    ///   output can't be filled
    /// - [`ScopeErrorKind::Inject`] if a member fails the pass under the
    ///   strict policy
    pub fn initialize(&self, objects: &[SceneObject]) -> Result<(), ScopeErrorKind> {
        let span = info_span!("initialize", scope = "local", objects = objects.len());
        let _guard = span.enter();

        let injectable = self.inner.classifier.classify(objects);

        for object in objects.iter().filter(|object| object.is_provider()) {
            self.register_provider(object)?;
        }

        for object in objects {
            insert_bindings(&self.inner.registry, object);
        }

        for object in objects.iter().filter(|object| injectable.contains(&object.type_info())) {
            object.inject_with(&|key| self.resolve(key), self.inner.config)?;
        }

        debug!("Scope initialized");
        Ok(())
    }

    /// Invokes every provide-method of the object and registers the
    /// produced values into this scope.
    ///
    /// # Errors
    /// See [`ProviderErrorKind`].
    pub fn register_provider(&self, object: &SceneObject) -> Result<(), ProviderErrorKind> {
        register_provider_with(object, &self.inner.registry, &|key| self.resolve(key), self.inner.config)
    }

    /// Registers a pre-built host value under its concrete type and
    /// capabilities, as-is: its injection points, if any, are not filled.
    /// Returns whether the concrete-type registration happened.
    pub fn register_instance<T: Injectable>(&self, value: T) -> bool {
        insert_bindings(&self.inner.registry, &SceneObject::new(value))
    }

    /// Own registry first, then the global scope.
    #[must_use]
    pub fn resolve(&self, key: &TypeInfo) -> Option<AnyInstance> {
        if let Some(instance) = self.inner.registry.lock().get(key) {
            return Some(instance);
        }
        self.global.resolve(key)
    }

    /// Runs the injection pass on the object if its type is classified
    /// injectable; a no-op otherwise.
    ///
    /// # Errors
    /// Propagates the pass failure under the strict policy.
    pub fn inject(&self, object: &SceneObject) -> Result<(), InjectErrorKind> {
        if !self.inner.is_injectable(object) {
            debug!(object = object.type_info().short_name(), "Not injectable, skipped");
            return Ok(());
        }
        object.inject_with(&|key| self.resolve(key), self.inner.config)
    }

    /// Resolves a concrete type through the scope chain.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Shared<T>> {
        get_in(self)
    }

    /// Resolves a capability key through the scope chain.
    #[must_use]
    pub fn get_dyn<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Shared<T>> {
        get_dyn_in(self)
    }

    #[must_use]
    pub fn is_injectable(&self, object: &SceneObject) -> bool {
        self.inner.is_injectable(object)
    }
}

impl Injector for LocalScope {
    fn resolve(&self, key: &TypeInfo) -> Option<AnyInstance> {
        LocalScope::resolve(self, key)
    }

    fn inject(&self, object: &SceneObject) -> Result<(), InjectErrorKind> {
        LocalScope::inject(self, object)
    }
}
