use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    any::{AnyInstance, Shared, TypeInfo},
    config::{Config, UnresolvedPolicy},
    dependency_resolver::{Dependency, DependencySet},
    errors::InjectErrorKind,
};

/// Declares a type's injection-marked members.
///
/// Both tables default to empty so leaf types (values without dependencies
/// or extra keys of their own) implement the trait with an empty body.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Declarative table of members the injection pass fills.
    #[must_use]
    fn injection_points() -> Vec<InjectionPoint<Self>> {
        Vec::new()
    }

    /// Capability keys this type is registered under in addition to its
    /// concrete type. See [`capabilities!`].
    #[must_use]
    fn capabilities() -> Vec<CapabilityBinding<Self>> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

type PointAction<C> = Box<dyn Fn(&mut C, Vec<AnyInstance>) -> Result<(), InjectErrorKind> + Send + Sync>;

/// One entry of a type's member table: which member, what it requires, and
/// how resolved values are applied to the target.
pub struct InjectionPoint<C> {
    member: &'static str,
    kind: MemberKind,
    requires: Vec<TypeInfo>,
    action: PointAction<C>,
}

impl<C: Injectable> InjectionPoint<C> {
    /// Member assigned unconditionally once its dependency resolves.
    #[must_use]
    pub fn field<D, F>(member: &'static str, assign: F) -> Self
    where
        D: Dependency,
        F: Fn(&mut C, D) + Send + Sync + 'static,
    {
        Self {
            member,
            kind: MemberKind::Field,
            requires: vec![D::type_info()],
            action: Box::new(move |target, instances| {
                let dependency = extract_single::<C, D>(member, instances)?;
                assign(target, dependency);
                Ok(())
            }),
        }
    }

    /// Member assigned through a setter that may refuse the value. A refusal
    /// is reported as a non-writable member under the active policy.
    #[must_use]
    pub fn property<D, F>(member: &'static str, assign: F) -> Self
    where
        D: Dependency,
        F: Fn(&mut C, D) -> bool + Send + Sync + 'static,
    {
        Self {
            member,
            kind: MemberKind::Property,
            requires: vec![D::type_info()],
            action: Box::new(move |target, instances| {
                let dependency = extract_single::<C, D>(member, instances)?;
                if assign(target, dependency) {
                    Ok(())
                } else {
                    Err(InjectErrorKind::NotWritable {
                        owner: TypeInfo::of::<C>(),
                        member,
                    })
                }
            }),
        }
    }

    /// Member invoked with the full resolved argument list, or not at all.
    #[must_use]
    pub fn method<Deps, F>(member: &'static str, action: F) -> Self
    where
        Deps: DependencySet,
        F: MethodAction<C, Deps>,
    {
        Self {
            member,
            kind: MemberKind::Method,
            requires: Deps::type_infos(),
            action: Box::new(move |target, instances| match Deps::extract(instances) {
                Ok(dependencies) => {
                    action.invoke(target, dependencies);
                    Ok(())
                }
                Err(expected) => Err(InjectErrorKind::IncorrectType {
                    owner: TypeInfo::of::<C>(),
                    member,
                    expected,
                }),
            }),
        }
    }

    #[must_use]
    pub fn member(&self) -> &'static str {
        self.member
    }

    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[must_use]
    pub fn requires(&self) -> &[TypeInfo] {
        &self.requires
    }
}

fn extract_single<C: Injectable, D: Dependency>(
    member: &'static str,
    mut instances: Vec<AnyInstance>,
) -> Result<D, InjectErrorKind> {
    instances
        .pop()
        .and_then(D::extract)
        .ok_or(InjectErrorKind::IncorrectType {
            owner: TypeInfo::of::<C>(),
            member,
            expected: D::type_info(),
        })
}

/// Closures usable as method injection points:
/// `|target: &mut C, Inject(a): Inject<A>, ..| { .. }`.
pub trait MethodAction<C, Deps>: Send + Sync + 'static {
    fn invoke(&self, target: &mut C, dependencies: Deps);
}

macro_rules! impl_method_action {
    ([$($ty:ident),*]) => {
        #[allow(non_snake_case)]
        impl<C, F, $($ty),*> MethodAction<C, ($($ty,)*)> for F
        where
            F: Fn(&mut C, $($ty),*) + Send + Sync + 'static,
            $($ty: Dependency,)*
        {
            fn invoke(&self, target: &mut C, ($($ty,)*): ($($ty,)*)) {
                self(target, $($ty),*)
            }
        }
    };
}

all_the_tuples!(impl_method_action);

type BindFn<C> = Box<dyn Fn(Shared<C>) -> AnyInstance + Send + Sync>;

/// Registration of a component under one of its capability (trait object)
/// keys.
pub struct CapabilityBinding<C> {
    type_info: TypeInfo,
    bind: BindFn<C>,
}

impl<C: Injectable> CapabilityBinding<C> {
    /// Binds the component under `T`'s key through the given upcast —
    /// usually just `|shared| shared`, which [`capabilities!`] spells for
    /// you.
    #[must_use]
    pub fn new<T>(cast: fn(Shared<C>) -> Shared<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            bind: Box::new(move |shared| Arc::new(cast(shared)) as AnyInstance),
        }
    }

    pub(crate) fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    pub(crate) fn erase(&self, shared: Shared<C>) -> AnyInstance {
        (self.bind)(shared)
    }
}

/// Declares the capability keys of an [`Injectable`] type:
///
/// ```rust
/// use stagewire::{capabilities, CapabilityBinding, Injectable};
///
/// trait Renderer: Send + Sync {}
///
/// struct Sprite;
///
/// impl Renderer for Sprite {}
///
/// impl Injectable for Sprite {
///     fn capabilities() -> Vec<CapabilityBinding<Self>> {
///         capabilities![dyn Renderer]
///     }
/// }
/// ```
#[macro_export]
macro_rules! capabilities {
    ($($cap:ty),+ $(,)?) => {
        vec![$($crate::CapabilityBinding::new::<$cap>(|shared| shared)),+]
    };
}

pub(crate) type ResolveFn<'a> = &'a dyn Fn(&TypeInfo) -> Option<AnyInstance>;

/// Fills every injection point of `target`. Members with unresolved
/// dependencies follow the configured policy; methods are only invoked when
/// every parameter resolved.
pub(crate) fn run_injection_pass<C>(
    owner: TypeInfo,
    target: &mut C,
    points: &[InjectionPoint<C>],
    resolve: ResolveFn<'_>,
    config: Config,
) -> Result<(), InjectErrorKind> {
    for point in points {
        let mut instances = Vec::with_capacity(point.requires.len());
        let mut missing = None;
        for required in &point.requires {
            match resolve(required) {
                Some(instance) => instances.push(instance),
                None => {
                    missing = Some(*required);
                    break;
                }
            }
        }

        if let Some(missing) = missing {
            match config.unresolved {
                UnresolvedPolicy::Strict => {
                    let err = InjectErrorKind::Unresolved {
                        owner,
                        member: point.member,
                        missing,
                    };
                    error!("{err}");
                    return Err(err);
                }
                UnresolvedPolicy::Lenient => {
                    debug!(
                        member = point.member,
                        missing = missing.short_name(),
                        "Unresolved dependency, member skipped"
                    );
                    continue;
                }
            }
        }

        match (point.action)(target, instances) {
            Ok(()) => debug!(member = point.member, kind = ?point.kind, "Injected"),
            Err(err @ InjectErrorKind::NotWritable { .. }) => match config.unresolved {
                UnresolvedPolicy::Strict => {
                    error!("{err}");
                    return Err(err);
                }
                UnresolvedPolicy::Lenient => {
                    debug!(member = point.member, "Non-writable member skipped");
                }
            },
            Err(err) => {
                error!("{err}");
                return Err(err);
            }
        }
    }

    Ok(())
}
