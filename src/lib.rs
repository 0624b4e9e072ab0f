//! Scene-scoped dependency injection for component-driven runtimes.
//!
//! A host hands each scope the flat set of objects in its domain. The scope
//! classifies which member types take part in injection, seeds its registry
//! from provider factory methods (and, for local scopes, member
//! self-registration), then fills every declared injection point before any
//! object starts normal operation. Local scopes resolve through the global
//! scope on a miss, so locally scoped objects can depend on globally
//! provided values without special-casing.

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod classifier;
pub(crate) mod config;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod injectable;
pub(crate) mod object;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod scope;

pub use any::{AnyInstance, Shared, TypeInfo};
pub use classifier::{compute_injectable_types, InjectableTypeSet};
pub use config::{Config, UnresolvedPolicy};
pub use dependency_resolver::{Dependency, DependencySet};
pub use errors::{InjectErrorKind, InstantiateErrorKind, ProviderErrorKind, ScopeErrorKind};
pub use inject::{Inject, InjectDyn};
pub use injectable::{CapabilityBinding, Injectable, InjectionPoint, MemberKind, MethodAction};
pub use object::SceneObject;
pub use provider::{ProvideMethod, Provider};
pub use registry::Registry;
pub use scope::{GlobalScope, Injector, LocalScope};
