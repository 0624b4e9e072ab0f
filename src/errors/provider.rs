use super::{inject::InjectErrorKind, instantiate::InstantiateErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ProviderErrorKind {
    #[error("Provider `{}` failed to produce `{}`", provider.name, provides.name)]
    Factory {
        provider: TypeInfo,
        provides: TypeInfo,
        #[source]
        source: InstantiateErrorKind,
    },
    #[error("Provider `{}` produced a partially initialized `{}`", provider.name, provides.name)]
    Inject {
        provider: TypeInfo,
        provides: TypeInfo,
        #[source]
        source: InjectErrorKind,
    },
}
