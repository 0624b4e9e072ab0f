use super::{inject::InjectErrorKind, provider::ProviderErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ScopeErrorKind {
    #[error(transparent)]
    Provider(#[from] ProviderErrorKind),
    #[error(transparent)]
    Inject(#[from] InjectErrorKind),
}
