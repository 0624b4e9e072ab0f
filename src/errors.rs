mod inject;
mod instantiate;
mod provider;
mod scope;

pub use inject::InjectErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use provider::ProviderErrorKind;
pub use scope::ScopeErrorKind;
