#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    /// The factory promised a value and produced none.
    #[error("Factory returned no value")]
    Missing,
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
