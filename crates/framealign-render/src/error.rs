pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] framealign_core::Error),
    #[error(transparent)]
    Layout(#[from] ibis::Error),
}
