#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid bipartite layout options: {message}")]
    InvalidOptions { message: String },

    #[error("row {index} has an invalid value: {value}")]
    InvalidRow { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
