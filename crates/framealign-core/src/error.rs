pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed alignment document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed alignment document: {message}")]
    DocumentParse { message: String },

    #[error("unknown scoring technique: {id}")]
    UnknownScoring { id: String },

    #[error("unknown frame: {gid}")]
    UnknownFrame { gid: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}
