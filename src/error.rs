use thiserror::Error;

/// Library error type for media display operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or announcement source is malformed or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A photo or video could not be read or has unusable dimensions.
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    /// The external video player failed to launch or exited abnormally.
    #[error("video player failed: {0}")]
    ExternalProcess(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
