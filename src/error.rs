use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid duration '{value}': {source}")]
    Duration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("image buffer does not match {width}x{height} rgba")]
    ImageBuffer { width: usize, height: usize },

    #[error("invalid image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("could not determine {0} directory")]
    NoDataDir(&'static str),

    #[error("no history entry at position {index} (history has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
