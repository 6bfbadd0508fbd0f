use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logger configuration failed: {0}")]
    Logger(String),
    #[error("unsupported output file extension for {0}")]
    Extension(PathBuf),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image data has {found} bytes but dims {dims:?} need {expected}")]
    ImageShape {
        dims: [usize; 3],
        expected: usize,
        found: usize,
    },
    #[error("corrupt event record: {0}")]
    CorruptRecord(String),
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}
