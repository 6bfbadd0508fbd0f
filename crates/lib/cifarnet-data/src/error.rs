use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("hugging face importer failed: {0}")]
    Importer(String),
    #[error("sqlite query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("batch of {len} bytes is not a multiple of the {record} byte record size")]
    MalformedBatch { len: usize, record: usize },
    #[error("label {0} is not one of the ten classes")]
    InvalidLabel(u8),
    #[error("image has {found} bytes, expected {expected}")]
    ImageSize { expected: usize, found: usize },
    #[error("batch file {0} is missing")]
    MissingBatches(PathBuf),
    #[error("an image grid needs at least one image")]
    EmptyGrid,
}
