pub mod batcher;
pub mod binary;
pub mod cifar;
pub mod classes;
pub mod error;
pub mod grid;

pub use batcher::{CifarBatch, CifarBatcher, Normalizer};
pub use cifar::{CifarDataset, CifarItem, DataSource, Split};
pub use classes::CifarClass;
pub use error::DataError;
pub use grid::{image_grid, GridImage};
