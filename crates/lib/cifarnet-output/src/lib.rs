pub mod error;
pub mod logger;
pub mod result;
pub mod tables;
pub mod tensorboard;
pub mod writer;

pub use error::OutputError;
