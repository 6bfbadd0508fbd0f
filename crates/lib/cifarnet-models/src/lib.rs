pub mod cnn;
pub mod config;

pub use cnn::{CifarCnn, CifarCnnConfig};
pub use config::{CifarTrainingConfig, FromSettings, ModelSettings, TrainingSettings};
