pub mod builder;
pub mod config;
pub mod trainer;

pub use builder::RunBuilder;
pub use config::{BaseConfig, BaseConfigReader, DeviceKind};
pub use trainer::{Trainer, TrainingReport};
