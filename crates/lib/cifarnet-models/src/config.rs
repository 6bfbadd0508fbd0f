use burn::config::Config;
use burn::optim::AdamConfig;
use serde::Deserialize;

use crate::cnn::CifarCnnConfig;

/// Builds a value from its (partially filled) input settings.
pub trait FromSettings {
    type Settings;

    fn with_settings(settings: &Self::Settings) -> Self;
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelSettings {
    pub num_classes: Option<usize>,
    pub hidden_size: Option<usize>,
    pub drop_out: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrainingSettings {
    pub num_epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub num_workers: Option<usize>,
    pub seed: Option<u64>,
    pub learning_rate: Option<f64>,
    pub log_interval: Option<usize>,
}

impl FromSettings for CifarCnnConfig {
    type Settings = ModelSettings;

    fn with_settings(settings: &Self::Settings) -> Self {
        let mut model_config = CifarCnnConfig::new();
        if let Some(num_classes) = settings.num_classes {
            model_config.num_classes = num_classes;
        }
        if let Some(hidden_size) = settings.hidden_size {
            model_config.hidden_size = hidden_size;
        }
        if let Some(drop_out) = settings.drop_out {
            model_config.drop_out = drop_out;
        }
        model_config
    }
}

#[derive(Config)]
pub struct CifarTrainingConfig {
    pub model: CifarCnnConfig,
    pub optimizer: AdamConfig,
    #[config(default = 30)]
    pub num_epochs: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 4)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 5.0e-4)]
    pub learning_rate: f64,
    #[config(default = 100)]
    pub log_interval: usize,
}

impl CifarTrainingConfig {
    pub fn from_settings(model: &ModelSettings, training: &TrainingSettings) -> Self {
        let mut train_config = CifarTrainingConfig::new(
            CifarCnnConfig::with_settings(model),
            AdamConfig::new(),
        );
        if let Some(num_epochs) = training.num_epochs {
            train_config.num_epochs = num_epochs;
        }
        if let Some(batch_size) = training.batch_size {
            train_config.batch_size = batch_size;
        }
        if let Some(num_workers) = training.num_workers {
            train_config.num_workers = num_workers;
        }
        if let Some(seed) = training.seed {
            train_config.seed = seed;
        }
        if let Some(learning_rate) = training.learning_rate {
            train_config.learning_rate = learning_rate;
        }
        if let Some(log_interval) = training.log_interval {
            train_config.log_interval = log_interval.max(1);
        }
        train_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_settings() {
        let config =
            CifarTrainingConfig::from_settings(&ModelSettings::default(), &TrainingSettings::default());
        assert_eq!(config.num_epochs, 30);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.model.num_classes, 10);
        assert_eq!(config.model.hidden_size, 500);
        assert!((config.learning_rate - 5.0e-4).abs() < f64::EPSILON);
    }

    #[test]
    fn settings_override_defaults() {
        let model = ModelSettings {
            hidden_size: Some(64),
            drop_out: Some(0.0),
            ..Default::default()
        };
        let training = TrainingSettings {
            num_epochs: Some(2),
            log_interval: Some(0),
            ..Default::default()
        };
        let config = CifarTrainingConfig::from_settings(&model, &training);
        assert_eq!(config.num_epochs, 2);
        assert_eq!(config.log_interval, 1);
        assert_eq!(config.model.hidden_size, 64);
        assert_eq!(config.model.drop_out, 0.0);
    }
}
