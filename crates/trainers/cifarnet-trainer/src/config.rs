use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;

use cifarnet_data::DataSource;
use cifarnet_models::{ModelSettings, TrainingSettings};
use cifarnet_output::logger::LogSettings;
use cifarnet_output::result::OutputSettings;

#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Whatever adapter wgpu picks, falling back to a software one.
    #[default]
    Auto,
    /// First discrete GPU.
    Gpu,
    /// ndarray backend on the host CPU.
    Cpu,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    HuggingFace,
    Binary,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DataSettings {
    pub source: SourceKind,
    pub data_dir: String,
    pub train_limit: Option<usize>,
    pub test_limit: Option<usize>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            data_dir: "data".to_string(),
            train_limit: None,
            test_limit: None,
        }
    }
}

impl DataSettings {
    pub fn data_source(&self, config_path: &Path) -> DataSource {
        let dir = config_path.join(&self.data_dir);
        match self.source {
            SourceKind::HuggingFace => DataSource::HuggingFace {
                base_dir: Some(dir),
            },
            SourceKind::Binary => DataSource::Binary { dir },
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RunSettings {
    pub run_name: Option<String>,
    pub device: DeviceKind,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BaseConfig {
    pub run_settings: RunSettings,
    pub log_settings: LogSettings,
    pub data_settings: DataSettings,
    pub model_settings: ModelSettings,
    pub training_settings: TrainingSettings,
    pub output_settings: OutputSettings,
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &Path) -> Self {
        Self {
            file_path: file_name.to_path_buf(),
        }
    }

    pub fn parse(&self) -> anyhow::Result<BaseConfig> {
        let content = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("failed to read {}", self.file_path.display()))?;
        let config: BaseConfig = toml::from_str(&content)
            .with_context(|| format!("invalid configuration in {}", self.file_path.display()))?;
        Ok(config)
    }
}
