use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::config::Config;
use burn::tensor::backend::AutodiffBackend;
use chrono::Local;
use log::info;

use cifarnet_data::{CifarDataset, Split};
use cifarnet_models::CifarTrainingConfig;
use cifarnet_output::logger::initiate_logger;
use cifarnet_output::result::Results;

use crate::config::{BaseConfig, BaseConfigReader};
use crate::trainer::Trainer;

pub type GpuBackend = Wgpu<f32, i32>;
pub type GpuAdBackend = Autodiff<GpuBackend>;

pub type CpuBackend = NdArray<f32>;
pub type CpuAdBackend = Autodiff<CpuBackend>;

pub fn auto_device() -> WgpuDevice {
    WgpuDevice::DefaultDevice
}

/// First discrete GPU reported by wgpu.
pub fn gpu_device() -> WgpuDevice {
    WgpuDevice::DiscreteGpu(0)
}

pub fn cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

pub struct RunBuilder {
    base_config: BaseConfig,
    config_path: PathBuf,
}

impl RunBuilder {
    pub fn new(base_config_file: &Path) -> anyhow::Result<Self> {
        if !base_config_file.exists() {
            bail!(
                "Configuration file {} is not found.",
                base_config_file.display()
            );
        }
        let config_path = base_config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base_config = BaseConfigReader::new(base_config_file).parse()?;
        Ok(Self::with_config(base_config, &config_path))
    }

    /// Relative paths in `base_config` are resolved against `config_path`.
    pub fn with_config(base_config: BaseConfig, config_path: &Path) -> Self {
        Self {
            base_config,
            config_path: config_path.to_path_buf(),
        }
    }

    pub fn base_config(&self) -> &BaseConfig {
        &self.base_config
    }

    pub fn base_config_mut(&mut self) -> &mut BaseConfig {
        &mut self.base_config
    }

    pub fn init_logging(&self) -> anyhow::Result<PathBuf> {
        let log_file = initiate_logger(&self.config_path, &self.base_config.log_settings)?;
        Ok(log_file)
    }

    pub fn training_config(&self) -> CifarTrainingConfig {
        CifarTrainingConfig::from_settings(
            &self.base_config.model_settings,
            &self.base_config.training_settings,
        )
    }

    /// `<output_path>/<run_name>`, with the start time as the default run name.
    pub fn run_dir(&self) -> PathBuf {
        let run_name = self
            .base_config
            .run_settings
            .run_name
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y%m%d_%H%M%S").to_string());
        self.config_path
            .join(&self.base_config.output_settings.output_path)
            .join(run_name)
    }

    pub fn build<B: AutodiffBackend>(&self, device: B::Device) -> anyhow::Result<Trainer<B>> {
        let config = self.training_config();
        if config.batch_size == 0 {
            bail!("training_settings.batch_size must be at least 1");
        }
        let run_dir = self.run_dir();
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;
        config
            .save(run_dir.join("config.json"))
            .context("failed to save the training configuration")?;
        info!("Writing run outputs to {}", run_dir.display());

        let (train_data, test_data) = self.build_datasets()?;
        let output_settings = &self.base_config.output_settings;
        let results = Results::new(&run_dir, output_settings)?;
        let checkpoint_dir = output_settings
            .save_checkpoints
            .then(|| run_dir.join("models"));

        Ok(Trainer::builder()
            .config(config)
            .device(device)
            .train_data(train_data)
            .test_data(test_data)
            .results(results)
            .checkpoint_dir(checkpoint_dir)
            .misclassified_batches(output_settings.misclassified_batches)
            .build())
    }

    fn build_datasets(&self) -> anyhow::Result<(CifarDataset, CifarDataset)> {
        let data_settings = &self.base_config.data_settings;
        let source = data_settings.data_source(&self.config_path);

        info!("Loading the training and test splits...");
        let mut train_data = CifarDataset::load(&source, Split::Train)?;
        let mut test_data = CifarDataset::load(&source, Split::Test)?;
        if let Some(limit) = data_settings.train_limit {
            train_data = train_data.take(limit);
        }
        if let Some(limit) = data_settings.test_limit {
            test_data = test_data.take(limit);
        }
        if train_data.images.is_empty() || test_data.images.is_empty() {
            bail!("Both dataset splits must contain at least one image");
        }
        Ok((train_data, test_data))
    }
}
