use std::fs;
use std::path::Path;

use burn::backend::wgpu::WgpuDevice;

use cifarnet_trainer::builder::{auto_device, cpu_device, gpu_device, CpuAdBackend};
use cifarnet_trainer::config::SourceKind;
use cifarnet_trainer::{BaseConfigReader, DeviceKind, RunBuilder};

#[test]
fn test_sample_config_parses() {
    let sample = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../configs/cifar.toml");
    let config = BaseConfigReader::new(&sample).parse().unwrap();

    assert_eq!(config.run_settings.device, DeviceKind::Auto);
    assert_eq!(config.data_settings.source, SourceKind::HuggingFace);
    assert_eq!(config.training_settings.num_epochs, Some(30));
    assert_eq!(config.training_settings.batch_size, Some(32));
    assert_eq!(config.model_settings.hidden_size, Some(500));
    assert_eq!(
        config.output_settings.metrics_file.as_deref(),
        Some("metrics.parquet")
    );
}

#[test]
fn test_missing_sections_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("minimal.toml");
    fs::write(
        &config_file,
        "[training_settings]\nnum_epochs = 3\n\n[data_settings]\nsource = \"binary\"\n",
    )
    .unwrap();

    let builder = RunBuilder::new(&config_file).unwrap();
    let config = builder.base_config();
    assert_eq!(config.run_settings.device, DeviceKind::Auto);
    assert_eq!(config.data_settings.source, SourceKind::Binary);
    assert_eq!(config.data_settings.data_dir, "data");
    assert_eq!(config.output_settings.output_path, "tb_logs");

    let training = builder.training_config();
    assert_eq!(training.num_epochs, 3);
    assert_eq!(training.batch_size, 32);
    assert_eq!(training.model.hidden_size, 500);
}

#[test]
fn test_run_dir_is_timestamped_under_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("run.toml");
    fs::write(&config_file, "[output_settings]\noutput_path = \"runs\"\n").unwrap();

    let builder = RunBuilder::new(&config_file).unwrap();
    let run_dir = builder.run_dir();
    assert_eq!(run_dir.parent().unwrap(), dir.path().join("runs"));
    let name = run_dir.file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), "20240101_120000".len());
    assert_eq!(name.chars().nth(8), Some('_'));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(RunBuilder::new(&dir.path().join("absent.toml")).is_err());

    let config_file = dir.path().join("bad.toml");
    fs::write(&config_file, "[run_settings]\ndevice = \"tpu\"\n").unwrap();
    assert!(RunBuilder::new(&config_file).is_err());
}

#[test]
fn test_zero_batch_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("zero.toml");
    fs::write(
        &config_file,
        "[training_settings]\nbatch_size = 0\n\n[output_settings]\noutput_path = \"runs\"\n",
    )
    .unwrap();

    let builder = RunBuilder::new(&config_file).unwrap();
    let err = builder.build::<CpuAdBackend>(cpu_device()).err().unwrap();
    assert!(err.to_string().contains("batch_size"));
    assert!(!dir.path().join("runs").exists());
}

#[test]
fn test_gpu_and_auto_pick_different_adapters() {
    assert_eq!(auto_device(), WgpuDevice::DefaultDevice);
    assert_eq!(gpu_device(), WgpuDevice::DiscreteGpu(0));
    assert_ne!(auto_device(), gpu_device());
}
