use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use cifarnet_trainer::builder::{auto_device, cpu_device, gpu_device, CpuAdBackend, GpuAdBackend};
use cifarnet_trainer::{DeviceKind, RunBuilder};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: PathBuf,
    #[arg(long, value_enum)]
    device: Option<DeviceKind>,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();

    let mut builder = RunBuilder::new(&args.config)
        .with_context(|| format!("could not load {}", args.config.display()))?;
    if let Some(device) = args.device {
        builder.base_config_mut().run_settings.device = device;
    }
    let log_file = builder.init_logging()?;
    info!("Logging to {}", log_file.display());

    let device = builder.base_config().run_settings.device;
    info!("Training on the {device:?} device");
    let report_dir = match device {
        DeviceKind::Auto => builder.build::<GpuAdBackend>(auto_device())?.fit()?.run_dir,
        DeviceKind::Gpu => builder.build::<GpuAdBackend>(gpu_device())?.fit()?.run_dir,
        DeviceKind::Cpu => builder.build::<CpuAdBackend>(cpu_device())?.fit()?.run_dir,
    };

    println!(
        "Training finished in {} s. Run directory: {}",
        start.elapsed().as_secs(),
        report_dir.display()
    );
    Ok(())
}
