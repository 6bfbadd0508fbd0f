use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::OutputError;
use crate::tables::epoch::{EpochRecord, EpochTrace};
use crate::tables::ResultWriter;
use crate::tensorboard::SummaryWriter;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OutputSettings {
    pub output_path: String,
    pub metrics_file: Option<String>,
    pub save_checkpoints: bool,
    pub misclassified_batches: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_path: "tb_logs".to_string(),
            metrics_file: Some("metrics.parquet".to_string()),
            save_checkpoints: false,
            misclassified_batches: 10,
        }
    }
}

/// Every sink a training run writes to.
pub struct Results {
    pub run_dir: PathBuf,
    pub summary: SummaryWriter,
    pub epochs: Option<EpochTrace>,
}

impl Results {
    pub fn new(run_dir: &Path, output_settings: &OutputSettings) -> Result<Self, OutputError> {
        let summary = SummaryWriter::new(run_dir)?;
        let epochs = output_settings
            .metrics_file
            .as_ref()
            .map(|file_name| EpochTrace::new(&run_dir.join(file_name)))
            .transpose()?;
        Ok(Self {
            run_dir: run_dir.to_path_buf(),
            summary,
            epochs,
        })
    }

    pub fn add_epoch(&mut self, record: EpochRecord) -> Result<(), OutputError> {
        if let Some(trace) = &mut self.epochs {
            trace.add_data(record);
            trace.write_to_file()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.summary.flush()
    }

    pub fn close_files(mut self) -> Result<(), OutputError> {
        self.summary.flush()?;
        if let Some(trace) = self.epochs {
            trace.close_file()?;
        }
        Ok(())
    }
}
