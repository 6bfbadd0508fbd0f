use std::path::Path;

use log::warn;

use crate::error::OutputError;
use crate::tensorboard::event_writer::{wall_time, EventFileWriter};
use crate::tensorboard::proto::event::What;
use crate::tensorboard::proto::{Event, Summary};
use crate::tensorboard::summary::{histogram, image, scalar};

/// Scalar, image and histogram logging into one TensorBoard run directory.
pub struct SummaryWriter {
    writer: EventFileWriter,
}

impl SummaryWriter {
    pub fn new<P: AsRef<Path>>(logdir: P) -> Result<Self, OutputError> {
        Ok(Self {
            writer: EventFileWriter::new(logdir)?,
        })
    }

    pub fn file_path(&self) -> &Path {
        self.writer.file_path()
    }

    pub fn add_summary(&mut self, summary: Summary, step: usize) -> Result<(), OutputError> {
        let event = Event {
            wall_time: wall_time(),
            step: step as i64,
            what: Some(What::Summary(summary)),
        };
        self.writer.add_event(&event)
    }

    pub fn add_scalar(&mut self, tag: &str, value: f32, step: usize) -> Result<(), OutputError> {
        self.add_summary(scalar(tag, value), step)
    }

    /// `data` is an RGB image in CHW byte order with `dims = [3, height, width]`.
    pub fn add_image(
        &mut self,
        tag: &str,
        data: &[u8],
        dims: [usize; 3],
        step: usize,
    ) -> Result<(), OutputError> {
        let summary = image(tag, data, dims)?;
        self.add_summary(summary, step)
    }

    pub fn add_histogram(
        &mut self,
        tag: &str,
        data: &[f64],
        num_buckets: usize,
        step: usize,
    ) -> Result<(), OutputError> {
        if data.is_empty() {
            warn!("Skipping histogram {tag} at step {step}: no values");
            return Ok(());
        }
        self.add_summary(histogram(tag, data, num_buckets), step)
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()
    }
}
