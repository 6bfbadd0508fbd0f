use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use prost::Message;

use crate::error::OutputError;
use crate::tensorboard::proto::event::What;
use crate::tensorboard::proto::Event;
use crate::tensorboard::record::RecordWriter;

const FILE_VERSION: &str = "brain.Event:2";

pub(crate) fn wall_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// Appends events to `events.out.tfevents.<secs>.<host>` inside a log directory.
pub struct EventFileWriter {
    file_path: PathBuf,
    writer: RecordWriter<BufWriter<File>>,
}

impl EventFileWriter {
    pub fn new<P: AsRef<Path>>(logdir: P) -> Result<Self, OutputError> {
        let logdir = logdir.as_ref().to_path_buf();
        fs::create_dir_all(&logdir).map_err(|e| OutputError::io(&logdir, e))?;

        let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let file_name = format!(
            "events.out.tfevents.{}.{}.{}",
            wall_time() as u64,
            host,
            std::process::id()
        );
        let file_path = logdir.join(file_name);
        let file = File::create(&file_path).map_err(|e| OutputError::io(&file_path, e))?;
        debug!("Writing events to {}", file_path.display());

        let mut event_writer = Self {
            file_path,
            writer: RecordWriter::new(BufWriter::new(file)),
        };
        let version_event = Event {
            wall_time: wall_time(),
            step: 0,
            what: Some(What::FileVersion(FILE_VERSION.to_string())),
        };
        event_writer.add_event(&version_event)?;
        event_writer.flush()?;
        Ok(event_writer)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn add_event(&mut self, event: &Event) -> Result<(), OutputError> {
        self.writer
            .write_record(&event.encode_to_vec())
            .map_err(|e| OutputError::io(&self.file_path, e))
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer
            .flush()
            .map_err(|e| OutputError::io(&self.file_path, e))
    }
}
