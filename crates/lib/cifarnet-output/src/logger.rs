use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::runtime::ConfigErrors;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;

use crate::error::OutputError;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogSettings {
    pub log_path: String,
    pub log_level: String,
    pub log_file_name: String,
    pub log_overwrite: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_path: "logs".to_string(),
            log_level: "info".to_string(),
            log_file_name: "cifarnet.log".to_string(),
            log_overwrite: false,
        }
    }
}

pub fn setup_logging(log_level: &str, log_file_path: &Path) -> Result<Config, OutputError> {
    let log_level = get_logging_level(log_level);
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y.%m.%d %H:%M:%S)} | {({l}):5.5} | {({f}:{L}):>40.40} — {m}{n}",
        )))
        .build(log_file_path)
        .map_err(|e| OutputError::io(log_file_path, e))?;
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} | {h({l}):5.5} | {m}{n}")))
        .build();

    Config::builder()
        .appender(Appender::builder().build("file", Box::new(log_file)))
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(
            Root::builder()
                .appender("file")
                .appender("console")
                .build(log_level),
        )
        .map_err(|e: ConfigErrors| OutputError::Logger(e.to_string()))
}

fn get_logging_level(log_level: &str) -> LevelFilter {
    match log_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Picks the log file inside `log_dir`, renaming with a timestamp when an old
/// file must be kept.
pub fn resolve_log_file(log_dir: &Path, log_settings: &LogSettings) -> Result<PathBuf, OutputError> {
    let log_file_path = log_dir.join(&log_settings.log_file_name);
    if !log_file_path.exists() {
        return Ok(log_file_path);
    }
    if log_settings.log_overwrite {
        fs::remove_file(&log_file_path).map_err(|e| OutputError::io(&log_file_path, e))?;
        return Ok(log_file_path);
    }

    let stamp = Local::now().format("_%d%m%Y_%H%M%S").to_string();
    let stem = Path::new(&log_settings.log_file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("cifarnet");
    Ok(log_dir.join(format!("{stem}{stamp}.log")))
}

pub fn initiate_logger(config_path: &Path, log_settings: &LogSettings) -> Result<PathBuf, OutputError> {
    let log_dir = config_path.join(&log_settings.log_path);
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).map_err(|e| OutputError::io(&log_dir, e))?;
    }

    let log_file_path = resolve_log_file(&log_dir, log_settings)?;
    let logger_config = setup_logging(&log_settings.log_level, &log_file_path)?;
    log4rs::init_config(logger_config).map_err(|e| OutputError::Logger(e.to_string()))?;
    Ok(log_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(get_logging_level("debug"), LevelFilter::Debug);
        assert_eq!(get_logging_level("loud"), LevelFilter::Info);
    }

    #[test]
    fn existing_log_is_kept_unless_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = LogSettings::default();
        let fresh = resolve_log_file(dir.path(), &settings).unwrap();
        assert_eq!(fresh, dir.path().join("cifarnet.log"));

        fs::write(&fresh, "old run").unwrap();
        let renamed = resolve_log_file(dir.path(), &settings).unwrap();
        assert_ne!(renamed, fresh);
        assert!(fresh.exists());

        settings.log_overwrite = true;
        let replaced = resolve_log_file(dir.path(), &settings).unwrap();
        assert_eq!(replaced, fresh);
        assert!(!fresh.exists());
    }
}
