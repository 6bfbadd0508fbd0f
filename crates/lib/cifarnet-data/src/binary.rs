//! Reader for the binary distribution of CIFAR-10.
//!
//! Every batch file is a flat sequence of 3073 byte records: one label byte
//! followed by the red, green and blue planes of a 32x32 image.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::cifar::{CifarItem, Split, CHANNELS, HEIGHT, IMAGE_BYTES, WIDTH};
use crate::error::DataError;

pub const RECORD_BYTES: usize = 1 + IMAGE_BYTES;

const TRAIN_BATCHES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_BATCHES: [&str; 1] = ["test_batch.bin"];
const EXTRACTED_DIR: &str = "cifar-10-batches-bin";

pub(crate) fn read_split(dir: &Path, split: Split) -> Result<Vec<CifarItem>, DataError> {
    let batch_dir = resolve_batch_dir(dir);
    let file_names: &[&str] = match split {
        Split::Train => &TRAIN_BATCHES,
        Split::Test => &TEST_BATCHES,
    };

    let batch_files: Vec<PathBuf> = file_names.iter().map(|name| batch_dir.join(name)).collect();
    if let Some(missing) = batch_files.iter().find(|path| !path.is_file()) {
        return Err(DataError::MissingBatches(missing.clone()));
    }

    let mut items = Vec::new();
    for batch_file in batch_files {
        debug!("Reading batch file {}", batch_file.display());
        items.extend(read_batch_file(&batch_file)?);
    }
    Ok(items)
}

/// Accepts either the extracted batch directory or its parent.
fn resolve_batch_dir(dir: &Path) -> PathBuf {
    let nested = dir.join(EXTRACTED_DIR);
    if nested.is_dir() {
        nested
    } else {
        dir.to_path_buf()
    }
}

pub fn read_batch_file(path: &Path) -> Result<Vec<CifarItem>, DataError> {
    let bytes = fs::read(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&bytes)
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<CifarItem>, DataError> {
    if bytes.len() % RECORD_BYTES != 0 {
        return Err(DataError::MalformedBatch {
            len: bytes.len(),
            record: RECORD_BYTES,
        });
    }
    bytes
        .chunks_exact(RECORD_BYTES)
        .map(|record| CifarItem::new(chw_to_hwc(&record[1..]), record[0]))
        .collect()
}

pub fn chw_to_hwc(chw: &[u8]) -> Vec<u8> {
    let plane = WIDTH * HEIGHT;
    let mut hwc = vec![0u8; IMAGE_BYTES];
    for pixel in 0..plane {
        for channel in 0..CHANNELS {
            hwc[pixel * CHANNELS + channel] = chw[channel * plane + pixel];
        }
    }
    hwc
}
