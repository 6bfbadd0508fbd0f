use std::path::{Path, PathBuf};

use burn::data::dataset::{Dataset, HuggingfaceDatasetLoader};
use image::load_from_memory;
use log::{debug, info};
use rusqlite::Connection;

use crate::binary;
use crate::classes::NUM_CLASSES;
use crate::error::DataError;

pub const WIDTH: usize = 32;
pub const HEIGHT: usize = 32;
pub const CHANNELS: usize = 3;
pub const IMAGE_BYTES: usize = WIDTH * HEIGHT * CHANNELS;

const HF_DATASET: &str = "uoft-cs/cifar10";

/// A single CIFAR-10 image in HWC byte order together with its class label.
#[derive(Clone, Debug, PartialEq)]
pub struct CifarItem {
    image: Vec<u8>,
    label: u8,
}

impl CifarItem {
    pub fn new(image: Vec<u8>, label: u8) -> Result<Self, DataError> {
        if image.len() != IMAGE_BYTES {
            return Err(DataError::ImageSize {
                expected: IMAGE_BYTES,
                found: image.len(),
            });
        }
        if label as usize >= NUM_CLASSES {
            return Err(DataError::InvalidLabel(label));
        }
        Ok(Self { image, label })
    }

    pub fn label(&self) -> u8 {
        self.label
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Image bytes re-ordered into channel planes.
    pub fn to_chw(&self) -> Vec<u8> {
        let plane = WIDTH * HEIGHT;
        let mut chw = vec![0u8; IMAGE_BYTES];
        for (pixel, rgb) in self.image.chunks_exact(CHANNELS).enumerate() {
            for (channel, value) in rgb.iter().enumerate() {
                chw[channel * plane + pixel] = *value;
            }
        }
        chw
    }
}

/// Dataset split to load.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

/// Where the raw images come from.
#[derive(Clone, Debug)]
pub enum DataSource {
    /// Hugging Face `uoft-cs/cifar10`, cached as sqlite under `base_dir`.
    HuggingFace { base_dir: Option<PathBuf> },
    /// The official binary batches (`data_batch_*.bin`, `test_batch.bin`).
    Binary { dir: PathBuf },
}

#[derive(Clone, Default, Debug)]
pub struct CifarDataset {
    pub images: Vec<CifarItem>,
}

impl CifarDataset {
    pub fn load(source: &DataSource, split: Split) -> Result<Self, DataError> {
        let images = match source {
            DataSource::HuggingFace { base_dir } => {
                Self::read_huggingface(base_dir.as_deref(), split)?
            }
            DataSource::Binary { dir } => binary::read_split(dir, split)?,
        };
        info!("Loaded {} {} images", images.len(), split.table());
        Ok(Self { images })
    }

    pub fn with_images(images: Vec<CifarItem>) -> Self {
        Self { images }
    }

    /// Keeps only the first `count` images.
    pub fn take(mut self, count: usize) -> Self {
        self.images.truncate(count);
        self
    }

    fn read_huggingface(base_dir: Option<&Path>, split: Split) -> Result<Vec<CifarItem>, DataError> {
        let mut loader = HuggingfaceDatasetLoader::new(HF_DATASET);
        if let Some(dir) = base_dir.and_then(|dir| dir.to_str()) {
            loader = loader.with_base_dir(dir);
        }
        let db_file = loader
            .db_file()
            .map_err(|e| DataError::Importer(e.to_string()))?;
        debug!("Reading {} split from {}", split.table(), db_file.display());
        Self::read_sqlite(&db_file, split)
    }

    /// Reads the `img_bytes` and `label` columns of the split table.
    pub fn read_sqlite(sql_file: &Path, split: Split) -> Result<Vec<CifarItem>, DataError> {
        let connection = Connection::open(sql_file)?;
        let query = format!(
            "SELECT img_bytes, label FROM {} ORDER BY row_id",
            split.table()
        );
        let mut statement = connection.prepare(&query)?;
        let rows = statement.query_map([], |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, u8>(1)?))
        })?;

        let mut cifar_items = Vec::new();
        for row in rows {
            let (image_bytes, label) = row?;
            let image = load_from_memory(&image_bytes)?.into_rgb8().into_raw();
            cifar_items.push(CifarItem::new(image, label)?);
        }
        Ok(cifar_items)
    }
}

impl Dataset<CifarItem> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarItem> {
        self.images.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chw_splits_interleaved_channels() {
        let mut image = vec![0u8; IMAGE_BYTES];
        image[0] = 10;
        image[1] = 20;
        image[2] = 30;
        let item = CifarItem::new(image, 1).unwrap();
        let chw = item.to_chw();
        assert_eq!(chw[0], 10);
        assert_eq!(chw[WIDTH * HEIGHT], 20);
        assert_eq!(chw[2 * WIDTH * HEIGHT], 30);
    }

    #[test]
    fn rejects_wrong_sizes_and_labels() {
        assert!(matches!(
            CifarItem::new(vec![0; 12], 0),
            Err(DataError::ImageSize { found: 12, .. })
        ));
        assert!(matches!(
            CifarItem::new(vec![0; IMAGE_BYTES], 11),
            Err(DataError::InvalidLabel(11))
        ));
    }

    #[test]
    fn take_truncates() {
        let items = (0..5)
            .map(|label| CifarItem::new(vec![0; IMAGE_BYTES], label).unwrap())
            .collect();
        let dataset = CifarDataset::with_images(items).take(3);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get(2).map(|item| item.label()), Some(2));
        assert!(dataset.get(3).is_none());
    }
}
