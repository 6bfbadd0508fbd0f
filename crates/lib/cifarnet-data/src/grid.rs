use crate::cifar::{CHANNELS, HEIGHT, IMAGE_BYTES, WIDTH};
use crate::error::DataError;

/// A CHW byte image assembled from several CIFAR images.
#[derive(Clone, Debug)]
pub struct GridImage {
    pub data: Vec<u8>,
    pub dims: [usize; 3],
}

/// Tiles CHW images row by row, `nrow` per row, separated by `padding` zero pixels.
pub fn image_grid(images: &[Vec<u8>], nrow: usize, padding: usize) -> Result<GridImage, DataError> {
    if images.is_empty() {
        return Err(DataError::EmptyGrid);
    }
    if let Some(bad) = images.iter().find(|image| image.len() != IMAGE_BYTES) {
        return Err(DataError::ImageSize {
            expected: IMAGE_BYTES,
            found: bad.len(),
        });
    }

    let columns = nrow.max(1).min(images.len());
    let rows = images.len().div_ceil(columns);
    let cell_height = HEIGHT + padding;
    let cell_width = WIDTH + padding;
    let grid_height = rows * cell_height + padding;
    let grid_width = columns * cell_width + padding;

    let mut data = vec![0u8; CHANNELS * grid_height * grid_width];
    for (idx, image) in images.iter().enumerate() {
        let top = (idx / columns) * cell_height + padding;
        let left = (idx % columns) * cell_width + padding;
        for channel in 0..CHANNELS {
            for y in 0..HEIGHT {
                let src = channel * HEIGHT * WIDTH + y * WIDTH;
                let dst = channel * grid_height * grid_width + (top + y) * grid_width + left;
                data[dst..dst + WIDTH].copy_from_slice(&image[src..src + WIDTH]);
            }
        }
    }

    Ok(GridImage {
        data,
        dims: [CHANNELS, grid_height, grid_width],
    })
}
