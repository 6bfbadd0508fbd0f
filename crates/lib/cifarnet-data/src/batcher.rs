use burn::data::dataloader::batcher::Batcher;
use burn::prelude::Backend;
use burn::tensor::{Device, ElementConversion, Int, Shape, Tensor, TensorData};

use crate::cifar::{CifarItem, CHANNELS, HEIGHT, WIDTH};

// Per-channel mean and std applied after scaling pixels to [0, 1].
const MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Normalizer for the CIFAR-10 dataset.
#[derive(Clone)]
pub struct Normalizer<B: Backend> {
    pub mean: Tensor<B, 4>,
    pub std: Tensor<B, 4>,
}

impl<B: Backend> Normalizer<B> {
    /// Creates a new normalizer.
    pub fn new(device: &Device<B>) -> Self {
        let mean = Tensor::<B, 1>::from_floats(MEAN, device).reshape([1, 3, 1, 1]);
        let std = Tensor::<B, 1>::from_floats(STD, device).reshape([1, 3, 1, 1]);
        Self { mean, std }
    }

    /// Normalizes images with values in [0, 1] to [-1, 1].
    ///
    /// `input = (input - mean) / std`
    pub fn normalize(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        (input - self.mean.clone()) / self.std.clone()
    }

    /// Maps one normalized CHW image back to displayable bytes.
    pub fn denormalize_pixels(normalized: &[f32]) -> Vec<u8> {
        let plane = WIDTH * HEIGHT;
        normalized
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let channel = (idx / plane).min(CHANNELS - 1);
                let pixel = value * STD[channel] + MEAN[channel];
                (pixel.clamp(0.0, 1.0) * 255.0).round() as u8
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CifarBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone)]
pub struct CifarBatcher<B: Backend> {
    normalizer: Normalizer<B>,
    device: B::Device,
}

impl<B: Backend> CifarBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        let normalizer = Normalizer::new(&device);
        Self { device, normalizer }
    }
}

impl<B: Backend> Batcher<CifarItem, CifarBatch<B>> for CifarBatcher<B> {
    fn batch(&self, items: Vec<CifarItem>) -> CifarBatch<B> {
        let targets = items
            .iter()
            .map(|item| {
                Tensor::<B, 1, Int>::from_data(
                    TensorData::from([(item.label() as i64).elem::<B::IntElem>()]),
                    &self.device,
                )
            })
            .collect();

        let images = items
            .iter()
            .map(|item| TensorData::new(item.image().to_vec(), Shape::new([HEIGHT, WIDTH, CHANNELS])))
            .map(|data| {
                Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), &self.device)
                    // permute(2, 0, 1)
                    .swap_dims(2, 1) // [H, C, W]
                    .swap_dims(1, 0) // [C, H, W]
            })
            .map(|tensor| tensor / 255)
            .collect();

        let images = Tensor::stack(images, 0);
        let targets = Tensor::cat(targets, 0);

        let images = self.normalizer.normalize(images);

        CifarBatch { images, targets }
    }
}
