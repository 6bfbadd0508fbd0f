use std::path::Path;

use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{
    BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
    Relu,
};
use burn::prelude::Backend;
use burn::record::{CompactRecorder, RecorderError};
use burn::tensor::activation::softmax;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{DataError, ElementConversion, Int, Tensor};
use burn::train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep};

use cifarnet_data::CifarBatch;

// 64 channels of 4x4 after the third pooling stage.
const FLAT_DIM: usize = 64 * 4 * 4;

#[derive(Config, Debug)]
pub struct CifarCnnConfig {
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 500)]
    pub hidden_size: usize,
    #[config(default = "0.25")]
    pub drop_out: f64,
}

impl CifarCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CifarCnn<B> {
        let conv1 = Conv2dConfig::new([3, 16], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv2 = Conv2dConfig::new([16, 32], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv3 = Conv2dConfig::new([32, 64], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
        let norm = BatchNormConfig::new(FLAT_DIM).init(device);

        let fc1 = LinearConfig::new(FLAT_DIM, self.hidden_size).init(device);
        let fc2 = LinearConfig::new(self.hidden_size, self.num_classes).init(device);

        CifarCnn {
            activation: Relu::new(),
            dropout: DropoutConfig::new(self.drop_out).init(),
            pool,
            conv1,
            conv2,
            conv3,
            norm,
            fc1,
            fc2,
        }
    }
}

/// Three conv/pool stages followed by a batch-normalized two layer classifier.
#[derive(Module, Debug)]
pub struct CifarCnn<B: Backend> {
    activation: Relu,
    dropout: Dropout,
    pool: MaxPool2d,
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    norm: BatchNorm<B, 1>,
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl<B: Backend> CifarCnn<B> {
    /// `[batch, 3, 32, 32]` images to `[batch, num_classes]` logits.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(images);
        let x = self.pool.forward(self.activation.forward(x)); // [batch, 16, 16, 16]
        let x = self.conv2.forward(x);
        let x = self.pool.forward(self.activation.forward(x)); // [batch, 32, 8, 8]
        let x = self.conv3.forward(x);
        let x = self.pool.forward(self.activation.forward(x)); // [batch, 64, 4, 4]

        let [batch_size, channels, height, width] = x.dims();
        let features = channels * height * width;
        let x = x.reshape([batch_size, features, 1]);
        let x = self.norm.forward(x).reshape([batch_size, features]);

        let x = self.dropout.forward(x);
        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);
        let x = self.dropout.forward(x);

        self.fc2.forward(x)
    }

    pub fn forward_probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    pub fn forward_classification(
        &self,
        images: Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }

    pub fn first_layer_mean_weight(&self) -> f32 {
        self.conv1.weight.val().mean().into_scalar().elem::<f32>()
    }

    pub fn last_layer_weights(&self) -> Result<Vec<f64>, DataError> {
        self.fc2
            .weight
            .val()
            .into_data()
            .convert::<f64>()
            .to_vec::<f64>()
    }

    pub fn save_checkpoint(&self, path: &Path) -> Result<(), RecorderError> {
        self.clone().save_file(path, &CompactRecorder::new())
    }

    pub fn load_checkpoint(
        config: &CifarCnnConfig,
        path: &Path,
        device: &B::Device,
    ) -> Result<Self, RecorderError> {
        config
            .init(device)
            .load_file(path, &CompactRecorder::new(), device)
    }
}

/// Class index with the highest score for every row of `output`.
pub fn predictions<B: Backend>(output: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    output.argmax(1).flatten::<1>(0, 1)
}

impl<B: AutodiffBackend> TrainStep<CifarBatch<B>, ClassificationOutput<B>> for CifarCnn<B> {
    fn step(&self, batch: CifarBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(batch.images, batch.targets);
        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<CifarBatch<B>, ClassificationOutput<B>> for CifarCnn<B> {
    fn step(&self, batch: CifarBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(batch.images, batch.targets)
    }
}
