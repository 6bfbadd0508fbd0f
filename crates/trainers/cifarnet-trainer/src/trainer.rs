use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::module::{AutodiffModule, Module};
use burn::optim::Optimizer;
use burn::prelude::Backend;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Int, Tensor};
use burn::train::{TrainStep, ValidStep};
use log::{debug, info};
use typed_builder::TypedBuilder;

use cifarnet_data::cifar::{CHANNELS, HEIGHT, IMAGE_BYTES, WIDTH};
use cifarnet_data::{image_grid, CifarBatch, CifarBatcher, CifarClass, CifarDataset, Normalizer};
use cifarnet_models::cnn::predictions;
use cifarnet_models::{CifarCnn, CifarTrainingConfig};
use cifarnet_output::result::Results;
use cifarnet_output::tables::epoch::EpochRecord;

const IMAGE_DIMS: [usize; 3] = [CHANNELS, HEIGHT, WIDTH];
const GRID_ROW: usize = 8;
const GRID_PADDING: usize = 2;
const HISTOGRAM_BUCKETS: usize = 10;

type TrainLoader<B> = Arc<dyn DataLoader<CifarBatch<B>>>;
type TestLoader<B> = Arc<dyn DataLoader<CifarBatch<<B as AutodiffBackend>::InnerBackend>>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrainSummary {
    pub last_loss: f64,
    pub average_loss: f64,
    pub batches: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TestSummary {
    pub average_loss: f64,
    pub correct: u64,
    pub total: u64,
    pub accuracy: f64,
}

pub struct TrainingReport<B: AutodiffBackend> {
    pub model: CifarCnn<B>,
    pub epochs: Vec<EpochRecord>,
    pub run_dir: PathBuf,
}

/// Runs the epoch loop and feeds every metric into the run's result sinks.
#[derive(TypedBuilder)]
pub struct Trainer<B: AutodiffBackend> {
    config: CifarTrainingConfig,
    device: B::Device,
    train_data: CifarDataset,
    test_data: CifarDataset,
    results: Results,
    checkpoint_dir: Option<PathBuf>,
    misclassified_batches: usize,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn fit(mut self) -> anyhow::Result<TrainingReport<B>> {
        B::seed(self.config.seed);
        let mut model = self.config.model.init::<B>(&self.device);
        let mut optim = self.config.optimizer.init::<B, CifarCnn<B>>();
        info!("Model has {} parameters", model.num_params());

        let train_loader = self.train_loader();
        let test_loader = self.test_loader();
        debug!(
            "Training on {} images, testing on {} images",
            train_loader.num_items(),
            test_loader.num_items()
        );
        self.record_input_grid(&train_loader)?;

        let mut epochs = Vec::with_capacity(self.config.num_epochs);
        for epoch in 0..self.config.num_epochs {
            let started = Instant::now();
            let (trained, train) = self.train(model, &mut optim, &train_loader, epoch)?;
            model = trained;
            let test = self.test(&model, &test_loader, epoch)?;

            let record = EpochRecord::builder()
                .epoch(epoch as u32)
                .train_loss(train.last_loss)
                .train_average_loss(train.average_loss)
                .test_loss(test.average_loss)
                .correct(test.correct)
                .total(test.total)
                .accuracy(test.accuracy)
                .first_layer_mean_weight(model.first_layer_mean_weight())
                .duration_secs(started.elapsed().as_secs_f64())
                .build();
            self.results.add_epoch(record)?;
            epochs.push(record);

            self.save_checkpoint(&model, epoch)?;
            self.results.flush()?;
        }

        let run_dir = self.results.run_dir.clone();
        self.results.close_files()?;
        info!("Training finished, results are in {}", run_dir.display());
        Ok(TrainingReport {
            model,
            epochs,
            run_dir,
        })
    }

    pub fn train<O>(
        &mut self,
        mut model: CifarCnn<B>,
        optim: &mut O,
        loader: &TrainLoader<B>,
        epoch: usize,
    ) -> anyhow::Result<(CifarCnn<B>, TrainSummary)>
    where
        O: Optimizer<CifarCnn<B>, B>,
    {
        let total_items = loader.num_items();
        let total_batches = total_items.div_ceil(self.config.batch_size.max(1)).max(1);
        let mut summary = TrainSummary::default();
        let mut loss_sum = 0.0;

        for (batch_id, batch) in loader.iter().enumerate() {
            let batch_len = batch.targets.dims()[0];
            let output = TrainStep::step(&model, batch);
            let loss = output.item.loss.clone().into_scalar().elem::<f64>();
            model = optim.step(self.config.learning_rate, model, output.grads);

            loss_sum += loss;
            summary.last_loss = loss;
            summary.batches += 1;
            if batch_id % self.config.log_interval == 0 {
                info!(
                    "Train Epoch: {} [{}/{} ({:.0}%)]\tLoss: {:.6}",
                    epoch,
                    batch_id * batch_len,
                    total_items,
                    100.0 * batch_id as f64 / total_batches as f64,
                    loss
                );
            }
        }
        if summary.batches > 0 {
            summary.average_loss = loss_sum / summary.batches as f64;
        }

        let writer = &mut self.results.summary;
        writer.add_scalar("Train/Loss", summary.last_loss as f32, epoch)?;
        writer.add_scalar("Train/AverageLoss", summary.average_loss as f32, epoch)?;
        writer.add_scalar(
            "Train/FirstLayerAverageWeight",
            model.first_layer_mean_weight(),
            epoch,
        )?;
        let last_layer = model
            .last_layer_weights()
            .map_err(|e| anyhow!("unreadable last layer weights: {e:?}"))?;
        writer.add_histogram(
            "Train/LastLayerWeightsHistogram",
            &last_layer,
            HISTOGRAM_BUCKETS,
            epoch,
        )?;
        Ok((model, summary))
    }

    pub fn test(
        &mut self,
        model: &CifarCnn<B>,
        loader: &TestLoader<B>,
        epoch: usize,
    ) -> anyhow::Result<TestSummary> {
        let model = model.valid();
        let mut summary = TestSummary::default();
        let mut loss_sum = 0.0;
        let mut batches = 0usize;

        for (batch_id, batch) in loader.iter().enumerate() {
            let images = (batch_id < self.misclassified_batches).then(|| batch.images.clone());
            let output = ValidStep::step(&model, batch);
            loss_sum += output.loss.into_scalar().elem::<f64>();
            batches += 1;

            let predicted = predictions(output.output);
            let targets = output.targets;
            summary.total += targets.dims()[0] as u64;
            summary.correct += predicted
                .clone()
                .equal(targets.clone())
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>() as u64;

            if let Some(images) = images {
                self.record_misclassified(images, predicted, targets, epoch, batch_id)?;
            }
        }
        if batches > 0 {
            summary.average_loss = loss_sum / batches as f64;
        }
        if summary.total > 0 {
            summary.accuracy = 100.0 * summary.correct as f64 / summary.total as f64;
        }

        info!(
            "Test set: Average loss: {:.4}, Accuracy: {}/{} ({:.0}%)",
            summary.average_loss, summary.correct, summary.total, summary.accuracy
        );
        let writer = &mut self.results.summary;
        writer.add_scalar("Test/Loss", summary.average_loss as f32, epoch)?;
        writer.add_scalar("Test/Accuracy", summary.accuracy as f32, epoch)?;
        Ok(summary)
    }

    fn train_loader(&self) -> TrainLoader<B> {
        let batcher = CifarBatcher::<B>::new(self.device.clone());
        let mut builder = DataLoaderBuilder::new(batcher)
            .batch_size(self.config.batch_size)
            .shuffle(self.config.seed);
        if self.config.num_workers > 0 {
            builder = builder.num_workers(self.config.num_workers);
        }
        builder.build(self.train_data.clone())
    }

    fn test_loader(&self) -> TestLoader<B> {
        let batcher = CifarBatcher::<B::InnerBackend>::new(self.device.clone());
        let mut builder = DataLoaderBuilder::new(batcher).batch_size(self.config.batch_size);
        if self.config.num_workers > 0 {
            builder = builder.num_workers(self.config.num_workers);
        }
        builder.build(self.test_data.clone())
    }

    fn record_input_grid(&mut self, loader: &TrainLoader<B>) -> anyhow::Result<()> {
        let Some(batch) = loader.iter().next() else {
            return Ok(());
        };
        let images = denormalized_images(batch.images)?;
        let grid = image_grid(&images, GRID_ROW, GRID_PADDING)?;
        self.results
            .summary
            .add_image("Dataset/Inspect input grid", &grid.data, grid.dims, 0)?;
        Ok(())
    }

    fn record_misclassified(
        &mut self,
        images: Tensor<B::InnerBackend, 4>,
        predicted: Tensor<B::InnerBackend, 1, Int>,
        targets: Tensor<B::InnerBackend, 1, Int>,
        epoch: usize,
        batch_id: usize,
    ) -> anyhow::Result<()> {
        let predicted = int_values(predicted)?;
        let targets = int_values(targets)?;
        if predicted == targets {
            return Ok(());
        }
        let images = denormalized_images(images)?;

        for (idx, ((pred, label), image)) in predicted.iter().zip(&targets).zip(&images).enumerate() {
            if pred == label {
                continue;
            }
            let tag = format!(
                "Test-misclassified/Prediction-{}/Label-{}_Epoch-{}_{}_{}",
                class_name(*pred),
                class_name(*label),
                epoch,
                batch_id,
                idx
            );
            self.results.summary.add_image(&tag, image, IMAGE_DIMS, epoch)?;
        }
        Ok(())
    }

    fn save_checkpoint(&self, model: &CifarCnn<B>, epoch: usize) -> anyhow::Result<()> {
        let Some(checkpoint_dir) = &self.checkpoint_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(checkpoint_dir).with_context(|| {
            format!("failed to create checkpoint directory {}", checkpoint_dir.display())
        })?;
        let path = checkpoint_dir.join(format!("epoch_{epoch}"));
        model
            .save_checkpoint(&path)
            .map_err(|e| anyhow!("failed to save checkpoint {}: {e:?}", path.display()))?;
        debug!("Saved checkpoint {}", path.display());
        Ok(())
    }
}

/// Splits a normalized image batch into displayable CHW byte images.
fn denormalized_images<B: Backend>(images: Tensor<B, 4>) -> anyhow::Result<Vec<Vec<u8>>> {
    let pixels = images
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("unreadable image tensor: {e:?}"))?;
    Ok(pixels
        .chunks_exact(IMAGE_BYTES)
        .map(Normalizer::<B>::denormalize_pixels)
        .collect())
}

fn int_values<B: Backend>(tensor: Tensor<B, 1, Int>) -> anyhow::Result<Vec<i64>> {
    tensor
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow!("unreadable label tensor: {e:?}"))
}

fn class_name(label: i64) -> String {
    u8::try_from(label)
        .ok()
        .and_then(|label| CifarClass::try_from(label).ok())
        .map(|class| class.name().to_string())
        .unwrap_or_else(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_fall_back_to_the_index() {
        assert_eq!(class_name(0), "plane");
        assert_eq!(class_name(9), "truck");
        assert_eq!(class_name(12), "12");
        assert_eq!(class_name(-1), "-1");
    }
}
