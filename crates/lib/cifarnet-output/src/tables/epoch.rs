use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Float64Array, RecordBatch, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use typed_builder::TypedBuilder;

use crate::error::OutputError;
use crate::tables::ResultWriter;
use crate::writer::WriterType;

/// Summary of one train + test pass.
#[derive(Debug, Copy, Clone, TypedBuilder)]
pub struct EpochRecord {
    pub epoch: u32,
    pub train_loss: f64,
    pub train_average_loss: f64,
    pub test_loss: f64,
    pub correct: u64,
    pub total: u64,
    pub accuracy: f64,
    pub first_layer_mean_weight: f32,
    pub duration_secs: f64,
}

#[derive(Debug)]
pub struct EpochTrace {
    epoch: Vec<u32>,
    train_loss: Vec<f64>,
    train_average_loss: Vec<f64>,
    test_loss: Vec<f64>,
    correct: Vec<u64>,
    total: Vec<u64>,
    accuracy: Vec<f64>,
    first_layer_mean_weight: Vec<f32>,
    duration_secs: Vec<f64>,
    to_output: WriterType,
}

impl EpochTrace {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            epoch: Vec::new(),
            train_loss: Vec::new(),
            train_average_loss: Vec::new(),
            test_loss: Vec::new(),
            correct: Vec::new(),
            total: Vec::new(),
            accuracy: Vec::new(),
            first_layer_mean_weight: Vec::new(),
            duration_secs: Vec::new(),
        })
    }

    pub fn add_data(&mut self, record: EpochRecord) {
        self.epoch.push(record.epoch);
        self.train_loss.push(record.train_loss);
        self.train_average_loss.push(record.train_average_loss);
        self.test_loss.push(record.test_loss);
        self.correct.push(record.correct);
        self.total.push(record.total);
        self.accuracy.push(record.accuracy);
        self.first_layer_mean_weight
            .push(record.first_layer_mean_weight);
        self.duration_secs.push(record.duration_secs);
    }
}

impl ResultWriter for EpochTrace {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("epoch", DataType::UInt32, false),
            Field::new("train_loss", DataType::Float64, false),
            Field::new("train_average_loss", DataType::Float64, false),
            Field::new("test_loss", DataType::Float64, false),
            Field::new("correct", DataType::UInt64, false),
            Field::new("total", DataType::UInt64, false),
            Field::new("accuracy", DataType::Float64, false),
            Field::new("first_layer_mean_weight", DataType::Float32, false),
            Field::new("duration_secs", DataType::Float64, false),
        ])
    }

    fn write_to_file(&mut self) -> Result<(), OutputError> {
        if self.epoch.is_empty() {
            return Ok(());
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(std::mem::take(&mut self.epoch))),
            Arc::new(Float64Array::from(std::mem::take(&mut self.train_loss))),
            Arc::new(Float64Array::from(std::mem::take(&mut self.train_average_loss))),
            Arc::new(Float64Array::from(std::mem::take(&mut self.test_loss))),
            Arc::new(UInt64Array::from(std::mem::take(&mut self.correct))),
            Arc::new(UInt64Array::from(std::mem::take(&mut self.total))),
            Arc::new(Float64Array::from(std::mem::take(&mut self.accuracy))),
            Arc::new(Float32Array::from(std::mem::take(
                &mut self.first_layer_mean_weight,
            ))),
            Arc::new(Float64Array::from(std::mem::take(&mut self.duration_secs))),
        ];
        let record_batch = RecordBatch::try_new(Arc::new(Self::schema()), columns)?;
        self.to_output.record_batch_to_file(&record_batch)
    }

    fn close_file(mut self) -> Result<(), OutputError> {
        self.write_to_file()?;
        self.to_output.close()
    }
}
