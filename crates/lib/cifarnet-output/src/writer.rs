use std::fs::File;
use std::path::Path;

use arrow::csv::Writer;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::OutputError;

#[derive(Debug)]
pub enum WriterType {
    Parquet(WriterParquet),
    Csv(WriterCsv),
}

impl WriterType {
    pub fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        if file_name.exists() {
            std::fs::remove_file(file_name).map_err(|e| OutputError::io(file_name, e))?;
        }
        match file_name.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => Ok(WriterType::Parquet(WriterParquet::new(file_name, schema)?)),
            Some("csv") => Ok(WriterType::Csv(WriterCsv::new(file_name)?)),
            _ => Err(OutputError::Extension(file_name.to_path_buf())),
        }
    }

    pub fn record_batch_to_file(&mut self, record_batch: &RecordBatch) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(parquet) => {
                parquet.writer.write(record_batch)?;
                parquet.writer.flush()?;
            }
            WriterType::Csv(csv) => csv.writer.write(record_batch)?,
        }
        Ok(())
    }

    pub fn close(self) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(parquet) => parquet.close(),
            WriterType::Csv(csv) => csv.close(),
        }
    }
}

#[derive(Debug)]
pub struct WriterParquet {
    pub writer: ArrowWriter<File>,
}

impl WriterParquet {
    fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let output_file = File::create(file_name).map_err(|e| OutputError::io(file_name, e))?;
        let writer = ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props))?;
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct WriterCsv {
    pub writer: Writer<File>,
}

impl WriterCsv {
    fn new(file_name: &Path) -> Result<Self, OutputError> {
        let output_file = File::create(file_name).map_err(|e| OutputError::io(file_name, e))?;
        Ok(Self {
            writer: Writer::new(output_file),
        })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}
