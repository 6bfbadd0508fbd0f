pub mod epoch;

use arrow::datatypes::Schema;

use crate::error::OutputError;

pub trait ResultWriter {
    fn schema() -> Schema;
    fn write_to_file(&mut self) -> Result<(), OutputError>;
    fn close_file(self) -> Result<(), OutputError>;
}
