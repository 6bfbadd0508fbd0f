//! Writer for TensorBoard event files.

pub mod event_writer;
pub mod proto;
pub mod record;
pub mod summary;
pub mod summary_writer;

pub use summary_writer::SummaryWriter;
