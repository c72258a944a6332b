//! Ready-made sinks for common destinations.

mod csv;
mod csv_dir;
mod default;
mod fan_out;
mod log;
mod print;

pub use csv::CsvSink;
pub use csv_dir::CsvDirSink;
pub use default::{DefaultSink, reset_default_sink, set_default_sink};
pub use fan_out::FanOut;
pub use log::{LogSink, LogSinkBuilder};
pub use print::print_metric;
