//! Measures how long code takes to produce items and how many it produces.
//!
//! Every measurement is a `(name, count, elapsed)` triple reported to a [`Sink`]: the metric
//! name (if any), the number of items the measured unit produced or consumed, and the time
//! spent producing them.
//!
//! Measurements are configured with an [`Instrument`], which offers:
//!
//! - [`Instrument::all()`] - times draining an iterator, reporting once with the item count
//! - [`Instrument::each()`] - times producing each item of an iterator
//! - [`Instrument::first()`] - times producing the first item of an iterator
//! - [`Instrument::reduce()`] and [`Instrument::reducer()`] - time a function consuming a
//!   sequence, counting the items it actually pulls through a [`Counted`] cursor
//! - [`Instrument::call()`] and [`Instrument::produce()`] - time a function call
//! - [`Instrument::block()`] - times a region of code
//! - [`Instrument::decorator()`] - applies the same measurement to many functions and
//!   methods, deriving metric names from the decorated unit
//!
//! Only time spent producing items is measured. Whatever the consumer does with an item
//! between pulls is not. Failures of the measured unit, whether panics or `Err` values, are
//! reported and then passed on unchanged.
//!
//! Ready-made sinks print ([`print_metric`]), log via `tracing` ([`LogSink`]), write CSV to one
//! file ([`CsvSink`]) or to a file per metric ([`CsvDirSink`]), forward to several sinks ([`FanOut`]) or collect statistics
//! ([`Registry`]). Any `Fn(Option<&str>, u64, Duration)` is also a sink.
//!
//! # Simple usage
//!
//! ```
//! use tally::{Instrument, Registry};
//!
//! let registry = Registry::new();
//! let instrument = Instrument::builder()
//!     .name("read_records")
//!     .sink(registry.sink())
//!     .build();
//!
//! let records = ["alpha", "beta", "gamma"];
//! let lengths: Vec<usize> = instrument.all(records).map(str::len).collect();
//! assert_eq!(lengths, vec![5, 4, 5]);
//!
//! let report = registry.report();
//! assert_eq!(report.metric("read_records").unwrap().total_count(), 3);
//! report.print_to_stdout();
//! ```
//!
//! # Reducing functions
//!
//! ```
//! use std::vec;
//!
//! use tally::{Counted, Instrument, Registry, Sequence};
//!
//! let registry = Registry::new();
//! let instrument = Instrument::builder()
//!     .name("find_large")
//!     .sink(registry.sink())
//!     .build();
//!
//! let find_large = instrument.reducer(Sequence, |items: &mut Counted<vec::IntoIter<u32>>| {
//!     items.find(|n| *n > 100)
//! });
//!
//! assert_eq!(find_large.call(vec![5, 50, 500, 5000]), Some(500));
//!
//! // Only the items pulled before the match are counted.
//! assert_eq!(registry.report().metric("find_large").unwrap().total_count(), 3);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod block_span;
mod counted;
mod decorator;
mod error;
mod instrument;
mod instrument_builder;
mod item_count;
mod measure_all;
mod measure_each;
mod measure_first;
mod metric_name;
mod metric_stats;
mod outcome;
mod pal;
mod reducer;
mod registry;
mod report;
mod sealed;
mod sink;
mod sinks;
mod stopwatch;
pub mod strategies;
#[cfg(test)]
mod testing;

pub use block_span::BlockSpan;
pub use counted::Counted;
pub use decorator::{
    BoundMethod, BoundReducer, Decorated, DecoratedMethod, Decorator, ReducerMethod,
};
pub use error::Error;
pub use instrument::Instrument;
pub use instrument_builder::InstrumentBuilder;
pub use item_count::ItemCount;
pub use measure_all::MeasureAll;
pub use measure_each::MeasureEach;
pub use measure_first::MeasureFirst;
pub use metric_name::{MetricName, UnitName};
pub use outcome::{Fallible, Outcome, Plain};
pub use reducer::{CallingConvention, Convention, Reducer, Sequence, Variadic};
pub use registry::{Registry, RegistrySink};
pub use report::{Report, ReportMetric};
pub(crate) use sealed::Sealed;
pub use sink::Sink;
pub use sinks::{
    CsvDirSink, CsvSink, DefaultSink, FanOut, LogSink, LogSinkBuilder, print_metric,
    reset_default_sink, set_default_sink,
};
pub use strategies::Strategy;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
