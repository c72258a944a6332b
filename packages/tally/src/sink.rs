//! The contract between measuring wrappers and whatever consumes their measurements.

use std::time::Duration;

/// Receives measurements from the wrappers in this crate.
///
/// A sink is called synchronously, on the thread doing the measuring, once per completed
/// measurement with the metric name (if any), the number of items measured and the time it
/// took to produce them. Sinks are trusted to be fast and are not expected to fail; a
/// panicking sink propagates the panic to the code being measured.
///
/// Any `Fn(Option<&str>, u64, Duration)` is a sink:
///
/// ```
/// use std::time::Duration;
///
/// use tally::Instrument;
///
/// let instrument = Instrument::builder()
///     .name("parse_lines")
///     .sink(|name: Option<&str>, count: u64, elapsed: Duration| {
///         println!("{name:?}: {count} in {elapsed:?}");
///     })
///     .build();
///
/// let lines: Vec<_> = instrument.all(["a", "b", "c"]).collect();
/// assert_eq!(lines.len(), 3);
/// ```
///
/// Sinks shared between wrappers on multiple threads are responsible for their own
/// synchronization. The wrappers themselves never lock anything.
pub trait Sink {
    /// Records one measurement.
    ///
    /// `name` is `None` if the instrument that took the measurement was not given a name.
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration);
}

impl<F> Sink for F
where
    F: Fn(Option<&str>, u64, Duration),
{
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        self(name, count, elapsed);
    }
}
