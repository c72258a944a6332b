use std::time::Duration;

use tracing::{Level, debug, error, info, trace, warn};

/// Sink that emits each measurement as a `tracing` event.
///
/// Events use the `tally` target and carry the fields `metric`, `count` and `elapsed_secs`.
/// Unnamed measurements are logged with `metric = "tally"`. The message reads like
/// `3 items in 0.25 seconds`.
///
/// Events are emitted at the `INFO` level unless configured otherwise via
/// [`LogSink::builder()`].
///
/// # Examples
///
/// ```
/// use tally::{Instrument, LogSink};
/// use tracing::Level;
///
/// let sink = LogSink::builder().level(Level::DEBUG).build();
/// let instrument = Instrument::builder().name("handshake").sink(sink).build();
///
/// instrument.call(|| ());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    level: Level,
}

impl LogSink {
    /// Creates a builder for a log sink.
    #[must_use]
    pub fn builder() -> LogSinkBuilder {
        LogSinkBuilder { level: Level::INFO }
    }

    /// The level events are emitted at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl crate::Sink for LogSink {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        let metric = name.unwrap_or("tally");
        let elapsed_secs = elapsed.as_secs_f64();

        // Event levels must be known at the callsite.
        match self.level {
            Level::TRACE => trace!(
                target: "tally",
                metric,
                count,
                elapsed_secs,
                "{count} items in {elapsed_secs:.2} seconds"
            ),
            Level::DEBUG => debug!(
                target: "tally",
                metric,
                count,
                elapsed_secs,
                "{count} items in {elapsed_secs:.2} seconds"
            ),
            Level::INFO => info!(
                target: "tally",
                metric,
                count,
                elapsed_secs,
                "{count} items in {elapsed_secs:.2} seconds"
            ),
            Level::WARN => warn!(
                target: "tally",
                metric,
                count,
                elapsed_secs,
                "{count} items in {elapsed_secs:.2} seconds"
            ),
            _ => error!(
                target: "tally",
                metric,
                count,
                elapsed_secs,
                "{count} items in {elapsed_secs:.2} seconds"
            ),
        }
    }
}

/// Creates instances of [`LogSink`].
///
/// Use `LogSink::builder()` to create a new instance of this builder.
#[derive(Debug)]
pub struct LogSinkBuilder {
    level: Level,
}

impl LogSinkBuilder {
    /// Sets the level events are emitted at. Defaults to `INFO`.
    #[must_use]
    pub fn level(self, level: Level) -> Self {
        Self { level }
    }

    /// Creates the sink.
    #[must_use]
    pub fn build(self) -> LogSink {
        LogSink { level: self.level }
    }
}
