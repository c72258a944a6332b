use std::sync::{Arc, LazyLock};
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::{Sink, print_metric};

type SharedSink = Box<dyn Sink + Send + Sync>;

static DEFAULT_SINK: LazyLock<ArcSwap<SharedSink>> = LazyLock::new(|| {
    let sink: SharedSink = Box::new(print_metric);
    ArcSwap::from_pointee(sink)
});

/// Sink that forwards each measurement to the process-wide default sink.
///
/// The default sink is [`print_metric`] until replaced with [`set_default_sink()`]. The
/// lookup happens on every measurement, so replacing the default sink affects instruments
/// that already exist.
///
/// Instruments built without an explicit sink use this sink.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct DefaultSink;

impl Sink for DefaultSink {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        DEFAULT_SINK.load().record(name, count, elapsed);
    }
}

/// Replaces the process-wide default sink.
///
/// # Examples
///
/// ```
/// use tally::{Instrument, LogSink, reset_default_sink, set_default_sink};
///
/// set_default_sink(LogSink::default());
///
/// let instrument = Instrument::builder().name("startup").build();
/// instrument.call(|| ());
///
/// reset_default_sink();
/// ```
pub fn set_default_sink(sink: impl Sink + Send + Sync + 'static) {
    let sink: SharedSink = Box::new(sink);
    DEFAULT_SINK.store(Arc::new(sink));
}

/// Restores [`print_metric`] as the process-wide default sink.
pub fn reset_default_sink() {
    set_default_sink(print_metric);
}
