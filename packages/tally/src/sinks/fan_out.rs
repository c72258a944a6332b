use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::Sink;

/// Sink that forwards every measurement to several sinks, in the order they were added.
///
/// Clones share the same set of sinks.
///
/// # Examples
///
/// ```
/// use tally::{FanOut, Instrument, LogSink, Registry};
///
/// let registry = Registry::new();
/// let sink = FanOut::new().with(LogSink::default()).with(registry.sink());
///
/// let instrument = Instrument::builder().name("resolve").sink(sink).build();
/// instrument.call(|| "127.0.0.1");
///
/// assert_eq!(registry.report().metric("resolve").unwrap().samples(), 1);
/// ```
#[derive(Clone, Default)]
pub struct FanOut {
    sinks: Vec<Arc<dyn Sink + Send + Sync>>,
}

impl FanOut {
    /// Creates a fan-out sink with no sinks to forward to.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink to the end of the forwarding order.
    #[must_use]
    pub fn with(mut self, sink: impl Sink + Send + Sync + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// The number of sinks measurements are forwarded to.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no sinks to forward to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for FanOut {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        for sink in &self.sinks {
            sink.record(name, count, elapsed);
        }
    }
}

impl fmt::Debug for FanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOut")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testing::Recorder;

    static_assertions::assert_impl_all!(FanOut: Send, Sync, Clone);

    #[test]
    fn empty_fan_out_accepts_records() {
        let fan_out = FanOut::new();

        fan_out.record(Some("nowhere"), 1, Duration::ZERO);

        assert!(fan_out.is_empty());
    }

    #[test]
    fn forwards_identical_arguments_to_all() {
        let first = Recorder::new();
        let second = Recorder::new();
        let fan_out = FanOut::new().with(first.clone()).with(second.clone());

        fan_out.record(Some("copied"), 6, Duration::from_millis(40));
        fan_out.record(None, 1, Duration::ZERO);

        assert_eq!(fan_out.len(), 2);
        assert_eq!(first.records(), second.records());
        assert_eq!(first.records().len(), 2);
    }

    #[test]
    fn forwards_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let sink = |label: &'static str| {
            let order = Arc::clone(&order);
            move |_name: Option<&str>, _count: u64, _elapsed: Duration| {
                order.lock().expect("test lock").push(label);
            }
        };

        let fan_out = FanOut::new()
            .with(sink("first"))
            .with(sink("second"))
            .with(sink("third"));
        fan_out.record(Some("ordered"), 1, Duration::ZERO);

        assert_eq!(
            *order.lock().expect("test lock"),
            vec!["first", "second", "third"]
        );
    }
}
