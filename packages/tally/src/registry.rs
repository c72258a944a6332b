use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::metric_stats::MetricStats;
use crate::{ERR_POISONED_LOCK, Error, Report, Sink};

/// Collects statistics of measurements by metric name.
///
/// Measurements reach the registry through the [`RegistrySink`] handles returned by
/// [`sink()`][Self::sink], or directly via [`record()`][Self::record]. The statistics can be
/// inspected at any time as a [`Report`].
///
/// Unnamed measurements cannot be attributed to a metric and are dropped with a warning.
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry};
///
/// let registry = Registry::new();
/// let instrument = Instrument::builder()
///     .name("tokenize")
///     .sink(registry.sink())
///     .build();
///
/// for line in ["let x = 1;", "x + 2"] {
///     let _tokens: Vec<_> = instrument.all(line.split_whitespace()).collect();
/// }
///
/// let report = registry.close().unwrap();
/// let tokenize = report.metric("tokenize").unwrap();
/// assert_eq!(tokenize.samples(), 2);
/// assert_eq!(tokenize.total_count(), 7);
///
/// // Prints nothing if no measurements were captured.
/// report.print_to_stdout();
/// ```
#[derive(Debug)]
pub struct Registry {
    state: Arc<Mutex<RegistryState>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    metrics: HashMap<String, MetricStats>,
    closed: bool,
}

impl RegistryState {
    fn record(&mut self, name: Option<&str>, count: u64, elapsed: Duration) {
        let Some(name) = name else {
            tracing::warn!(count, "dropping unnamed metric: registry entries require a name");
            return;
        };

        if self.closed {
            tracing::warn!(
                metric = name,
                "dropping metric recorded after the registry was closed"
            );
            return;
        }

        if let Some(stats) = self.metrics.get_mut(name) {
            stats.add(count, elapsed);
        } else {
            let mut stats = MetricStats::default();
            stats.add(count, elapsed);
            self.metrics.insert(name.to_owned(), stats);
        }
    }

    fn take_report(&mut self) -> Report {
        let report = Report::from_stats(&self.metrics);
        self.metrics.clear();
        report
    }
}

impl Registry {
    /// Creates an empty registry.
    #[expect(
        clippy::new_without_default,
        reason = "to avoid ambiguity with the process-wide default sink, which is not a registry"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Returns a sink that records into this registry.
    ///
    /// Any number of sinks can be handed out. They remain valid after the registry is
    /// dropped but their measurements are then no longer observable.
    #[must_use]
    pub fn sink(&self) -> RegistrySink {
        RegistrySink {
            state: Arc::clone(&self.state),
        }
    }

    /// Records one measurement under `name`.
    pub fn record(&self, name: &str, count: u64, elapsed: Duration) {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .record(Some(name), count, elapsed);
    }

    /// Creates a report of the statistics collected so far.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::from_stats(&self.state.lock().expect(ERR_POISONED_LOCK).metrics)
    }

    /// Creates a report of the statistics collected so far and starts over.
    pub fn flush(&self) -> Report {
        let report = self.state.lock().expect(ERR_POISONED_LOCK).take_report();

        tracing::debug!(metrics = report.metrics().count(), "flushed registry");

        report
    }

    /// Creates the final report. Measurements recorded afterwards are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the registry has already been closed.
    pub fn close(&self) -> Result<Report> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if state.closed {
            return Err(Error::Closed);
        }

        state.closed = true;
        let report = state.take_report();

        tracing::debug!(metrics = report.metrics().count(), "closed registry");

        Ok(report)
    }

    /// Whether the registry has no measurements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().expect(ERR_POISONED_LOCK).metrics.is_empty()
    }
}

/// Sink that records measurements into a [`Registry`].
///
/// Created by [`Registry::sink()`].
#[derive(Clone)]
pub struct RegistrySink {
    state: Arc<Mutex<RegistryState>>,
}

impl Sink for RegistrySink {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .record(name, count, elapsed);
    }
}

impl fmt::Debug for RegistrySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySink").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use super::*;

    static_assertions::assert_impl_all!(Registry: Send, Sync);
    static_assertions::assert_impl_all!(RegistrySink: Send, Sync, Clone);

    #[test]
    fn new_registry_is_empty() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        assert!(registry.report().is_empty());
    }

    #[test]
    fn sink_records_by_name() {
        let registry = Registry::new();
        let sink = registry.sink();

        sink.record(Some("read"), 4, Duration::from_secs(1));
        sink.record(Some("read"), 6, Duration::from_secs(3));
        registry.record("write", 1, Duration::ZERO);

        let report = registry.report();
        let read = report.metric("read").expect("metric was recorded");

        assert_eq!(read.samples(), 2);
        assert_eq!(read.total_count(), 10);
        assert!((read.count_mean() - 5.0).abs() < 1e-9);
        assert_eq!(read.elapsed_mean(), Duration::from_secs(2));
        assert_eq!(report.metric("write").map(|m| m.samples()), Some(1));
    }

    #[test]
    fn unnamed_records_dropped() {
        let registry = Registry::new();

        registry.sink().record(None, 3, Duration::from_secs(1));

        assert!(registry.is_empty());
    }

    #[test]
    fn flush_starts_over() {
        let registry = Registry::new();
        registry.record("batch", 2, Duration::ZERO);

        let flushed = registry.flush();
        registry.record("batch", 5, Duration::ZERO);

        assert_eq!(flushed.metric("batch").map(|m| m.total_count()), Some(2));
        assert_eq!(
            registry.report().metric("batch").map(|m| m.total_count()),
            Some(5)
        );
    }

    #[test]
    fn records_after_close_dropped() {
        let registry = Registry::new();
        let sink = registry.sink();
        sink.record(Some("early"), 1, Duration::ZERO);

        let report = registry.close().expect("first close");
        sink.record(Some("late"), 1, Duration::ZERO);

        assert!(report.metric("early").is_some());
        assert!(registry.is_empty());
        assert!(matches!(registry.close(), Err(Error::Closed)));
    }

    #[test]
    fn sinks_usable_from_many_threads() {
        let registry = Registry::new();

        thread::scope(|scope| {
            for _ in 0..4 {
                let sink = registry.sink();
                scope.spawn(move || {
                    for _ in 0..25 {
                        sink.record(Some("shared"), 2, Duration::from_millis(1));
                    }
                });
            }
        });

        let report = registry.report();
        let shared = report.metric("shared").expect("metric was recorded");
        assert_eq!(shared.samples(), 100);
        assert_eq!(shared.total_count(), 200);
    }
}
