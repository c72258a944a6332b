//! Statistics reports produced by a [`Registry`](crate::Registry).

use std::collections::BTreeMap;
use std::fmt;
use std::iter;
use std::time::Duration;

use crate::metric_stats::MetricStats;

const HEADERS: [&str; 5] = [
    "Name",
    "Count Mean",
    "Count Stddev",
    "Elapsed Mean",
    "Elapsed Stddev",
];

/// Snapshot of the statistics collected by a [`Registry`](crate::Registry).
///
/// A report is a plain value that can be sent to other threads, merged with other reports
/// and printed. Its `Display` form is a table with one row per metric, sorted by name, with
/// elapsed times in seconds:
///
/// ```text
/// Name       Count Mean  Count Stddev  Elapsed Mean  Elapsed Stddev
/// load_rows       10.00          0.00          1.00            0.00
/// ```
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry, Report};
///
/// let first = Registry::new();
/// let second = Registry::new();
///
/// for registry in [&first, &second] {
///     let instrument = Instrument::builder()
///         .name("parse")
///         .sink(registry.sink())
///         .build();
///     let _words: Vec<_> = instrument.all("a b c".split(' ')).collect();
/// }
///
/// let merged = Report::merge(&first.report(), &second.report());
/// let parse = merged.metric("parse").unwrap();
///
/// assert_eq!(parse.samples(), 2);
/// assert_eq!(parse.total_count(), 6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Report {
    metrics: BTreeMap<String, ReportMetric>,
}

/// Statistics of a single metric in a report.
#[derive(Clone, Debug)]
pub struct ReportMetric {
    name: String,
    stats: MetricStats,
}

impl Report {
    pub(crate) fn from_stats<'a>(
        stats: impl IntoIterator<Item = (&'a String, &'a MetricStats)>,
    ) -> Self {
        let metrics = stats
            .into_iter()
            .map(|(name, stats)| {
                (
                    name.clone(),
                    ReportMetric {
                        name: name.clone(),
                        stats: stats.clone(),
                    },
                )
            })
            .collect();

        Self { metrics }
    }

    /// Merges two reports into a new report.
    ///
    /// Metrics with the same name have their statistics combined as if all measurements had
    /// been recorded through a single registry.
    #[must_use]
    pub fn merge(a: &Self, b: &Self) -> Self {
        let mut merged = a.metrics.clone();

        for (name, b_metric) in &b.metrics {
            merged
                .entry(name.clone())
                .and_modify(|a_metric| a_metric.stats = a_metric.stats.merge(&b_metric.stats))
                .or_insert_with(|| b_metric.clone());
        }

        Self { metrics: merged }
    }

    /// Whether there are no measurements in this report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.values().all(|metric| metric.stats.samples == 0)
    }

    /// The statistics of the metric with the given name, if it has any measurements.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&ReportMetric> {
        self.metrics.get(name)
    }

    /// Returns an iterator over the statistics of every metric, sorted by name.
    pub fn metrics(&self) -> impl Iterator<Item = &ReportMetric> {
        self.metrics.values()
    }

    /// Prints the statistics table to stdout.
    ///
    /// Prints nothing if the report is empty.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }
        print!("{self}");
    }
}

impl ReportMetric {
    /// The metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of measurements recorded.
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.stats.samples
    }

    /// The sum of the item counts of all measurements.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.stats.total_count
    }

    /// The sum of the elapsed times of all measurements.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.stats.total_elapsed
    }

    /// The mean item count per measurement.
    #[must_use]
    pub fn count_mean(&self) -> f64 {
        self.stats.count_mean()
    }

    /// The population standard deviation of the item count per measurement.
    #[must_use]
    pub fn count_stddev(&self) -> f64 {
        self.stats.count_stddev()
    }

    /// The mean elapsed time per measurement.
    #[must_use]
    pub fn elapsed_mean(&self) -> Duration {
        Duration::from_secs_f64(self.stats.elapsed_mean().max(0.0))
    }

    /// The population standard deviation of the elapsed time per measurement.
    #[must_use]
    pub fn elapsed_stddev(&self) -> Duration {
        Duration::from_secs_f64(self.stats.elapsed_stddev())
    }

    fn columns(&self) -> [String; 5] {
        [
            self.name.clone(),
            format!("{:.2}", self.stats.count_mean()),
            format!("{:.2}", self.stats.count_stddev()),
            format!("{:.2}", self.stats.elapsed_mean()),
            format!("{:.2}", self.stats.elapsed_stddev()),
        ]
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No measurements captured.");
        }

        let rows: Vec<[String; 5]> = self.metrics().map(ReportMetric::columns).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let header = HEADERS.map(str::to_owned);
        for row in iter::once(&header).chain(&rows) {
            let mut cells = row.iter().zip(widths);

            // The name column is left-aligned, the numbers right-aligned.
            if let Some((name, width)) = cells.next() {
                write!(f, "{name:<width$}")?;
            }
            for (cell, width) in cells {
                write!(f, "  {cell:>width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
