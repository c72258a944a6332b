//! Measures the total time and item count of draining an iterator.

use std::marker::PhantomData;
use std::time::Duration;

use crate::stopwatch::accumulate;
use crate::{Instrument, Outcome, Plain, Sink};

/// Iterator that measures the total time spent producing all of its items.
///
/// Only the time spent inside the underlying iterator's `next()` is measured; whatever the
/// consumer does between pulls is not. The measurement is reported exactly once, with the
/// number of items produced and the accumulated time:
///
/// * when the underlying iterator is exhausted;
/// * when it produces a failed item (see [`Outcome`]), in which case the failed item is not
///   counted, is handed to the consumer unchanged and the iterator then ends;
/// * when the underlying iterator panics, in which case the time of the failing step is
///   included, the report happens before the panic leaves `next()` and the iterator ends
///   even if the consumer catches the panic and keeps pulling;
/// * when the consumer abandons the iterator, via [`close()`][Self::close] or drop.
///
/// Created by [`Instrument::all()`] and [`Instrument::try_all()`].
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry};
///
/// let registry = Registry::new();
/// let instrument = Instrument::builder()
///     .name("lines")
///     .sink(registry.sink())
///     .build();
///
/// let total: usize = instrument.all(["a", "bb", "ccc"]).map(str::len).sum();
/// assert_eq!(total, 6);
///
/// let report = registry.report();
/// assert_eq!(report.metric("lines").unwrap().total_count(), 3);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct MeasureAll<I, S, K = Plain>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    inner: I,
    instrument: Instrument<S>,

    count: u64,
    elapsed: Duration,
    reported: bool,

    _outcome: PhantomData<fn() -> K>,
}

impl<I, S, K> MeasureAll<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    pub(crate) fn new(inner: I, instrument: Instrument<S>) -> Self {
        Self {
            inner,
            instrument,
            count: 0,
            elapsed: Duration::ZERO,
            reported: false,
            _outcome: PhantomData,
        }
    }

    /// The number of items produced so far.
    #[must_use]
    pub fn count_so_far(&self) -> u64 {
        self.count
    }

    /// The time spent producing items so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the measurement has already been reported to the sink.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        self.reported
    }

    /// Stops measuring, reporting the items produced so far if the measurement has not been
    /// reported yet.
    ///
    /// Dropping the iterator has the same effect. This method exists to make the point of
    /// reporting explicit when the consumer stops pulling before the end.
    pub fn close(mut self) {
        self.report();
    }

    fn report(&mut self) {
        if self.reported {
            return;
        }

        self.reported = true;
        self.instrument.record(self.count, self.elapsed);
    }
}

impl<I, S, K> Iterator for MeasureAll<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reported {
            return None;
        }

        let step = {
            let mut guard = scopeguard::guard_on_unwind(&mut *self, Self::report);
            let this = &mut **guard;

            let inner = &mut this.inner;
            accumulate(this.instrument.platform(), &mut this.elapsed, || inner.next())
        };

        let Some(item) = step else {
            self.report();
            return None;
        };

        if K::is_failure(&item) {
            self.report();
            return Some(item);
        }

        self.count = self
            .count
            .checked_add(1)
            .expect("item count overflows u64 - this indicates an unrealistic scenario");

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.reported {
            (0, Some(0))
        } else {
            self.inner.size_hint()
        }
    }
}

impl<I, S, K> Drop for MeasureAll<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    fn drop(&mut self) {
        self.report();
    }
}

impl<I, S, K> std::fmt::Debug for MeasureAll<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureAll")
            .field("instrument", &self.instrument)
            .field("count", &self.count)
            .field("elapsed", &self.elapsed)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}
