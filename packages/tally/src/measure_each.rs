//! Measures the time taken to produce each item of an iterator.

use crate::stopwatch::Stopwatch;
use crate::{Instrument, Sink};

/// Iterator that reports a separate measurement for every item it produces.
///
/// For each item, the sink receives a count of 1 and the time the underlying `next()` took,
/// before the item is handed to the consumer. Reaching the end of the underlying iterator is
/// not an item and is not reported. If the underlying `next()` panics, the failing step is
/// reported and the panic continues unchanged.
///
/// `Err` items of an iterator over `Result`s are reported like any other item and passed
/// through unchanged.
///
/// Created by [`Instrument::each()`].
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry};
///
/// let registry = Registry::new();
/// let instrument = Instrument::builder()
///     .name("fetch_page")
///     .sink(registry.sink())
///     .build();
///
/// for page in instrument.each(1..=3) {
///     let _ = page;
/// }
///
/// let report = registry.report();
/// let fetches = report.metric("fetch_page").unwrap();
/// assert_eq!(fetches.samples(), 3);
/// assert_eq!(fetches.total_count(), 3);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct MeasureEach<I, S>
where
    S: Sink,
{
    inner: I,
    instrument: Instrument<S>,
}

impl<I, S> MeasureEach<I, S>
where
    I: Iterator,
    S: Sink,
{
    pub(crate) fn new(inner: I, instrument: Instrument<S>) -> Self {
        Self { inner, instrument }
    }
}

impl<I, S> Iterator for MeasureEach<I, S>
where
    I: Iterator,
    S: Sink,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let instrument = &self.instrument;
        let stopwatch = Stopwatch::start(instrument.platform());

        let item = {
            let _failed_step = scopeguard::guard_on_unwind((), |()| {
                instrument.record(1, stopwatch.elapsed());
            });

            self.inner.next()
        }?;

        instrument.record(1, stopwatch.elapsed());
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I, S> std::fmt::Debug for MeasureEach<I, S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureEach")
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}
