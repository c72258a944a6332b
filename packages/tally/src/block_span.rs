//! Measures an arbitrary region of code.

use std::time::Duration;

use crate::stopwatch::Stopwatch;
use crate::{Instrument, Sink};

/// A measured region of code, from creation until [`finish()`][Self::finish] or drop.
///
/// The measurement is reported exactly once when the span ends, however it ends: at the end
/// of the scope, on an early return, or while a panic unwinds through it. The reported count
/// is 1 unless overridden with [`count()`][Self::count].
///
/// Created by [`Instrument::block()`].
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry};
///
/// let registry = Registry::new();
/// let instrument = Instrument::builder()
///     .name("batch_insert")
///     .sink(registry.sink())
///     .build();
///
/// let rows = vec![1, 2, 3, 4];
/// {
///     let _span = instrument.block().count(rows.len() as u64);
///     // Insert the rows here.
/// } // Measurement is reported here.
///
/// assert_eq!(registry.report().metric("batch_insert").unwrap().total_count(), 4);
/// ```
#[must_use = "Measurements are taken between creation and drop"]
pub struct BlockSpan<'a, S>
where
    S: Sink,
{
    instrument: &'a Instrument<S>,
    stopwatch: Stopwatch<'a>,
    count: u64,
}

impl<'a, S> BlockSpan<'a, S>
where
    S: Sink,
{
    pub(crate) fn new(instrument: &'a Instrument<S>) -> Self {
        Self {
            instrument,
            stopwatch: Stopwatch::start(instrument.platform()),
            count: 1,
        }
    }

    /// Sets the number of items the region represents. Defaults to 1.
    pub fn count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Sets the number of items the region represents without consuming the span.
    ///
    /// Useful when the number of items is only known once the work is done.
    pub fn set_count(&mut self, count: u64) {
        self.count = count;
    }

    /// The time elapsed since the span was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    /// Ends the span and reports the measurement.
    pub fn finish(self) {
        drop(self);
    }
}

impl<S> Drop for BlockSpan<'_, S>
where
    S: Sink,
{
    fn drop(&mut self) {
        self.instrument.record(self.count, self.stopwatch.elapsed());
    }
}

impl<S> std::fmt::Debug for BlockSpan<'_, S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockSpan")
            .field("instrument", &self.instrument)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::testing::{Recorder, fake_instrument};

    #[test]
    fn reports_on_drop_with_default_count() {
        let recorder = Recorder::new();
        let (instrument, clock) = fake_instrument("block", &recorder);

        {
            let _span = instrument.block();
            clock.advance(Duration::from_millis(40));
        }

        assert_eq!(
            recorder.records(),
            vec![(Some("block".to_owned()), 1, Duration::from_millis(40))]
        );
    }

    #[test]
    fn count_can_be_overridden() {
        let recorder = Recorder::new();
        let (instrument, _clock) = fake_instrument("batch", &recorder);

        instrument.block().count(5).finish();

        let mut span = instrument.block();
        span.set_count(0);
        span.finish();

        let counts: Vec<_> = recorder.records().into_iter().map(|r| r.1).collect();
        assert_eq!(counts, vec![5, 0]);
    }

    #[test]
    fn early_return_is_reported() {
        fn fallible(instrument: &Instrument<Recorder>, give_up: bool) -> Result<(), &'static str> {
            let _span = instrument.block();
            if give_up {
                return Err("gave up");
            }
            Ok(())
        }

        let recorder = Recorder::new();
        let (instrument, _clock) = fake_instrument("early", &recorder);

        assert_eq!(fallible(&instrument, true), Err("gave up"));
        assert_eq!(fallible(&instrument, false), Ok(()));
        assert_eq!(recorder.records().len(), 2);
    }

    #[test]
    fn panic_is_reported_and_propagates() {
        let recorder = Recorder::new();
        let (instrument, clock) = fake_instrument("exploding", &recorder);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _span = instrument.block().count(3);
            clock.advance(Duration::from_secs(2));
            panic!("block exploded");
        }));

        assert!(result.is_err());
        assert_eq!(
            recorder.records(),
            vec![(Some("exploding".to_owned()), 3, Duration::from_secs(2))]
        );
    }

    #[test]
    fn elapsed_reads_running_time() {
        let recorder = Recorder::new();
        let (instrument, clock) = fake_instrument("running", &recorder);

        let span = instrument.block();
        clock.advance(Duration::from_secs(1));

        assert_eq!(span.elapsed(), Duration::from_secs(1));
        assert!(recorder.records().is_empty());
    }
}
