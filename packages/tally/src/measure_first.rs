//! Measures the time taken to produce the first item of an iterator.

use std::marker::PhantomData;

use crate::stopwatch::Stopwatch;
use crate::{Instrument, Outcome, Plain, Sink};

/// Iterator that measures only the production of its first item.
///
/// The first `next()` call is measured and reported with a count of 1, whether it produces an
/// item or panics. All following items pass through without measurement. If the first step
/// panics, the iterator ends, even if the consumer catches the panic and keeps pulling. An empty underlying
/// iterator produces no report. Useful for measuring time-to-first-result of lazy queries.
///
/// If the first item is a failure (see [`Outcome`]), it is reported and handed to the
/// consumer, after which the iterator ends.
///
/// Created by [`Instrument::first()`] and [`Instrument::try_first()`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct MeasureFirst<I, S, K = Plain>
where
    S: Sink,
{
    inner: I,
    instrument: Instrument<S>,
    state: State,

    _outcome: PhantomData<fn() -> K>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    AwaitingFirst,
    PassingThrough,
    Ended,
}

impl<I, S, K> MeasureFirst<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    pub(crate) fn new(inner: I, instrument: Instrument<S>) -> Self {
        Self {
            inner,
            instrument,
            state: State::AwaitingFirst,
            _outcome: PhantomData,
        }
    }

    fn measure_first(&mut self) -> Option<I::Item> {
        // A panic in the first step ends the iterator; only one first item is ever reported.
        self.state = State::Ended;

        let instrument = &self.instrument;
        let stopwatch = Stopwatch::start(instrument.platform());

        let first = {
            let _failed_step = scopeguard::guard_on_unwind((), |()| {
                instrument.record(1, stopwatch.elapsed());
            });

            self.inner.next()
        };

        let item = first?;

        instrument.record(1, stopwatch.elapsed());

        if !K::is_failure(&item) {
            self.state = State::PassingThrough;
        }

        Some(item)
    }
}

impl<I, S, K> Iterator for MeasureFirst<I, S, K>
where
    I: Iterator,
    S: Sink,
    K: Outcome<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::AwaitingFirst => self.measure_first(),
            State::PassingThrough => self.inner.next(),
            State::Ended => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            State::Ended => (0, Some(0)),
            State::AwaitingFirst | State::PassingThrough => self.inner.size_hint(),
        }
    }
}

impl<I, S, K> std::fmt::Debug for MeasureFirst<I, S, K>
where
    S: Sink,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureFirst")
            .field("instrument", &self.instrument)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
