//! How a decorated function's work is measured.

use crate::{
    Fallible, Instrument, ItemCount, MeasureAll, MeasureEach, MeasureFirst, Outcome, Sealed,
    Sink,
};

/// Turns a call of a decorated function into a measurement.
///
/// `T` is what the decorated function returns. Iterator strategies call the function
/// immediately and measure only the iteration of what it returns. Iterators do their work
/// when pulled, so building one is not part of the measurement. [`Call`] and [`Produce`]
/// measure the call itself.
///
/// This trait is sealed and can only be implemented in the `tally` crate.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait Strategy<T, S>: Sealed
where
    S: Sink + Clone,
{
    /// What a call of the decorated function evaluates to.
    type Output;

    #[doc(hidden)]
    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output;
}

/// Measures draining the returned iterator, as [`Instrument::all()`] does.
#[derive(Debug)]
#[non_exhaustive]
pub struct All;

impl Sealed for All {}

impl<T, S> Strategy<T, S> for All
where
    T: IntoIterator,
    S: Sink + Clone,
{
    type Output = MeasureAll<T::IntoIter, S>;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        instrument.all(produce())
    }
}

/// Measures draining the returned iterator of `Result`s, as [`Instrument::try_all()`] does.
#[derive(Debug)]
#[non_exhaustive]
pub struct TryAll;

impl Sealed for TryAll {}

impl<T, S> Strategy<T, S> for TryAll
where
    T: IntoIterator,
    S: Sink + Clone,
    Fallible: Outcome<T::Item>,
{
    type Output = MeasureAll<T::IntoIter, S, Fallible>;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        MeasureAll::new(produce().into_iter(), instrument.clone())
    }
}

/// Measures producing each item of the returned iterator, as [`Instrument::each()`] does.
#[derive(Debug)]
#[non_exhaustive]
pub struct Each;

impl Sealed for Each {}

impl<T, S> Strategy<T, S> for Each
where
    T: IntoIterator,
    S: Sink + Clone,
{
    type Output = MeasureEach<T::IntoIter, S>;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        instrument.each(produce())
    }
}

/// Measures producing the first item of the returned iterator, as [`Instrument::first()`]
/// does.
#[derive(Debug)]
#[non_exhaustive]
pub struct First;

impl Sealed for First {}

impl<T, S> Strategy<T, S> for First
where
    T: IntoIterator,
    S: Sink + Clone,
{
    type Output = MeasureFirst<T::IntoIter, S>;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        instrument.first(produce())
    }
}

/// Measures producing the first item of the returned iterator of `Result`s, as
/// [`Instrument::try_first()`] does.
#[derive(Debug)]
#[non_exhaustive]
pub struct TryFirst;

impl Sealed for TryFirst {}

impl<T, S> Strategy<T, S> for TryFirst
where
    T: IntoIterator,
    S: Sink + Clone,
    Fallible: Outcome<T::Item>,
{
    type Output = MeasureFirst<T::IntoIter, S, Fallible>;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        MeasureFirst::new(produce().into_iter(), instrument.clone())
    }
}

/// Measures the call, reporting a count of 1, as [`Instrument::call()`] does.
#[derive(Debug)]
#[non_exhaustive]
pub struct Call;

impl Sealed for Call {}

impl<T, S> Strategy<T, S> for Call
where
    S: Sink + Clone,
{
    type Output = T;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        instrument.call(produce)
    }
}

/// Measures the call, reporting the number of items returned, as [`Instrument::produce()`]
/// does.
#[derive(Debug)]
#[non_exhaustive]
pub struct Produce;

impl Sealed for Produce {}

impl<T, S> Strategy<T, S> for Produce
where
    T: ItemCount,
    S: Sink + Clone,
{
    type Output = T;

    fn apply(instrument: &Instrument<S>, produce: impl FnOnce() -> T) -> Self::Output {
        instrument.produce(produce)
    }
}
