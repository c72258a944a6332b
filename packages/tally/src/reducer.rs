//! Measures functions that consume a sequence of items and reduce it to a single result.

use std::marker::PhantomData;

use crate::stopwatch::Stopwatch;
use crate::{Counted, Instrument, Sealed, Sink};

/// How a reducing function receives the items it consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CallingConvention {
    /// The function receives an iterator and pulls as many items as it wants.
    Sequence,

    /// The function receives every item up front, as an argument list.
    Variadic,
}

/// Selects the calling convention of a [`Reducer`] at construction time.
///
/// This trait is sealed and can only be implemented in the `tally` crate.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait Convention: Sealed {
    /// The calling convention this tag selects.
    const KIND: CallingConvention;
}

/// Tag for reducing functions that take `&mut Counted<I>` and pull items themselves.
#[derive(Clone, Copy, Debug, Default)]
#[expect(
    clippy::exhaustive_structs,
    reason = "unit tag constructed by callers to select a calling convention"
)]
pub struct Sequence;

impl Sealed for Sequence {}
impl Convention for Sequence {
    const KIND: CallingConvention = CallingConvention::Sequence;
}

/// Tag for reducing functions that take all of their items as a `Vec<T>` argument list.
#[derive(Clone, Copy, Debug, Default)]
#[expect(
    clippy::exhaustive_structs,
    reason = "unit tag constructed by callers to select a calling convention"
)]
pub struct Variadic;

impl Sealed for Variadic {}
impl Convention for Variadic {
    const KIND: CallingConvention = CallingConvention::Variadic;
}

/// A reducing function wrapped so that every call is measured.
///
/// Each call is timed from start to finish and reported once with the number of items the
/// function actually pulled from its input, which may be fewer than the input holds if the
/// function stops early. The report happens whether the function returns (including with an
/// `Err`) or panics; the return value or panic is passed through unchanged.
///
/// Callers always pass the input as any `IntoIterator`. What the wrapped function receives
/// depends on the calling convention tag given to [`Instrument::reducer()`]:
///
/// * [`Sequence`]: a `&mut Counted<I>` to pull items from.
/// * [`Variadic`]: a `Vec<T>` holding every item. Collecting the arguments is part of the
///   measured call and every item counts as consumed.
///
/// # Examples
///
/// ```
/// use std::vec;
///
/// use tally::{Counted, Instrument, Registry, Sequence, Variadic};
///
/// let registry = Registry::new();
/// let instrument = Instrument::builder()
///     .name("first_two")
///     .sink(registry.sink())
///     .build();
///
/// let first_two = instrument.reducer(Sequence, |items: &mut Counted<vec::IntoIter<u32>>| {
///     [items.next(), items.next()]
/// });
///
/// assert_eq!(first_two.call(vec![1, 2, 3, 4, 5]), [Some(1), Some(2)]);
/// assert_eq!(registry.report().metric("first_two").unwrap().total_count(), 2);
///
/// let sum = instrument.reducer(Variadic, |items: Vec<u32>| items.iter().sum::<u32>());
/// assert_eq!(sum.call(vec![1, 2, 3]), 6);
/// ```
pub struct Reducer<F, C, S>
where
    S: Sink,
{
    func: F,
    instrument: Instrument<S>,
    _convention: PhantomData<fn() -> C>,
}

impl<F, C, S> Reducer<F, C, S>
where
    C: Convention,
    S: Sink,
{
    pub(crate) fn new(_convention: C, func: F, instrument: Instrument<S>) -> Self {
        Self {
            func,
            instrument,
            _convention: PhantomData,
        }
    }

    /// The calling convention of the wrapped function.
    #[must_use]
    pub fn convention(&self) -> CallingConvention {
        C::KIND
    }

    /// The instrument that measures each call.
    #[must_use]
    pub fn instrument(&self) -> &Instrument<S> {
        &self.instrument
    }

    /// Takes the wrapped function back out.
    #[must_use]
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F, S> Reducer<F, Sequence, S>
where
    S: Sink,
{
    /// Calls the wrapped function with a counting cursor over `items`.
    pub fn call<I, R>(&self, items: I) -> R
    where
        I: IntoIterator,
        F: Fn(&mut Counted<I::IntoIter>) -> R,
    {
        measure_reduce(&self.instrument, items, |cursor| (self.func)(cursor))
    }
}

impl<F, S> Reducer<F, Variadic, S>
where
    S: Sink,
{
    /// Calls the wrapped function with every item of `items` as its argument list.
    pub fn call<I, R>(&self, items: I) -> R
    where
        I: IntoIterator,
        F: Fn(Vec<I::Item>) -> R,
    {
        measure_reduce(&self.instrument, items, |cursor| {
            let arguments: Vec<_> = cursor.collect();
            (self.func)(arguments)
        })
    }
}

impl<F, C, S> Clone for Reducer<F, C, S>
where
    F: Clone,
    S: Sink + Clone,
{
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            instrument: self.instrument.clone(),
            _convention: PhantomData,
        }
    }
}

impl<F, C, S> std::fmt::Debug for Reducer<F, C, S>
where
    C: Convention,
    S: Sink,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reducer")
            .field("convention", &C::KIND)
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

/// Runs `reduce` over a counting cursor of `items`, reporting the items it pulled and the
/// time it took once it returns or panics.
pub(crate) fn measure_reduce<I, R, S>(
    instrument: &Instrument<S>,
    items: I,
    reduce: impl FnOnce(&mut Counted<I::IntoIter>) -> R,
) -> R
where
    I: IntoIterator,
    S: Sink,
{
    let stopwatch = Stopwatch::start(instrument.platform());

    let mut cursor = scopeguard::guard(Counted::new(items.into_iter()), |cursor| {
        instrument.record(cursor.pulled(), stopwatch.elapsed());
    });

    reduce(&mut *cursor)
}
