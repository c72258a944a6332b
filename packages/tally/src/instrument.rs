//! The configured measuring handle that every wrapper is created from.

use std::fmt;
use std::time::Duration;

use scopeguard::guard_on_unwind;

use crate::pal::PlatformFacade;
use crate::reducer::measure_reduce;
use crate::stopwatch::Stopwatch;
use crate::{
    BlockSpan, Convention, Counted, Decorator, DefaultSink, Fallible, InstrumentBuilder,
    ItemCount, MeasureAll, MeasureEach, MeasureFirst, MetricName, Reducer, Sink,
};

/// Measures units of work and reports each measurement to a [`Sink`] under one metric name.
///
/// An instrument is cheap to clone and can be reused for any number of measurements. Each
/// wrapper it creates takes its own copy, so wrappers can outlive the instrument.
///
/// | Method | Measures | Reports |
/// |--------|----------|---------|
/// | [`all()`][Self::all] | draining an iterator | once, with the item count |
/// | [`each()`][Self::each] | producing each item | once per item, count 1 |
/// | [`first()`][Self::first] | producing the first item | once, count 1 |
/// | [`reducer()`][Self::reducer], [`reduce()`][Self::reduce] | a function consuming a sequence | once per call, items consumed |
/// | [`call()`][Self::call] | a function call | once per call, count 1 |
/// | [`produce()`][Self::produce] | a function returning a collection | once per call, collection size |
/// | [`block()`][Self::block] | a region of code | once, count 1 or overridden |
///
/// # Examples
///
/// ```
/// use tally::{Instrument, LogSink};
///
/// let instrument = Instrument::builder()
///     .name("config_load")
///     .sink(LogSink::default())
///     .build();
///
/// let settings = instrument.call(|| vec![("retries", 3), ("timeout_secs", 30)]);
/// assert_eq!(settings.len(), 2);
/// ```
#[derive(Clone)]
pub struct Instrument<S = DefaultSink>
where
    S: Sink,
{
    name: MetricName,
    sink: S,
    platform: PlatformFacade,
}

impl Instrument<DefaultSink> {
    /// Creates a builder for an instrument.
    ///
    /// Without further configuration, the instrument is unnamed and reports to the
    /// process-wide default sink.
    #[must_use]
    pub fn builder() -> InstrumentBuilder<DefaultSink> {
        InstrumentBuilder::new()
    }
}

impl<S> Instrument<S>
where
    S: Sink,
{
    pub(crate) fn new(name: MetricName, sink: S, platform: PlatformFacade) -> Self {
        Self {
            name,
            sink,
            platform,
        }
    }

    /// The name reported with every measurement, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_str()
    }

    pub(crate) fn metric_name(&self) -> &MetricName {
        &self.name
    }

    /// The sink measurements are reported to.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    /// Returns a copy of this instrument reporting under a different name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<MetricName>) -> Self
    where
        S: Clone,
    {
        Self {
            name: name.into(),
            sink: self.sink.clone(),
            platform: self.platform.clone(),
        }
    }

    /// Reports a measurement taken by some other means.
    pub fn record(&self, count: u64, elapsed: Duration) {
        self.sink.record(self.name.as_str(), count, elapsed);
    }

    /// Starts measuring a region of code, ending when the returned span is dropped.
    pub fn block(&self) -> BlockSpan<'_, S> {
        BlockSpan::new(self)
    }

    /// Measures one call of `func`, reporting a count of 1.
    ///
    /// The measurement is reported when `func` returns or panics.
    pub fn call<R>(&self, func: impl FnOnce() -> R) -> R {
        let _span = self.block();
        func()
    }

    /// Measures one call of `func`, reporting the number of items in the returned value.
    ///
    /// If `func` panics, the call is reported with a count of zero and the panic continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally::{Instrument, Registry};
    ///
    /// let registry = Registry::new();
    /// let instrument = Instrument::builder()
    ///     .name("list_users")
    ///     .sink(registry.sink())
    ///     .build();
    ///
    /// let users = instrument.produce(|| vec!["ada", "grace", "linus"]);
    ///
    /// assert_eq!(users.len(), 3);
    /// assert_eq!(registry.report().metric("list_users").unwrap().total_count(), 3);
    /// ```
    pub fn produce<T>(&self, func: impl FnOnce() -> T) -> T
    where
        T: ItemCount,
    {
        let stopwatch = Stopwatch::start(&self.platform);

        let produced = {
            let _failed = guard_on_unwind((), |()| self.record(0, stopwatch.elapsed()));
            func()
        };

        self.record(produced.item_count(), stopwatch.elapsed());
        produced
    }

    /// Measures one call of a reducing function over `items`, reporting how many items it
    /// pulled from the counting cursor it is given.
    ///
    /// Use [`reducer()`][Self::reducer] to wrap a reducing function for repeated calls.
    pub fn reduce<I, R>(&self, items: I, reduce: impl FnOnce(&mut Counted<I::IntoIter>) -> R) -> R
    where
        I: IntoIterator,
    {
        measure_reduce(self, items, reduce)
    }
}

impl<S> Instrument<S>
where
    S: Sink + Clone,
{
    /// Measures the total time and item count of draining `items`.
    ///
    /// See [`MeasureAll`] for the reporting rules.
    pub fn all<I>(&self, items: I) -> MeasureAll<I::IntoIter, S>
    where
        I: IntoIterator,
    {
        MeasureAll::new(items.into_iter(), self.clone())
    }

    /// Measures the total time and item count of draining `items`, stopping at the first `Err`.
    ///
    /// See [`MeasureAll`] for the reporting rules.
    pub fn try_all<I, T, E>(&self, items: I) -> MeasureAll<I::IntoIter, S, Fallible>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        MeasureAll::new(items.into_iter(), self.clone())
    }

    /// Measures the time taken to produce each item of `items`.
    ///
    /// See [`MeasureEach`] for the reporting rules.
    pub fn each<I>(&self, items: I) -> MeasureEach<I::IntoIter, S>
    where
        I: IntoIterator,
    {
        MeasureEach::new(items.into_iter(), self.clone())
    }

    /// Measures the time taken to produce the first item of `items`.
    ///
    /// See [`MeasureFirst`] for the reporting rules.
    pub fn first<I>(&self, items: I) -> MeasureFirst<I::IntoIter, S>
    where
        I: IntoIterator,
    {
        MeasureFirst::new(items.into_iter(), self.clone())
    }

    /// Measures the time taken to produce the first item of `items`, ending early if it is
    /// an `Err`.
    ///
    /// See [`MeasureFirst`] for the reporting rules.
    pub fn try_first<I, T, E>(&self, items: I) -> MeasureFirst<I::IntoIter, S, Fallible>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        MeasureFirst::new(items.into_iter(), self.clone())
    }

    /// Wraps a reducing function so that every call to it is measured.
    ///
    /// The `convention` tag ([`Sequence`][crate::Sequence] or [`Variadic`][crate::Variadic])
    /// decides what the function receives. See [`Reducer`].
    pub fn reducer<C, F>(&self, convention: C, func: F) -> Reducer<F, C, S>
    where
        C: Convention,
    {
        Reducer::new(convention, func, self.clone())
    }

    /// Creates a decorator that applies this instrument's sink (and name, if it has one) to
    /// functions and methods.
    #[must_use]
    pub fn decorator(&self) -> Decorator<S> {
        Decorator::new(self.clone())
    }
}

impl<S> fmt::Debug for Instrument<S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("name", &self.name)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
