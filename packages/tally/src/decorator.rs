//! Reusable measurement of functions and methods.

use std::fmt;
use std::marker::PhantomData;

use crate::metric_name::method_metric_name;
use crate::reducer::measure_reduce;
use crate::{
    CallingConvention, Convention, Counted, DefaultSink, Instrument, MetricName, Reducer,
    Sequence, Sink, Strategy, UnitName, Variadic,
};

/// Applies one measurement configuration to any number of functions and methods.
///
/// Each decorated function is measured with the [`Strategy`] chosen when decorating it, or
/// as a [`Reducer`] when decorated with [`reducer()`][Self::reducer] or
/// [`reducer_method()`][Self::reducer_method]. If
/// the decorator's instrument has a name, every decorated unit reports under that name.
/// Otherwise the name is derived from the unit being decorated:
///
/// * plain functions report as `{module}.{function}`, captured with
///   [`unit_name!`][crate::unit_name];
/// * methods report as `{module}.{type}.{method}`, where the type is that of the receiver
///   each call is bound to.
///
/// Created by [`Instrument::decorator()`] or from an [`Instrument`] via `From`.
///
/// # Examples
///
/// ```
/// use tally::strategies::All;
/// use tally::{Instrument, Registry, unit_name};
///
/// fn scan_ports(range: std::ops::Range<u16>) -> impl Iterator<Item = u16> {
///     range.filter(|port| port % 1000 == 0)
/// }
///
/// let registry = Registry::new();
/// let decorator = Instrument::builder().sink(registry.sink()).build().decorator();
///
/// let scan_ports = decorator.function::<All, _>(unit_name!(scan_ports), scan_ports);
/// let open: Vec<u16> = scan_ports.call(1..5000).collect();
/// assert_eq!(open, vec![1000, 2000, 3000, 4000]);
///
/// let name = format!("{}.scan_ports", module_path!());
/// assert_eq!(registry.report().metric(&name).unwrap().total_count(), 4);
/// ```
#[derive(Clone)]
pub struct Decorator<S = DefaultSink>
where
    S: Sink,
{
    instrument: Instrument<S>,
}

impl<S> Decorator<S>
where
    S: Sink + Clone,
{
    pub(crate) fn new(instrument: Instrument<S>) -> Self {
        Self { instrument }
    }

    /// The instrument that decorated units are measured with.
    ///
    /// Use it directly to measure a unit inline instead of decorating it.
    #[must_use]
    pub fn instrument(&self) -> &Instrument<S> {
        &self.instrument
    }

    /// Decorates a plain function.
    ///
    /// The function takes its arguments as a single value; use a tuple for more than one.
    pub fn function<K, F>(&self, unit: UnitName, func: F) -> Decorated<K, F, S> {
        Decorated {
            func,
            instrument: self.instrument_for_unit(unit),
            _strategy: PhantomData,
        }
    }

    /// Decorates a reducing function.
    ///
    /// The `convention` tag decides what the function receives, as with
    /// [`Instrument::reducer()`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::vec;
    ///
    /// use tally::{Counted, Instrument, Registry, Sequence, unit_name};
    ///
    /// fn first_two(items: &mut Counted<vec::IntoIter<u32>>) -> [Option<u32>; 2] {
    ///     [items.next(), items.next()]
    /// }
    ///
    /// let registry = Registry::new();
    /// let decorator = Instrument::builder().sink(registry.sink()).build().decorator();
    ///
    /// let measured = decorator.reducer(unit_name!(first_two), Sequence, first_two);
    /// assert_eq!(measured.call(vec![1, 2, 3, 4, 5]), [Some(1), Some(2)]);
    ///
    /// let name = format!("{}.first_two", module_path!());
    /// assert_eq!(registry.report().metric(&name).unwrap().total_count(), 2);
    /// ```
    pub fn reducer<C, F>(&self, unit: UnitName, convention: C, func: F) -> Reducer<F, C, S>
    where
        C: Convention,
    {
        Reducer::new(convention, func, self.instrument_for_unit(unit))
    }

    /// Decorates a method.
    ///
    /// `func` receives the receiver followed by the remaining arguments as a single value.
    /// The metric name is resolved each time the method is bound to a receiver.
    pub fn method<K, F>(&self, method: &'static str, func: F) -> DecoratedMethod<K, F, S> {
        DecoratedMethod {
            method,
            func,
            instrument: self.instrument.clone(),
            _strategy: PhantomData,
        }
    }

    /// Decorates a reducing method.
    ///
    /// `func` receives the receiver followed by the items, in the form the `convention` tag
    /// selects. The metric name is resolved each time the method is bound to a receiver.
    pub fn reducer_method<C, F>(
        &self,
        method: &'static str,
        _convention: C,
        func: F,
    ) -> ReducerMethod<F, C, S>
    where
        C: Convention,
    {
        ReducerMethod {
            method,
            func,
            instrument: self.instrument.clone(),
            _convention: PhantomData,
        }
    }

    fn instrument_for_unit(&self, unit: UnitName) -> Instrument<S> {
        let name = self.instrument.metric_name().clone().or_else(|| unit.to_string());
        self.instrument.renamed(name)
    }
}

impl<S> From<Instrument<S>> for Decorator<S>
where
    S: Sink + Clone,
{
    fn from(instrument: Instrument<S>) -> Self {
        Self::new(instrument)
    }
}

impl<S> fmt::Debug for Decorator<S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("instrument", &self.instrument)
            .finish()
    }
}

/// A function whose every call is measured with strategy `K`.
///
/// Created by [`Decorator::function()`].
pub struct Decorated<K, F, S>
where
    S: Sink,
{
    func: F,
    instrument: Instrument<S>,
    _strategy: PhantomData<fn() -> K>,
}

impl<K, F, S> Decorated<K, F, S>
where
    S: Sink + Clone,
{
    /// The name measurements are reported under.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.instrument.name()
    }

    /// Calls the function with `args` and measures it.
    pub fn call<A, T>(&self, args: A) -> K::Output
    where
        F: Fn(A) -> T,
        K: Strategy<T, S>,
    {
        K::apply(&self.instrument, || (self.func)(args))
    }
}

impl<K, F, S> Clone for Decorated<K, F, S>
where
    F: Clone,
    S: Sink + Clone,
{
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            instrument: self.instrument.clone(),
            _strategy: PhantomData,
        }
    }
}

impl<K, F, S> fmt::Debug for Decorated<K, F, S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorated")
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

/// A method whose every call is measured with strategy `K`, once bound to a receiver.
///
/// Created by [`Decorator::method()`].
///
/// # Examples
///
/// A method decorated once in a trait's default implementation reports under the name of
/// whichever type it is called on:
///
/// ```
/// use tally::strategies::Produce;
/// use tally::{Decorator, Instrument, Registry, RegistrySink};
///
/// trait Source {
///     fn fetch(&self) -> Vec<u8>;
///
///     fn measured_fetch(&self, decorator: &Decorator<RegistrySink>) -> Vec<u8>
///     where
///         Self: Sized,
///     {
///         decorator
///             .method::<Produce, _>("fetch", |source: &Self, ()| source.fetch())
///             .bind(self)
///             .call(())
///     }
/// }
///
/// struct Disk;
///
/// impl Source for Disk {
///     fn fetch(&self) -> Vec<u8> {
///         vec![1, 2, 3]
///     }
/// }
///
/// let registry = Registry::new();
/// let decorator = Instrument::builder().sink(registry.sink()).build().decorator();
///
/// assert_eq!(Disk.measured_fetch(&decorator).len(), 3);
///
/// let report = registry.report();
/// let name = report.metrics().next().unwrap().name();
/// assert!(name.ends_with(".Disk.fetch"));
/// ```
pub struct DecoratedMethod<K, F, S>
where
    S: Sink,
{
    method: &'static str,
    func: F,
    instrument: Instrument<S>,
    _strategy: PhantomData<fn() -> K>,
}

impl<K, F, S> DecoratedMethod<K, F, S>
where
    S: Sink + Clone,
{
    /// The bare name of the decorated method.
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The name measurements are reported under when bound to a receiver of type `T`.
    #[must_use]
    pub fn name_for<T>(&self) -> MetricName
    where
        T: ?Sized,
    {
        method_name_for::<T, S>(&self.instrument, self.method)
    }

    /// Binds the method to a receiver, resolving the metric name from the receiver's type.
    ///
    /// Resolving the name formats a new string on every call. On hot paths, bind once and
    /// keep the [`BoundMethod`] for as long as the receiver is borrowed.
    pub fn bind<'a, T>(&'a self, receiver: &'a T) -> BoundMethod<'a, K, F, T, S>
    where
        T: ?Sized,
    {
        BoundMethod {
            func: &self.func,
            receiver,
            instrument: self.instrument.renamed(self.name_for::<T>()),
            _strategy: PhantomData,
        }
    }
}

impl<K, F, S> fmt::Debug for DecoratedMethod<K, F, S>
where
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedMethod")
            .field("method", &self.method)
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

/// A decorated method bound to a receiver, ready to be called.
///
/// Created by [`DecoratedMethod::bind()`].
pub struct BoundMethod<'a, K, F, T, S>
where
    T: ?Sized,
    S: Sink,
{
    func: &'a F,
    receiver: &'a T,
    instrument: Instrument<S>,
    _strategy: PhantomData<fn() -> K>,
}

impl<'a, K, F, T, S> BoundMethod<'a, K, F, T, S>
where
    T: ?Sized,
    S: Sink + Clone,
{
    /// The name measurements are reported under.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.instrument.name()
    }

    /// Calls the method on the bound receiver with `args` and measures it.
    pub fn call<A, R>(&self, args: A) -> K::Output
    where
        F: Fn(&'a T, A) -> R,
        K: Strategy<R, S>,
    {
        let func = self.func;
        let receiver = self.receiver;

        K::apply(&self.instrument, move || func(receiver, args))
    }
}

impl<K, F, T, S> fmt::Debug for BoundMethod<'_, K, F, T, S>
where
    T: ?Sized,
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

/// A reducing method whose every call is measured, once bound to a receiver.
///
/// Created by [`Decorator::reducer_method()`].
///
/// # Examples
///
/// ```
/// use tally::{Instrument, Registry, Variadic};
///
/// struct Ledger {
///     opening: i64,
/// }
///
/// let registry = Registry::new();
/// let decorator = Instrument::builder().sink(registry.sink()).build().decorator();
///
/// let balance = decorator.reducer_method(
///     "balance",
///     Variadic,
///     |ledger: &Ledger, entries: Vec<i64>| ledger.opening + entries.iter().sum::<i64>(),
/// );
///
/// let ledger = Ledger { opening: 100 };
/// assert_eq!(balance.bind(&ledger).call([-30, 5]), 75);
///
/// let report = registry.report();
/// let metric = report.metrics().next().unwrap();
/// assert!(metric.name().ends_with(".Ledger.balance"));
/// assert_eq!(metric.total_count(), 2);
/// ```
pub struct ReducerMethod<F, C, S>
where
    S: Sink,
{
    method: &'static str,
    func: F,
    instrument: Instrument<S>,
    _convention: PhantomData<fn() -> C>,
}

impl<F, C, S> ReducerMethod<F, C, S>
where
    C: Convention,
    S: Sink + Clone,
{
    /// The bare name of the decorated method.
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The calling convention of the wrapped method.
    #[must_use]
    pub fn convention(&self) -> CallingConvention {
        C::KIND
    }

    /// The name measurements are reported under when bound to a receiver of type `T`.
    #[must_use]
    pub fn name_for<T>(&self) -> MetricName
    where
        T: ?Sized,
    {
        method_name_for::<T, S>(&self.instrument, self.method)
    }

    /// Binds the method to a receiver, resolving the metric name from the receiver's type.
    ///
    /// As with [`DecoratedMethod::bind()`], keep the result around on hot paths.
    pub fn bind<'a, T>(&'a self, receiver: &'a T) -> BoundReducer<'a, F, C, T, S>
    where
        T: ?Sized,
    {
        BoundReducer {
            func: &self.func,
            receiver,
            instrument: self.instrument.renamed(self.name_for::<T>()),
            _convention: PhantomData,
        }
    }
}

impl<F, C, S> fmt::Debug for ReducerMethod<F, C, S>
where
    C: Convention,
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerMethod")
            .field("method", &self.method)
            .field("convention", &C::KIND)
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

/// A decorated reducing method bound to a receiver, ready to be called.
///
/// Created by [`ReducerMethod::bind()`].
pub struct BoundReducer<'a, F, C, T, S>
where
    T: ?Sized,
    S: Sink,
{
    func: &'a F,
    receiver: &'a T,
    instrument: Instrument<S>,
    _convention: PhantomData<fn() -> C>,
}

impl<F, C, T, S> BoundReducer<'_, F, C, T, S>
where
    T: ?Sized,
    S: Sink,
{
    /// The name measurements are reported under.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.instrument.name()
    }
}

impl<'a, F, T, S> BoundReducer<'a, F, Sequence, T, S>
where
    T: ?Sized,
    S: Sink,
{
    /// Calls the method on the bound receiver with a counting cursor over `items`.
    pub fn call<I, R>(&self, items: I) -> R
    where
        I: IntoIterator,
        F: Fn(&'a T, &mut Counted<I::IntoIter>) -> R,
    {
        let func = self.func;
        let receiver = self.receiver;

        measure_reduce(&self.instrument, items, |cursor| func(receiver, cursor))
    }
}

impl<'a, F, T, S> BoundReducer<'a, F, Variadic, T, S>
where
    T: ?Sized,
    S: Sink,
{
    /// Calls the method on the bound receiver with every item of `items` as its argument
    /// list.
    pub fn call<I, R>(&self, items: I) -> R
    where
        I: IntoIterator,
        F: Fn(&'a T, Vec<I::Item>) -> R,
    {
        let func = self.func;
        let receiver = self.receiver;

        measure_reduce(&self.instrument, items, |cursor| {
            let arguments: Vec<_> = cursor.collect();
            func(receiver, arguments)
        })
    }
}

impl<F, C, T, S> fmt::Debug for BoundReducer<'_, F, C, T, S>
where
    C: Convention,
    T: ?Sized,
    S: Sink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundReducer")
            .field("convention", &C::KIND)
            .field("instrument", &self.instrument)
            .finish_non_exhaustive()
    }
}

fn method_name_for<T, S>(instrument: &Instrument<S>, method: &str) -> MetricName
where
    T: ?Sized,
    S: Sink,
{
    instrument
        .metric_name()
        .clone()
        .or_else(|| method_metric_name::<T>(method))
}
