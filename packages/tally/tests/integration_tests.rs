//! Integration tests for `tally` against the real clock.
//!
//! Producers sleep to make elapsed times measurable. Assertions only rely on lower bounds
//! for time spent producing and on generous upper bounds for time spent consuming.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use std::time::Duration;

use tally::strategies::{All, Each, First, Produce};
use tally::{Counted, Instrument, Registry, RegistrySink, Sequence, Variadic, unit_name};

const STEP: Duration = Duration::from_millis(10);

fn slow_items(count: u32) -> impl Iterator<Item = u32> {
    (0..count).map(|item| {
        thread::sleep(STEP);
        item
    })
}

fn instrument(name: &'static str, registry: &Registry) -> Instrument<RegistrySink> {
    Instrument::builder()
        .name(name)
        .sink(registry.sink())
        .build()
}

#[test]
#[cfg_attr(miri, ignore)] // Miri is too slow for real sleeps.
fn drain_all_reports_total_time_and_count() {
    let registry = Registry::new();
    let instrument = instrument("drain", &registry);

    let items: Vec<_> = instrument.all(slow_items(5)).collect();
    assert_eq!(items, vec![0, 1, 2, 3, 4]);

    let report = registry.report();
    let drain = report.metric("drain").expect("metric was recorded");

    assert_eq!(drain.samples(), 1);
    assert_eq!(drain.total_count(), 5);
    assert!(drain.total_elapsed() >= STEP * 5);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri is too slow for real sleeps.
fn consumer_time_not_measured() {
    let registry = Registry::new();
    let instrument = instrument("fast_producer", &registry);

    for _item in instrument.all([1, 2, 3]) {
        thread::sleep(Duration::from_millis(50));
    }

    let report = registry.report();
    let metric = report.metric("fast_producer").expect("metric was recorded");

    assert_eq!(metric.total_count(), 3);
    assert!(metric.total_elapsed() < Duration::from_millis(50));
}

#[test]
#[cfg_attr(miri, ignore)] // Miri is too slow for real sleeps.
fn per_item_reports_each_item() {
    let registry = Registry::new();
    let instrument = instrument("each", &registry);

    assert_eq!(instrument.each(slow_items(4)).count(), 4);

    let report = registry.report();
    let each = report.metric("each").expect("metric was recorded");

    assert_eq!(each.samples(), 4);
    assert_eq!(each.total_count(), 4);
    assert!(each.elapsed_mean() >= STEP);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri is too slow for real sleeps.
fn first_item_reports_once() {
    let registry = Registry::new();
    let instrument = instrument("first", &registry);

    assert_eq!(instrument.first(slow_items(3)).count(), 3);

    let report = registry.report();
    let first = report.metric("first").expect("metric was recorded");

    assert_eq!(first.samples(), 1);
    assert_eq!(first.total_count(), 1);
    assert!(first.total_elapsed() >= STEP);
}

#[test]
fn empty_input_reports_only_for_drain_all() {
    let registry = Registry::new();

    let empty: [u8; 0] = [];
    assert_eq!(instrument("all", &registry).all(empty).count(), 0);
    assert_eq!(instrument("each", &registry).each(empty).count(), 0);
    assert_eq!(instrument("first", &registry).first(empty).count(), 0);

    let report = registry.report();
    let names: Vec<_> = report.metrics().map(|metric| metric.name()).collect();

    assert_eq!(names, vec!["all"]);
    assert_eq!(report.metric("all").map(|m| m.total_count()), Some(0));
}

#[test]
fn reduce_counts_pulled_items() {
    let registry = Registry::new();
    let instrument = instrument("reduce", &registry);

    let take_two = instrument.reducer(Sequence, |items: &mut Counted<std::ops::Range<u32>>| {
        items.take(2).sum::<u32>()
    });
    let join = instrument.reducer(Variadic, |words: Vec<&str>| words.join("-"));

    assert_eq!(take_two.call(10..100), 21);
    assert_eq!(join.call(["a", "b", "c"]), "a-b-c");

    let report = registry.report();
    let reduce = report.metric("reduce").expect("metric was recorded");
    assert_eq!(reduce.samples(), 2);
    assert_eq!(reduce.total_count(), 5);
}

#[test]
fn panics_are_reported_then_propagated() {
    let registry = Registry::new();
    let instrument = instrument("exploding", &registry);

    let exploding = (0..5).map(|item| {
        assert!(item < 3, "item {item} is cursed");
        item
    });

    let result = catch_unwind(AssertUnwindSafe(|| instrument.all(exploding).count()));

    assert!(result.is_err());
    assert_eq!(
        registry.report().metric("exploding").map(|m| m.total_count()),
        Some(3)
    );
}

#[test]
fn failed_items_end_measurement() {
    let registry = Registry::new();
    let instrument = instrument("rows", &registry);

    let rows = vec![Ok(1), Ok(2), Err("corrupt row"), Ok(4)];
    let seen: Vec<Result<u8, &str>> = instrument.try_all(rows).collect();

    assert_eq!(seen, vec![Ok(1), Ok(2), Err("corrupt row")]);
    assert_eq!(
        registry.report().metric("rows").map(|m| m.total_count()),
        Some(2)
    );
}

#[test]
fn abandoned_iterator_reports_on_drop() {
    let registry = Registry::new();
    let instrument = instrument("abandoned", &registry);

    let mut measured = instrument.all(0..100);
    measured.by_ref().take(7).for_each(drop);
    drop(measured);

    assert_eq!(
        registry.report().metric("abandoned").map(|m| m.total_count()),
        Some(7)
    );
}

#[test]
fn block_reports_overridden_count() {
    let registry = Registry::new();
    let instrument = instrument("block", &registry);

    {
        let _span = instrument.block().count(5);
        thread::sleep(STEP);
    }

    let report = registry.report();
    let block = report.metric("block").expect("metric was recorded");
    assert_eq!(block.total_count(), 5);
    assert!(block.total_elapsed() >= STEP);
}

fn load_config() -> Vec<(&'static str, u32)> {
    vec![("retries", 3), ("timeout", 30)]
}

fn scan(limit: u32) -> impl Iterator<Item = u32> {
    0..limit
}

#[test]
fn decorated_functions_named_after_module_and_function() {
    let registry = Registry::new();
    let decorator = Instrument::builder().sink(registry.sink()).build().decorator();

    let load_config = decorator.function::<Produce, _>(unit_name!(load_config), |()| load_config());
    let scan = decorator.function::<First, _>(unit_name!(scan), scan);

    assert_eq!(load_config.call(()).len(), 2);
    assert_eq!(scan.call(3).count(), 3);

    let report = registry.report();
    let names: Vec<_> = report.metrics().map(|metric| metric.name()).collect();

    assert_eq!(
        names,
        vec!["integration_tests.load_config", "integration_tests.scan"]
    );
}

struct Library {
    books: Vec<&'static str>,
}

impl Library {
    fn titles(&self, (): ()) -> std::slice::Iter<'_, &'static str> {
        self.books.iter()
    }
}

#[test]
fn decorated_methods_named_after_receiver_type() {
    let registry = Registry::new();
    let decorator = Instrument::builder().sink(registry.sink()).build().decorator();

    let titles = decorator.method::<All, _>("titles", Library::titles);
    let library = Library {
        books: vec!["Dune", "Emma"],
    };

    assert_eq!(titles.bind(&library).call(()).count(), 2);

    let report = registry.report();
    let metric = report
        .metric("integration_tests.Library.titles")
        .expect("metric was recorded");
    assert_eq!(metric.total_count(), 2);
}

#[test]
fn explicit_name_applies_to_every_decorated_unit() {
    let registry = Registry::new();
    let decorator = instrument("config", &registry).decorator();

    let first = decorator.function::<Each, _>(unit_name!(scan), scan);
    let second = decorator.function::<Each, _>(unit_name!(scan), |limit: u32| 0..limit * 2);

    assert_eq!(first.call(2).count(), 2);
    assert_eq!(second.call(2).count(), 4);

    let report = registry.report();
    assert_eq!(report.metrics().count(), 1);
    assert_eq!(report.metric("config").map(|m| m.samples()), Some(6));
}
