//! Helpers shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::{FakePlatform, PlatformFacade};
use crate::{Instrument, Sink};

/// One call to a sink, with the name converted to an owned string for easy comparison.
pub(crate) type Record = (Option<String>, u64, Duration);

/// Sink that remembers every call made to it, in order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Recorder {
    records: Arc<Mutex<Vec<Record>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .expect("Recorder lock should not be poisoned")
            .clone()
    }
}

impl Sink for Recorder {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        self.records
            .lock()
            .expect("Recorder lock should not be poisoned")
            .push((name.map(str::to_owned), count, elapsed));
    }
}

/// Creates a named instrument that reports to `recorder` and reads time from a fake clock.
///
/// The returned clock shares its state with the one inside the instrument.
pub(crate) fn fake_instrument(
    name: &'static str,
    recorder: &Recorder,
) -> (Instrument<Recorder>, FakePlatform) {
    let clock = FakePlatform::new();

    let instrument = Instrument::builder()
        .name(name)
        .sink(recorder.clone())
        .platform(PlatformFacade::fake(clock.clone()))
        .build();

    (instrument, clock)
}

/// Yields the items of `items`, advancing `clock` by `step` while producing each one.
///
/// Discovering that there are no more items takes no time.
pub(crate) fn ticking<I>(
    clock: &FakePlatform,
    step: Duration,
    items: I,
) -> impl Iterator<Item = I::Item> + use<I>
where
    I: IntoIterator,
{
    let clock = clock.clone();

    items.into_iter().map(move |item| {
        clock.advance(step);
        item
    })
}
