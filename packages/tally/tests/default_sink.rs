//! The process-wide default sink is global state, so it is exercised in its own test binary.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tally::{Instrument, reset_default_sink, set_default_sink};

#[test]
fn instruments_without_sink_follow_default_sink() {
    let records = Arc::new(Mutex::new(Vec::new()));

    set_default_sink({
        let records = Arc::clone(&records);
        move |name: Option<&str>, count: u64, _elapsed: Duration| {
            records
                .lock()
                .expect("test lock")
                .push((name.map(str::to_owned), count));
        }
    });

    // Created before the next replacement, so the lookup must happen per measurement.
    let instrument = Instrument::builder().name("defaulted").build();
    let sum: u32 = instrument.all([1, 2, 3]).sum();
    assert_eq!(sum, 6);

    reset_default_sink();
    instrument.call(|| ());

    assert_eq!(
        *records.lock().expect("test lock"),
        vec![(Some("defaulted".to_owned()), 3)]
    );
}
