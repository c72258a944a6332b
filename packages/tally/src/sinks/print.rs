use std::time::Duration;

/// Sink that prints each measurement to stdout.
///
/// The output looks like `load_rows: 3 items in 0.25 seconds`, or `3 items in 0.25 seconds`
/// for an unnamed metric.
#[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
pub fn print_metric(name: Option<&str>, count: u64, elapsed: Duration) {
    println!("{}", format_metric(name, count, elapsed));
}

pub(crate) fn format_metric(name: Option<&str>, count: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();

    match name {
        Some(name) => format!("{name}: {count} items in {seconds:.2} seconds"),
        None => format!("{count} items in {seconds:.2} seconds"),
    }
}
