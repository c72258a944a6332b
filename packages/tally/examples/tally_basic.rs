//! Example demonstrating the main `tally` measurement styles working together.
//!
//! Measurements go both to the log (via `tracing`) and to a statistics registry whose
//! report is printed at the end.
//!
//! Run with: `cargo run --example tally_basic`.

use std::thread;
use std::time::Duration;

use tally::strategies::{All, Produce};
use tally::{FanOut, Instrument, LogSink, Registry, unit_name};

fn read_lines() -> impl Iterator<Item = String> {
    (1..=5).map(|number| {
        thread::sleep(Duration::from_millis(5));
        format!("line {number}")
    })
}

fn load_users() -> Vec<&'static str> {
    thread::sleep(Duration::from_millis(20));
    vec!["ada", "grace", "linus"]
}

fn main() {
    println!("=== Item Timing Example ===");
    println!();

    let registry = Registry::new();
    let sink = FanOut::new().with(LogSink::default()).with(registry.sink());

    // Measure iterators inline.
    let lines = Instrument::builder()
        .name("read_lines")
        .sink(sink.clone())
        .build();

    for line in lines.all(read_lines()) {
        println!("Read {line}");
    }

    let mut first = lines.first(read_lines());
    if let Some(line) = first.next() {
        println!("First line arrived: {line}");
    }
    println!();

    // Decorate functions once, call them many times.
    let decorator = Instrument::builder().sink(sink.clone()).build().decorator();
    let load_users = decorator.function::<Produce, _>(unit_name!(load_users), |()| load_users());
    let read_all = decorator.function::<All, _>(unit_name!(read_lines), |()| read_lines());

    for _ in 0..3 {
        println!("Loaded {} users", load_users.call(()).len());
    }
    println!("Read {} lines", read_all.call(()).count());
    println!();

    // Measure a block of code with a count known only at the end.
    let batch = Instrument::builder().name("batch").sink(sink).build();
    {
        let mut span = batch.block();
        let processed = (0..1000_u64).filter(|n| n % 7 == 0).count();
        span.set_count(u64::try_from(processed).unwrap_or(u64::MAX));
    }

    match registry.close() {
        Ok(report) => report.print_to_stdout(),
        Err(error) => eprintln!("Could not produce report: {error}"),
    }
}
