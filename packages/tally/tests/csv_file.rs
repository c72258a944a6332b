//! Writing measurements to CSV files on disk.

use std::fs;

use tally::{CsvSink, FanOut, Instrument, Registry};

#[test]
fn instruments_share_one_csv_file() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("out").join("metrics.csv");

    let sink = CsvSink::create(&path).expect("file can be created");
    let registry = Registry::new();
    let fan_out = FanOut::new().with(sink.clone()).with(registry.sink());

    let parse = Instrument::builder()
        .name("parse")
        .sink(fan_out.clone())
        .build();
    let render = Instrument::builder().name("render").sink(fan_out).build();

    assert_eq!(parse.all(["a", "b"]).count(), 2);
    assert_eq!(render.produce(|| vec![1, 2, 3]).len(), 3);

    // Unnamed measurements are dropped by the CSV sink.
    Instrument::builder().sink(sink.clone()).build().call(|| ());

    sink.close().expect("sink is open");

    let written = fs::read_to_string(&path).expect("file is readable");
    let rows: Vec<_> = written
        .lines()
        .map(|line| line.split(',').take(2).collect::<Vec<_>>().join(","))
        .collect();

    assert_eq!(rows, vec!["parse,2", "render,3"]);
    assert_eq!(registry.report().metrics().count(), 2);
}
