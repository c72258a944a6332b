use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::{ERR_POISONED_LOCK, Error, Sink};

/// Sink that writes the measurements of each metric to a CSV file of its own.
///
/// The file of a metric is `{name}.csv` inside the sink's directory and holds one
/// `count,elapsed` row per measurement, with the elapsed time in seconds with six decimal
/// places. Path separators in a name are replaced with `_`. Files are created on the first
/// measurement of each name. Unnamed measurements have no file to go to, so they are dropped
/// with a warning.
///
/// Like [`CsvSink`][crate::CsvSink], the first I/O error is retained and returned by the next
/// call to [`flush()`][Self::flush] or [`close()`][Self::close], and clones share the same
/// directory and open files.
///
/// # Examples
///
/// ```
/// use tally::{CsvDirSink, Instrument};
///
/// let dir = std::env::temp_dir().join("tally_csv_dir_example");
/// let sink = CsvDirSink::create(&dir).unwrap();
///
/// let instrument = Instrument::builder()
///     .name("parse")
///     .sink(sink.clone())
///     .build();
/// instrument.all([1, 2, 3]).for_each(drop);
///
/// sink.close().unwrap();
///
/// let rows = std::fs::read_to_string(dir.join("parse.csv")).unwrap();
/// assert!(rows.starts_with("3,"));
/// ```
#[derive(Clone)]
pub struct CsvDirSink {
    state: Arc<Mutex<DirState>>,
}

struct DirState {
    dir: PathBuf,
    // None once closed.
    files: Option<HashMap<String, BufWriter<File>>>,
    error: Option<io::Error>,
}

impl CsvDirSink {
    /// Creates a sink writing into the directory at `dir`.
    ///
    /// Any existing directory at `dir` is removed along with its contents, then created anew
    /// together with any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the old directory cannot be removed or the new one cannot be
    /// created.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        match fs::remove_dir_all(dir) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => return Err(error.into()),
            _ => {}
        }

        fs::create_dir_all(dir)?;

        Ok(Self {
            state: Arc::new(Mutex::new(DirState {
                dir: dir.to_path_buf(),
                files: Some(HashMap::new()),
                error: None,
            })),
        })
    }

    /// The directory the metric files are written to.
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.state.lock().expect(ERR_POISONED_LOCK).dir.clone()
    }

    /// Flushes the rows written so far to every metric file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if an earlier row or file could not be written or flushing
    /// fails, and [`Error::Closed`] if the sink has been closed.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if let Some(error) = state.error.take() {
            return Err(error.into());
        }

        let files = state.files.as_mut().ok_or(Error::Closed)?;

        for writer in files.values_mut() {
            writer.flush()?;
        }

        Ok(())
    }

    /// Flushes and closes every metric file. Later measurements are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a row or file could not be written or flushing fails, and
    /// [`Error::Closed`] if the sink has already been closed.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        let files = state.files.take().ok_or(Error::Closed)?;

        if let Some(error) = state.error.take() {
            return Err(error.into());
        }

        for (_, mut writer) in files {
            writer.flush()?;
        }

        Ok(())
    }
}

impl DirState {
    fn write_row(&mut self, name: &str, count: u64, elapsed: Duration) -> io::Result<()> {
        let Some(files) = self.files.as_mut() else {
            tracing::warn!(metric = name, "dropping metric recorded after the CSV sink was closed");
            return Ok(());
        };

        let writer = match files.entry(name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.dir.join(format!("{}.csv", file_stem(name)));
                tracing::debug!(metric = name, path = %path.display(), "creating metric file");

                entry.insert(BufWriter::new(File::create(path)?))
            }
        };

        writeln!(writer, "{count},{:.6}", elapsed.as_secs_f64())
    }
}

impl Sink for CsvDirSink {
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        let Some(name) = name else {
            tracing::warn!(count, "dropping unnamed metric: CSV files require a name");
            return;
        };

        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if state.error.is_some() {
            return;
        }

        if let Err(error) = state.write_row(name, count, elapsed) {
            state.error = Some(error);
        }
    }
}

impl fmt::Debug for CsvDirSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().expect(ERR_POISONED_LOCK);

        f.debug_struct("CsvDirSink")
            .field("dir", &state.dir)
            .field("closed", &state.files.is_none())
            .finish_non_exhaustive()
    }
}

fn file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
