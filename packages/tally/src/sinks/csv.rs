use std::borrow::Cow;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::{ERR_POISONED_LOCK, Error, Sink};

/// Sink that writes each measurement as a CSV row of `name,count,elapsed`.
///
/// The elapsed time is written in seconds with six decimal places. Names that contain
/// commas, quotes or line breaks are quoted. Unnamed measurements cannot be told apart in
/// the output, so they are dropped with a warning.
///
/// Recording cannot fail, so the first I/O error is retained and returned by the next call
/// to [`flush()`][Self::flush] or [`close()`][Self::close]. Rows recorded after an I/O error
/// are not written.
///
/// Clones share the same destination, which makes a single sink usable from any number of
/// instruments and threads.
///
/// # Examples
///
/// ```
/// use tally::{CsvSink, Instrument};
///
/// let sink = CsvSink::new(Vec::new());
/// let instrument = Instrument::builder()
///     .name("fetch")
///     .sink(sink.clone())
///     .build();
///
/// let pages: Vec<_> = instrument.all(["index.html", "about.html"]).collect();
/// assert_eq!(pages.len(), 2);
///
/// let output = String::from_utf8(sink.close().unwrap()).unwrap();
/// assert!(output.starts_with("fetch,2,"));
/// ```
pub struct CsvSink<W>
where
    W: Write,
{
    state: Arc<Mutex<CsvState<W>>>,
}

struct CsvState<W> {
    // None once closed.
    writer: Option<W>,
    error: Option<io::Error>,
}

impl CsvSink<BufWriter<File>> {
    /// Creates a sink writing to the file at `path`.
    ///
    /// Missing parent directories are created and an existing file is truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directories or the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }

        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W> CsvSink<W>
where
    W: Write,
{
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            state: Arc::new(Mutex::new(CsvState {
                writer: Some(writer),
                error: None,
            })),
        }
    }

    /// Flushes the rows written so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if an earlier row could not be written or flushing fails, and
    /// [`Error::Closed`] if the sink has been closed.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if let Some(error) = state.error.take() {
            return Err(error.into());
        }

        let writer = state.writer.as_mut().ok_or(Error::Closed)?;
        writer.flush()?;

        Ok(())
    }

    /// Flushes all rows and hands back the writer. Later measurements are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a row could not be written or flushing fails, and
    /// [`Error::Closed`] if the sink has already been closed.
    pub fn close(&self) -> Result<W> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        let mut writer = state.writer.take().ok_or(Error::Closed)?;

        if let Some(error) = state.error.take() {
            return Err(error.into());
        }

        writer.flush()?;

        Ok(writer)
    }
}

impl<W> Sink for CsvSink<W>
where
    W: Write,
{
    fn record(&self, name: Option<&str>, count: u64, elapsed: Duration) {
        let Some(name) = name else {
            tracing::warn!(count, "dropping unnamed metric: CSV rows require a name");
            return;
        };

        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        let state = &mut *state;

        if state.error.is_some() {
            return;
        }

        let Some(writer) = state.writer.as_mut() else {
            tracing::warn!(metric = name, "dropping metric recorded after the CSV sink was closed");
            return;
        };

        if let Err(error) = writeln!(
            writer,
            "{},{count},{:.6}",
            escape_field(name),
            elapsed.as_secs_f64()
        ) {
            state.error = Some(error);
        }
    }
}

impl<W> Clone for CsvSink<W>
where
    W: Write,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<W> fmt::Debug for CsvSink<W>
where
    W: Write,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvSink").finish_non_exhaustive()
    }
}

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
