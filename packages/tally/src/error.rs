use std::io;

use thiserror::Error;

/// Errors that can occur when writing or finalizing measurements.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Writing measurements to their destination failed.
    ///
    /// Sinks cannot fail while recording, so the first failure is retained and returned by
    /// the next call that finalizes output, such as [`CsvSink::flush()`][crate::CsvSink::flush].
    #[error("failed to write measurements: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// The sink or registry was already closed and cannot produce further output.
    #[error("already closed")]
    Closed,
}

/// A specialized `Result` type for tally operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn io_error_converts() {
        let error = Error::from(io::Error::new(io::ErrorKind::WriteZero, "disk full"));

        assert!(matches!(error, Error::Io { .. }));
        assert_eq!(error.to_string(), "failed to write measurements: disk full");
    }

    #[test]
    fn closed_is_error() {
        let result: Result<()> = Err(Error::Closed);
        assert!(result.is_err());
    }
}
