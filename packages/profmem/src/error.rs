use std::io;

use thiserror::Error;

/// Errors that can occur when configuring or invoking an instrumented function.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for a profiling sort key that does not exist.
    #[error(
        "invalid sort key '{value}': expected one of 'cumulative', 'calls', 'stdname' or 'time'"
    )]
    InvalidSortKey {
        /// The value that was provided instead of a valid sort key.
        value: String,
    },

    /// The operating system could not tell us the peak resident memory of the process.
    ///
    /// Either the build target has no supported way to query it or the query itself failed.
    #[error("peak resident memory of the process is not available: {0}")]
    MemoryUnavailable(#[source] io::Error),

    /// The report could not be written to the output sink.
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

/// A specialized `Result` type for profmem operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
