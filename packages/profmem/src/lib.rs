#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Reports on a single function call: peak process memory, elapsed time and, optionally, a
//! call-graph profile of everything the call did.
//!
//! The package offers two wrappers:
//!
//! - [`MemoryUsage`] - reports the elapsed seconds and the peak resident memory of the process
//!   before and after every call.
//! - [`ProfiledMemoryUsage`] - runs every call under a fresh [`Profile`] session and reports the
//!   sorted [`Stats`] of that call, followed by the same memory readings.
//!
//! Both are also available as attribute macros that keep the signature of the annotated
//! function: [`#[memory_usage]`][macro@memory_usage] and
//! [`#[profile_with_memory_usage]`][macro@profile_with_memory_usage].
//!
//! This package is not meant for use in production, serving only as a development tool.
//!
//! # Memory usage
//!
//! ```
//! use profmem::memory_usage;
//!
//! fn load(count: usize) -> Vec<u64> {
//!     (0..count as u64).collect()
//! }
//!
//! let load = memory_usage(load);
//! let values = load.call((10_000,));
//! assert_eq!(values.len(), 10_000);
//! ```
//!
//! Prints:
//!
//! ```text
//! Ran memory_usage to load in 0 seconds
//! Initial RAM: 11.2 MiB
//! Final RAM: 11.3 MiB
//! ```
//!
//! The memory figures are the high-water mark of the resident memory of the whole process,
//! formatted by [`format_size()`].
//!
//! # Profiling
//!
//! There is no runtime hook that observes every function call in Rust, so functions opt in to
//! being measured with [`#[profiled]`][macro@profiled] or [`profile_scope!`]. The wrapped function
//! itself is always measured.
//!
//! ```
//! #[profmem::profiled]
//! fn parse(line: &str) -> usize {
//!     line.split(',').count()
//! }
//!
//! #[profmem::profile_with_memory_usage(sort_key = "calls")]
//! fn parse_all(lines: &[&str]) -> usize {
//!     lines.iter().map(|line| parse(line)).sum()
//! }
//!
//! assert_eq!(parse_all(&["a,b", "c"]), 3);
//! ```
//!
//! Prints:
//!
//! ```text
//!          3 function calls in 0.000 seconds
//!
//!    Ordered by: call count
//!
//!    ncalls  tottime  percall  cumtime  percall filename:lineno(function)
//!         2    0.000    0.000    0.000    0.000 lib.rs:2(parse)
//!         1    0.000    0.000    0.000    0.000 lib.rs:7(parse_all)
//!
//!
//! Ran profile_with_memory_usage to parse_all
//! Initial RAM: 11.2 MiB
//! Final RAM: 11.2 MiB
//! ```
//!
//! The rows can be ordered by any [`SortKey`]: cumulative time (the default), call count,
//! standard name or internal time.
//!
//! # Threading
//!
//! The wrapped function runs on the calling thread and a profiling session only observes that
//! thread. Concurrent calls of the same wrapper each get their own session and their reports
//! are written to the output sink whole, never interleaved.

mod error;
mod format;
mod function_id;
mod invoke;
mod macros;
mod memory_usage;
mod pal;
mod profile;
mod profiled;
mod report;
mod sort_key;
mod stats;

#[doc(hidden)]
pub mod __private;

pub use error::{Error, Result};
pub use format::format_size;
pub use function_id::FunctionId;
pub use invoke::Invoke;
pub use memory_usage::{MemoryUsage, memory_usage};
pub use profile::{Profile, ProfiledScope, enter};
pub use profiled::{
    ProfileDecorator, ProfiledMemoryUsage, profile_with_memory_usage,
    try_profile_with_memory_usage,
};
pub use report::{MemoryReadings, MemoryUsageReport, ProfileReport};
pub use sort_key::{CALLS, CUMULATIVE, STDNAME, SortKey, TIME};
pub use stats::{FunctionStats, Stats};

/// Reports elapsed time and peak process memory around every call of the annotated function.
///
/// The function keeps its signature. Each call writes three lines to standard output, see
/// [`MemoryUsage`]. Panics if the peak memory of the process cannot be determined.
///
/// # Examples
///
/// ```
/// #[profmem::memory_usage]
/// fn compress(data: &[u8]) -> usize {
///     data.len() / 2
/// }
///
/// assert_eq!(compress(&[0; 64]), 32);
/// ```
///
/// The name used in the report can be overridden:
///
/// ```
/// #[profmem::memory_usage(name = "warm-up")]
/// fn prepare() {}
///
/// prepare();
/// ```
pub use profmem_macros::__macro_memory_usage as memory_usage;

/// Runs every call of the annotated function under a fresh profiling session and reports the
/// statistics table and peak process memory.
///
/// The function keeps its signature. The optional `sort_key` is one of `"cumulative"` (the
/// default), `"calls"`, `"stdname"` or `"time"`; any other value is a compile error. Each call
/// writes its report to standard output, see [`ProfiledMemoryUsage`]. Panics if the peak memory
/// of the process cannot be determined.
///
/// # Examples
///
/// ```
/// #[profmem::profile_with_memory_usage(sort_key = "time")]
/// fn greet(name: &str) -> String {
///     format!("hello {name}")
/// }
///
/// assert_eq!(greet("world"), "hello world");
/// ```
pub use profmem_macros::__macro_profile_with_memory_usage as profile_with_memory_usage;

/// Measures the annotated function whenever a profiling session is active on the calling thread.
///
/// Equivalent to starting the function body with [`profile_scope!()`][profile_scope]. Without a
/// session, the cost is a thread-local lookup. The name can be overridden with
/// `#[profiled(name = "..")]`.
///
/// Not supported on `async` or `const` functions.
///
/// # Examples
///
/// ```
/// #[profmem::profiled]
/// fn tokenize(text: &str) -> Vec<&str> {
///     text.split_whitespace().collect()
/// }
///
/// let tokens = profmem::ProfiledMemoryUsage::new(|| tokenize("a b c").len());
/// assert_eq!(tokens.call(()), 3);
/// ```
pub use profmem_macros::__macro_profiled as profiled;

// This is so procedural macros can produce code which refers to
// ::profmem::* which will work also in the current crate.
#[doc(hidden)]
extern crate self as profmem;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
