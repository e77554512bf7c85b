use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::function_id::short_type_name;
use crate::pal::{Platform, PlatformFacade};
use crate::report::{read_peak_memory, write_report};
use crate::{ERR_POISONED_LOCK, Invoke, MemoryReadings, MemoryUsageReport, Result};

/// Wraps `function` so that every call reports elapsed time and peak process memory.
///
/// Shorthand for [`MemoryUsage::new()`].
///
/// # Examples
///
/// ```
/// use profmem::memory_usage;
///
/// fn build_index(words: &[&str]) -> usize {
///     words.len()
/// }
///
/// let build_index = memory_usage(build_index);
///
/// // Prints:
/// // Ran memory_usage to build_index in 0 seconds
/// // Initial RAM: 11.2 MiB
/// // Final RAM: 11.2 MiB
/// assert_eq!(build_index.call((&["a", "b"][..],)), 2);
/// ```
pub fn memory_usage<F>(function: F) -> MemoryUsage<F> {
    MemoryUsage::new(function)
}

/// A function wrapped to report elapsed time and peak process memory around every call.
///
/// Each call writes three lines to the output sink (standard output unless
/// [`output()`][Self::output] says otherwise):
///
/// ```text
/// Ran memory_usage to build_index in 2 seconds
/// Initial RAM: 12.5 MiB
/// Final RAM: 40.1 MiB
/// ```
///
/// The memory figures are the peak resident set size of the whole process, so "Final RAM" only
/// grows past "Initial RAM" if the call pushed the process to a new high-water mark.
///
/// Arguments are passed to [`call()`][Self::call] as a tuple, see [`Invoke`]. If the wrapped
/// function panics, the panic propagates and nothing is reported for that call.
///
/// # Examples
///
/// Capturing the report in a buffer instead of printing it:
///
/// ```
/// use profmem::MemoryUsage;
///
/// let wrapped = MemoryUsage::new(|a: u32, b: u32| a * b)
///     .name("multiply")
///     .output(Vec::new());
///
/// assert_eq!(wrapped.call((6, 7)), 42);
///
/// let output = String::from_utf8(wrapped.into_output()).unwrap();
/// assert!(output.starts_with("Ran memory_usage to multiply in 0 seconds"));
/// assert_eq!(output.lines().count(), 3);
/// ```
#[derive(Debug)]
pub struct MemoryUsage<F, W = io::Stdout> {
    function: F,
    name: Cow<'static, str>,
    output: Mutex<W>,
    platform: PlatformFacade,
}

impl<F> MemoryUsage<F> {
    /// Wraps `function`, reporting to standard output under the short name of its type.
    ///
    /// For a function item this is the function's own name; a closure is named after the
    /// function that defines it. Use [`name()`][Self::name] to pick something else.
    #[must_use]
    pub fn new(function: F) -> Self {
        Self {
            function,
            name: Cow::Borrowed(short_type_name::<F>()),
            output: Mutex::new(io::stdout()),
            platform: PlatformFacade::real(),
        }
    }
}

impl<F, W> MemoryUsage<F, W> {
    /// Sets the name the report uses for the wrapped function.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sends reports to `output` instead of the current sink.
    #[must_use]
    pub fn output<W2>(self, output: W2) -> MemoryUsage<F, W2> {
        MemoryUsage {
            function: self.function,
            name: self.name,
            output: Mutex::new(output),
            platform: self.platform,
        }
    }

    /// The name the report uses for the wrapped function.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Unwraps the output sink, e.g. to inspect a buffer that captured the reports.
    #[must_use]
    pub fn into_output(self) -> W {
        self.output.into_inner().expect(ERR_POISONED_LOCK)
    }

    #[cfg(test)]
    pub(crate) fn with_platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }
}

impl<F, W: Write> MemoryUsage<F, W> {
    /// Calls the wrapped function with `args` and reports on the call.
    ///
    /// # Panics
    ///
    /// Panics if the peak memory of the process cannot be determined on this platform or the
    /// report cannot be written. Use [`try_call()`][Self::try_call] to handle these cases.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Invoke<Args>,
    {
        self.try_call(args)
            .unwrap_or_else(|error| panic!("memory usage of {}: {error}", self.name))
    }

    /// Calls the wrapped function with `args` and reports on the call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryUnavailable`][crate::Error::MemoryUnavailable] if the peak memory
    /// of the process cannot be determined and [`Error::Output`][crate::Error::Output] if the
    /// report cannot be written. If the first memory reading fails, the wrapped function is not
    /// called at all. If a later step fails, the wrapped function has already run and its return
    /// value is dropped.
    pub fn try_call<Args>(&self, args: Args) -> Result<F::Output>
    where
        F: Invoke<Args>,
    {
        measure(&self.platform, &self.name, &self.output, || {
            self.function.invoke(args)
        })
    }
}

/// Runs `f` and writes a [`MemoryUsageReport`] about it to `output`.
pub(crate) fn measure<R, W: Write>(
    platform: &PlatformFacade,
    name: &str,
    output: &Mutex<W>,
    f: impl FnOnce() -> R,
) -> Result<R> {
    let started = platform.now();
    let memory_before = read_peak_memory(platform)?;

    let result = f();

    let finished = platform.now();
    let memory_after = read_peak_memory(platform)?;

    let report = MemoryUsageReport::new(
        name,
        finished.saturating_duration_since(started),
        MemoryReadings::new(memory_before, memory_after),
    );

    write_report(output, &report)?;

    Ok(result)
}
