use std::borrow::Cow;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::Mutex;

use crate::function_id::short_type_name;
use crate::pal::PlatformFacade;
use crate::report::{read_peak_memory, write_report};
use crate::{
    ERR_POISONED_LOCK, FunctionId, Invoke, MemoryReadings, Profile, ProfileReport, Result, SortKey,
};

/// Creates a decorator that wraps functions to be profiled with the rows ordered by `sort_key`.
///
/// # Examples
///
/// ```
/// use profmem::{SortKey, profile_with_memory_usage};
///
/// fn render() -> &'static str {
///     "hello"
/// }
///
/// let render = profile_with_memory_usage(SortKey::Calls).wrap(render);
///
/// // Prints the statistics table followed by:
/// // Ran profile_with_memory_usage to render
/// // Initial RAM: 11.2 MiB
/// // Final RAM: 11.2 MiB
/// assert_eq!(render.call(()), "hello");
/// ```
#[must_use]
pub fn profile_with_memory_usage(sort_key: SortKey) -> ProfileDecorator {
    ProfileDecorator { sort_key }
}

/// Creates a decorator from the string tag of a sort key, e.g. `"stdname"`.
///
/// # Errors
///
/// Returns [`Error::InvalidSortKey`][crate::Error::InvalidSortKey] if `sort_key` is not one of
/// [`CUMULATIVE`][crate::CUMULATIVE], [`CALLS`][crate::CALLS], [`STDNAME`][crate::STDNAME] or
/// [`TIME`][crate::TIME].
pub fn try_profile_with_memory_usage(sort_key: &str) -> Result<ProfileDecorator> {
    Ok(profile_with_memory_usage(sort_key.parse()?))
}

/// Wraps functions into [`ProfiledMemoryUsage`] with a preselected sort key.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileDecorator {
    sort_key: SortKey,
}

impl ProfileDecorator {
    /// The sort key given to every wrapper this decorator creates.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Wraps `function`, reporting to standard output.
    ///
    /// The caller's source location becomes the location of the root row in the statistics.
    #[must_use]
    #[track_caller]
    pub fn wrap<F>(self, function: F) -> ProfiledMemoryUsage<F> {
        ProfiledMemoryUsage::new(function).sort_key(self.sort_key)
    }
}

/// A function wrapped to run under a fresh profiling session on every call, reporting the
/// sorted statistics and peak process memory.
///
/// Each call writes the statistics table of that call alone (see [`Stats`][crate::Stats]),
/// then a line naming the function and the two memory lines:
///
/// ```text
///          1 function calls in 0.000 seconds
///
///    Ordered by: cumulative time
///
///    ncalls  tottime  percall  cumtime  percall filename:lineno(function)
///         1    0.000    0.000    0.000    0.000 main.rs:12(render)
///
///
/// Ran profile_with_memory_usage to render
/// Initial RAM: 11.2 MiB
/// Final RAM: 11.2 MiB
/// ```
///
/// The wrapped function is always measured as the root row. Functions it calls appear in the
/// table if they are instrumented with [`#[profmem::profiled]`][macro@crate::profiled] or
/// [`profile_scope!`][crate::profile_scope]. Only work done on the calling thread is seen, so
/// concurrent calls never observe each other.
///
/// If the wrapped function panics, the panic propagates and nothing is reported for that call.
#[derive(Debug)]
pub struct ProfiledMemoryUsage<F, W = io::Stdout> {
    function: F,
    root: FunctionId,
    sort_key: SortKey,
    output: Mutex<W>,
    platform: PlatformFacade,
}

impl<F> ProfiledMemoryUsage<F> {
    /// Wraps `function` with the default sort key, reporting to standard output.
    ///
    /// The root row is named after the short name of the function's type and located at the
    /// caller's source position.
    #[must_use]
    #[track_caller]
    pub fn new(function: F) -> Self {
        Self {
            function,
            root: FunctionId::at(Location::caller(), short_type_name::<F>()),
            sort_key: SortKey::default(),
            output: Mutex::new(io::stdout()),
            platform: PlatformFacade::real(),
        }
    }
}

impl<F, W> ProfiledMemoryUsage<F, W> {
    /// Sets the name of the root row and of the summary line.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.root = FunctionId::new(self.root.file(), self.root.line(), name);
        self
    }

    /// Sets the order of the rows in the statistics table.
    #[must_use]
    pub fn sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Sends reports to `output` instead of the current sink.
    #[must_use]
    pub fn output<W2>(self, output: W2) -> ProfiledMemoryUsage<F, W2> {
        ProfiledMemoryUsage {
            function: self.function,
            root: self.root,
            sort_key: self.sort_key,
            output: Mutex::new(output),
            platform: self.platform,
        }
    }

    /// The identity of the root row in the statistics table.
    #[must_use]
    pub fn function_id(&self) -> &FunctionId {
        &self.root
    }

    /// The name the report uses for the wrapped function.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.root.name()
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

impl<F, W: Write> ProfiledMemoryUsage<F, W> {
    /// Calls the wrapped function with `args` under a fresh profiling session and reports on it.
    ///
    /// # Panics
    ///
    /// Panics if the peak memory of the process cannot be determined on this platform or the
    /// report cannot be written. Use [`try_call()`][Self::try_call] to handle these cases.
    pub fn call<Args>(&self, args: Args) -> F::Output
    where
        F: Invoke<Args>,
    {
        self.try_call(args).unwrap_or_else(|error| {
            panic!("profile with memory usage of {}: {error}", self.root.name())
        })
    }

    /// Calls the wrapped function with `args` under a fresh profiling session and reports on it.
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
        profile(
            &self.platform,
            &self.root,
            self.sort_key,
            &self.output,
            || self.function.invoke(args),
        )
    }
}

/// Runs `f` as `root` under a fresh profiling session and writes a [`ProfileReport`] to `output`.
pub(crate) fn profile<R, W: Write>(
    platform: &PlatformFacade,
    root: &FunctionId,
    sort_key: SortKey,
    output: &Mutex<W>,
    f: impl FnOnce() -> R,
) -> Result<R> {
    let session = Profile::with_platform(platform.clone());

    let memory_before = read_peak_memory(platform)?;
    let result = session.run(root.clone(), f);
    let memory_after = read_peak_memory(platform)?;

    let stats = session.into_stats().strip_dirs().sort_by(sort_key);

    let report = ProfileReport::new(
        root.name(),
        stats,
        MemoryReadings::new(memory_before, memory_after),
    );

    write_report(output, &report)?;

    Ok(result)
}
