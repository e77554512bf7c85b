//! Reports written by the instrumentation wrappers.

use std::fmt::{self, Display};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use crate::format::format_memory;
use crate::pal::{Platform, PlatformFacade};
use crate::{ERR_POISONED_LOCK, Error, Result, Stats};

/// Peak resident memory of the process before and after an instrumented call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryReadings {
    before: u64,
    after: u64,
}

impl MemoryReadings {
    pub(crate) fn new(before: u64, after: u64) -> Self {
        Self { before, after }
    }

    /// Peak resident memory in bytes when the call started.
    #[must_use]
    pub fn before(&self) -> u64 {
        self.before
    }

    /// Peak resident memory in bytes when the call returned.
    #[must_use]
    pub fn after(&self) -> u64 {
        self.after
    }
}

impl Display for MemoryReadings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Initial RAM: {}", format_memory(self.before))?;
        writeln!(f, "Final RAM: {}", format_memory(self.after))
    }
}

/// What [`MemoryUsage`][crate::MemoryUsage] reports about one call.
///
/// ```text
/// Ran memory_usage to build_index in 2 seconds
/// Initial RAM: 12.5 MiB
/// Final RAM: 40.1 MiB
/// ```
#[derive(Clone, Debug)]
pub struct MemoryUsageReport {
    function_name: String,
    elapsed: Duration,
    memory: MemoryReadings,
}

impl MemoryUsageReport {
    pub(crate) fn new(function_name: &str, elapsed: Duration, memory: MemoryReadings) -> Self {
        Self {
            function_name: function_name.to_string(),
            elapsed,
            memory,
        }
    }

    /// The display name of the function that was called.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Wall-clock time the call took.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Peak memory readings around the call.
    #[must_use]
    pub fn memory(&self) -> MemoryReadings {
        self.memory
    }
}

impl Display for MemoryUsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whole seconds only, truncated.
        writeln!(
            f,
            "Ran memory_usage to {} in {} seconds",
            self.function_name,
            self.elapsed.as_secs()
        )?;
        write!(f, "{}", self.memory)
    }
}

/// What [`ProfiledMemoryUsage`][crate::ProfiledMemoryUsage] reports about one call: the
/// profiling statistics table followed by the memory readings.
#[derive(Clone, Debug)]
pub struct ProfileReport {
    function_name: String,
    stats: Stats,
    memory: MemoryReadings,
}

impl ProfileReport {
    pub(crate) fn new(function_name: &str, stats: Stats, memory: MemoryReadings) -> Self {
        Self {
            function_name: function_name.to_string(),
            stats,
            memory,
        }
    }

    /// The display name of the function that was called.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// The sorted profiling statistics of the call.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Peak memory readings around the call.
    #[must_use]
    pub fn memory(&self) -> MemoryReadings {
        self.memory
    }
}

impl Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stats)?;
        writeln!(f, "Ran profile_with_memory_usage to {}", self.function_name)?;
        write!(f, "{}", self.memory)
    }
}

pub(crate) fn read_peak_memory(platform: &PlatformFacade) -> Result<u64> {
    platform
        .peak_resident_bytes()
        .map_err(Error::MemoryUnavailable)
}

/// Writes a whole report to the sink at once, so concurrent callers never interleave lines.
pub(crate) fn write_report<W: Write>(output: &Mutex<W>, report: &impl Display) -> Result<()> {
    let rendered = report.to_string();

    let mut output = output.lock().expect(ERR_POISONED_LOCK);
    output
        .write_all(rendered.as_bytes())
        .and_then(|()| output.flush())
        .map_err(Error::Output)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use super::*;
    use crate::pal::FakePlatform;

    #[test]
    fn memory_usage_report_has_three_lines() {
        let report = MemoryUsageReport::new(
            "work",
            Duration::from_millis(2999),
            MemoryReadings::new(2048, 20 * 1024),
        );

        assert_eq!(
            report.to_string(),
            "Ran memory_usage to work in 2 seconds\nInitial RAM: 2048 B\nFinal RAM: 20.0 KiB\n"
        );
        assert_eq!(report.function_name(), "work");
        assert_eq!(report.elapsed(), Duration::from_millis(2999));
        assert_eq!(report.memory().before(), 2048);
        assert_eq!(report.memory().after(), 20 * 1024);
    }

    #[test]
    fn profile_report_ends_with_summary_and_memory() {
        let report = ProfileReport::new(
            "work",
            Stats::new(Vec::new()),
            MemoryReadings::new(0, 100 * 1024),
        );

        let rendered = report.to_string();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(
            lines.get(lines.len() - 3..).unwrap(),
            [
                "Ran profile_with_memory_usage to work",
                "Initial RAM: 0 B",
                "Final RAM: 100 KiB",
            ]
        );
        assert!(report.stats().is_empty());
    }

    #[test]
    fn unavailable_memory_maps_to_error() {
        let platform = FakePlatform::new();
        platform.make_memory_unavailable();

        let error = read_peak_memory(&PlatformFacade::fake(platform)).unwrap_err();

        assert!(matches!(error, Error::MemoryUnavailable(_)));
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_maps_to_output_error() {
        let sink = Mutex::new(BrokenSink);

        let error = write_report(&sink, &"text").unwrap_err();

        assert!(matches!(error, Error::Output(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn writes_whole_report() {
        let sink = Mutex::new(Vec::new());

        write_report(&sink, &"line one\nline two\n").unwrap();

        assert_eq!(sink.into_inner().unwrap(), b"line one\nline two\n");
    }
}
