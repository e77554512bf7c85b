//! Statistics collected by a profiling session and their tabular rendering.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use foldhash::{HashMap, HashMapExt};

use crate::{FunctionId, SortKey};

const TABLE_HEADER: &str =
    "   ncalls  tottime  percall  cumtime  percall filename:lineno(function)";

/// The statistics collected by one [`Profile`][crate::Profile] session.
///
/// Rendering with [`Display`][fmt::Display] produces the classic profiler table: a summary
/// line with the number of calls and total time, the ordering, and one row per measured
/// function.
///
/// ```text
///          3 function calls in 0.002 seconds
///
///    Ordered by: call count
///
///    ncalls  tottime  percall  cumtime  percall filename:lineno(function)
///         2    0.001    0.000    0.001    0.000 parser.rs:10(parse)
///         1    0.001    0.001    0.002    0.002 main.rs:4(parse_all)
/// ```
#[derive(Clone, Debug)]
pub struct Stats {
    rows: Vec<FunctionStats>,

    // `None` until the rows are explicitly sorted.
    sort_key: Option<SortKey>,
}

impl Stats {
    pub(crate) fn new(rows: Vec<FunctionStats>) -> Self {
        Self {
            rows,
            sort_key: None,
        }
    }

    /// The rows of the table, in their current order.
    #[must_use]
    pub fn rows(&self) -> &[FunctionStats] {
        &self.rows
    }

    /// The key the rows were last sorted by, if they were sorted at all.
    #[must_use]
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Whether nothing was measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of calls of all measured functions.
    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.rows
            .iter()
            .fold(0, |total, row| total.saturating_add(row.calls))
    }

    /// The number of calls of all measured functions that were not recursive re-entries.
    #[must_use]
    pub fn primitive_calls(&self) -> u64 {
        self.rows
            .iter()
            .fold(0, |total, row| total.saturating_add(row.primitive_calls))
    }

    /// The total internal time of all measured functions, which is the time spent in the
    /// profiled call as a whole.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.rows
            .iter()
            .fold(Duration::ZERO, |total, row| {
                total.saturating_add(row.internal_time)
            })
    }

    /// Removes directory components from all source locations.
    ///
    /// Rows that become indistinguishable are merged. The rows lose their ordering.
    #[must_use]
    pub fn strip_dirs(self) -> Self {
        let mut merged: HashMap<FunctionId, FunctionStats> = HashMap::with_capacity(self.rows.len());

        for row in self.rows {
            let function = row.function.strip_dirs();

            merged
                .entry(function.clone())
                .and_modify(|existing| existing.merge(&row))
                .or_insert(FunctionStats { function, ..row });
        }

        Self::new(merged.into_values().collect())
    }

    /// Orders the rows by `key`.
    ///
    /// Standard names are compared as text, both for [`SortKey::StdName`] and to break ties,
    /// so the order is fully deterministic.
    #[must_use]
    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.rows.sort_by(|a, b| {
            let primary = match key {
                SortKey::Cumulative => b.cumulative_time.cmp(&a.cumulative_time),
                SortKey::Calls => b.calls.cmp(&a.calls),
                SortKey::StdName => Ordering::Equal,
                SortKey::Time => b.internal_time.cmp(&a.internal_time),
            };

            primary.then_with(|| a.function.cmp(&b.function))
        });

        self.sort_key = Some(key);
        self
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_calls = self.total_calls();
        let primitive_calls = self.primitive_calls();

        write!(f, "         {total_calls} function calls")?;
        if total_calls != primitive_calls {
            write!(f, " ({primitive_calls} primitive calls)")?;
        }
        writeln!(f, " in {:.3} seconds", self.total_time().as_secs_f64())?;
        writeln!(f)?;

        match self.sort_key {
            Some(key) => writeln!(f, "   Ordered by: {}", key.description())?,
            None => writeln!(f, "   Random listing order was used")?,
        }
        writeln!(f)?;

        if self.rows.is_empty() {
            return Ok(());
        }

        writeln!(f, "{TABLE_HEADER}")?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        writeln!(f)?;
        writeln!(f)
    }
}

/// Statistics of a single measured function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionStats {
    function: FunctionId,
    calls: u64,
    primitive_calls: u64,
    internal_time: Duration,
    cumulative_time: Duration,
}

impl FunctionStats {
    pub(crate) fn new(
        function: FunctionId,
        calls: u64,
        primitive_calls: u64,
        internal_time: Duration,
        cumulative_time: Duration,
    ) -> Self {
        Self {
            function,
            calls,
            primitive_calls,
            internal_time,
            cumulative_time,
        }
    }

    /// The measured function.
    #[must_use]
    pub fn function(&self) -> &FunctionId {
        &self.function
    }

    /// How many times the function was entered, including recursive re-entries.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// How many times the function was entered while not already active.
    #[must_use]
    pub fn primitive_calls(&self) -> u64 {
        self.primitive_calls
    }

    /// Time spent in the function itself, excluding measured callees.
    #[must_use]
    pub fn internal_time(&self) -> Duration {
        self.internal_time
    }

    /// Time spent in the function and everything it called.
    #[must_use]
    pub fn cumulative_time(&self) -> Duration {
        self.cumulative_time
    }

    fn merge(&mut self, other: &Self) {
        self.calls = self.calls.saturating_add(other.calls);
        self.primitive_calls = self.primitive_calls.saturating_add(other.primitive_calls);
        self.internal_time = self.internal_time.saturating_add(other.internal_time);
        self.cumulative_time = self.cumulative_time.saturating_add(other.cumulative_time);
    }
}

// Seconds per call, or `None` if there were no calls to divide by.
#[expect(
    clippy::cast_precision_loss,
    reason = "display only - three decimal places are shown"
)]
fn seconds_per_call(time: Duration, calls: u64) -> Option<f64> {
    (calls != 0).then(|| time.as_secs_f64() / calls as f64)
}

impl fmt::Display for FunctionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ncalls = if self.calls == self.primitive_calls {
            self.calls.to_string()
        } else {
            format!("{}/{}", self.calls, self.primitive_calls)
        };

        write!(f, "{ncalls:>9} {:8.3} ", self.internal_time.as_secs_f64())?;

        match seconds_per_call(self.internal_time, self.calls) {
            Some(per_call) => write!(f, "{per_call:8.3} ")?,
            None => write!(f, "{:8} ", "")?,
        }

        write!(f, "{:8.3} ", self.cumulative_time.as_secs_f64())?;

        match seconds_per_call(self.cumulative_time, self.primitive_calls) {
            Some(per_call) => write!(f, "{per_call:8.3} ")?,
            None => write!(f, "{:8} ", "")?,
        }

        write!(f, "{}", self.function)
    }
}
