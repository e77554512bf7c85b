//! Per-call, instrumentation-based call-graph profiling.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;
use std::time::{Duration, Instant};

use foldhash::{HashMap, HashMapExt};
use smallvec::SmallVec;

use crate::pal::{Platform, PlatformFacade};
use crate::{FunctionId, FunctionStats, Stats};

thread_local! {
    // Sessions currently profiling on this thread, innermost last. A session only ever
    // appears here while its `Profile::run()` is on the stack of this same thread.
    static ACTIVE_SESSIONS: RefCell<Vec<Rc<RefCell<Recorder>>>> = const { RefCell::new(Vec::new()) };
}

/// A call-graph profiling session that measures one function call and the measured
/// functions it calls.
///
/// A session only sees work done on the thread that runs it. Functions opt in to being
/// measured via [`#[profmem::profiled]`][macro@crate::profiled] or [`profile_scope!`][crate::profile_scope];
/// the function passed to [`run()`][Self::run] is always measured as the root.
///
/// # Examples
///
/// ```
/// use profmem::{FunctionId, Profile, SortKey};
///
/// #[profmem::profiled]
/// fn parse(input: &str) -> usize {
///     input.len()
/// }
///
/// let profile = Profile::new();
/// let total = profile.run(FunctionId::here("parse_all"), || {
///     parse("abc") + parse("defg")
/// });
/// assert_eq!(total, 7);
///
/// let stats = profile.into_stats().strip_dirs().sort_by(SortKey::Calls);
/// assert_eq!(stats.total_calls(), 3);
/// print!("{stats}");
/// ```
#[derive(Debug)]
pub struct Profile {
    recorder: Rc<RefCell<Recorder>>,
}

impl Profile {
    /// Creates a new profiling session that has not measured anything yet.
    #[expect(
        clippy::new_without_default,
        reason = "a profiling session is not a value with a meaningful default"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            recorder: Rc::new(RefCell::new(Recorder::new(platform))),
        }
    }

    /// Runs `f` with this session active on the current thread, measuring it as `function`.
    ///
    /// The session stops observing the thread when `f` returns or unwinds.
    pub fn run<R>(&self, function: FunctionId, f: impl FnOnce() -> R) -> R {
        let _activation = Activation::new(Rc::clone(&self.recorder));
        let _root = enter(function);

        f()
    }

    /// Consumes the session and returns what it measured.
    #[must_use]
    pub fn into_stats(self) -> Stats {
        self.recorder.borrow_mut().take_stats()
    }
}

/// Attaches a session to the current thread for as long as it lives.
struct Activation {
    recorder: Rc<RefCell<Recorder>>,
}

impl Activation {
    fn new(recorder: Rc<RefCell<Recorder>>) -> Self {
        ACTIVE_SESSIONS.with_borrow_mut(|sessions| sessions.push(Rc::clone(&recorder)));

        Self { recorder }
    }
}

impl Drop for Activation {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.with_borrow_mut(|sessions| {
            if let Some(position) = sessions
                .iter()
                .rposition(|session| Rc::ptr_eq(session, &self.recorder))
            {
                sessions.remove(position);
            }
        });
    }
}

/// Marks the start of a measured function activation; the activation ends when the returned
/// scope is dropped.
///
/// The activation is recorded by every profiling session active on the current thread. If
/// there are none, this does nothing. Usually called through [`profile_scope!`][crate::profile_scope]
/// or [`#[profmem::profiled]`][macro@crate::profiled] rather than directly.
///
/// # Examples
///
/// ```
/// use profmem::{FunctionId, enter};
///
/// fn checksum(data: &[u8]) -> u32 {
///     let _scope = enter(FunctionId::here("checksum"));
///     data.iter().map(|b| u32::from(*b)).sum()
/// }
///
/// assert_eq!(checksum(&[1, 2, 3]), 6);
/// ```
pub fn enter(function: FunctionId) -> ProfiledScope {
    let recorders = ACTIVE_SESSIONS.with_borrow(|sessions| {
        sessions
            .iter()
            .map(Rc::clone)
            .collect::<SmallVec<[Rc<RefCell<Recorder>>; 2]>>()
    });

    for recorder in &recorders {
        recorder.borrow_mut().enter(&function);
    }

    ProfiledScope {
        recorders,
        function,
        _single_threaded: PhantomData,
    }
}

/// An activation of a measured function, recorded as finished when dropped.
///
/// Created by [`enter()`]. Bound to the thread it was created on.
#[derive(Debug)]
#[must_use = "the activation ends when the scope is dropped"]
pub struct ProfiledScope {
    recorders: SmallVec<[Rc<RefCell<Recorder>>; 2]>,
    function: FunctionId,

    _single_threaded: PhantomData<*const ()>,
}

impl Drop for ProfiledScope {
    fn drop(&mut self) {
        // Innermost session first, mirroring the order of entry.
        for recorder in self.recorders.iter().rev() {
            recorder.borrow_mut().exit(&self.function);
        }
    }
}

/// One open activation on the recorder's call stack.
#[derive(Debug)]
struct Frame {
    function: FunctionId,
    started: Instant,

    // Time spent in measured callees of this activation.
    callee_time: Duration,
}

#[derive(Debug, Default)]
struct Totals {
    calls: u64,
    primitive_calls: u64,
    internal_time: Duration,
    cumulative_time: Duration,

    // How many activations of this function are currently open. Greater than one means recursion.
    open_activations: u32,
}

#[derive(Debug)]
struct Recorder {
    platform: PlatformFacade,
    totals: HashMap<FunctionId, Totals>,
    stack: Vec<Frame>,
}

impl Recorder {
    fn new(platform: PlatformFacade) -> Self {
        Self {
            platform,
            totals: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn enter(&mut self, function: &FunctionId) {
        let totals = self.totals.entry(function.clone()).or_default();

        totals.calls = totals.calls.saturating_add(1);
        if totals.open_activations == 0 {
            totals.primitive_calls = totals.primitive_calls.saturating_add(1);
        }
        totals.open_activations = totals.open_activations.saturating_add(1);

        self.stack.push(Frame {
            function: function.clone(),
            started: self.platform.now(),
            callee_time: Duration::ZERO,
        });
    }

    fn exit(&mut self, function: &FunctionId) {
        // A scope that outlived its session finds no frame of its own. Frames above the one
        // being closed belong to scopes that escaped without being dropped; they are discarded.
        let Some(position) = self
            .stack
            .iter()
            .rposition(|frame| frame.function == *function)
        else {
            return;
        };

        for abandoned in self.stack.drain(position.saturating_add(1)..) {
            if let Some(totals) = self.totals.get_mut(&abandoned.function) {
                totals.open_activations = totals.open_activations.saturating_sub(1);
            }
        }

        let Some(frame) = self.stack.pop() else {
            return;
        };

        let elapsed = self.platform.now().saturating_duration_since(frame.started);

        if let Some(totals) = self.totals.get_mut(&frame.function) {
            totals.internal_time = totals
                .internal_time
                .saturating_add(elapsed.saturating_sub(frame.callee_time));

            totals.open_activations = totals.open_activations.saturating_sub(1);

            // Recursive activations are already included in the outermost one.
            if totals.open_activations == 0 {
                totals.cumulative_time = totals.cumulative_time.saturating_add(elapsed);
            }
        }

        if let Some(parent) = self.stack.last_mut() {
            parent.callee_time = parent.callee_time.saturating_add(elapsed);
        }
    }

    fn take_stats(&mut self) -> Stats {
        self.stack.clear();

        let rows = mem::take(&mut self.totals)
            .into_iter()
            .map(|(function, totals)| {
                FunctionStats::new(
                    function,
                    totals.calls,
                    totals.primitive_calls,
                    totals.internal_time,
                    totals.cumulative_time,
                )
            })
            .collect();

        Stats::new(rows)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use super::*;
    use crate::pal::FakePlatform;

    fn fake_profile() -> (Profile, FakePlatform) {
        let platform = FakePlatform::new();
        let profile = Profile::with_platform(PlatformFacade::fake(platform.clone()));
        (profile, platform)
    }

    fn id(name: &'static str) -> FunctionId {
        FunctionId::new("src/work.rs", 1, name)
    }

    fn row<'a>(stats: &'a Stats, name: &str) -> &'a FunctionStats {
        stats
            .rows()
            .iter()
            .find(|row| row.function().name() == name)
            .unwrap_or_else(|| panic!("no row for {name}"))
    }

    #[test]
    fn run_returns_result_and_measures_root() {
        let (profile, platform) = fake_profile();

        let result = profile.run(id("root"), || {
            platform.advance(Duration::from_millis(30));
            "done"
        });

        assert_eq!(result, "done");

        let stats = profile.into_stats();
        assert_eq!(stats.rows().len(), 1);

        let root = row(&stats, "root");
        assert_eq!(root.calls(), 1);
        assert_eq!(root.primitive_calls(), 1);
        assert_eq!(root.internal_time(), Duration::from_millis(30));
        assert_eq!(root.cumulative_time(), Duration::from_millis(30));
    }

    #[test]
    fn callee_time_is_excluded_from_internal_time() {
        let (profile, platform) = fake_profile();

        profile.run(id("root"), || {
            platform.advance(Duration::from_millis(10));

            for _ in 0..2 {
                let _scope = enter(id("child"));
                platform.advance(Duration::from_millis(20));
            }
        });

        let stats = profile.into_stats();

        let root = row(&stats, "root");
        assert_eq!(root.internal_time(), Duration::from_millis(10));
        assert_eq!(root.cumulative_time(), Duration::from_millis(50));

        let child = row(&stats, "child");
        assert_eq!(child.calls(), 2);
        assert_eq!(child.internal_time(), Duration::from_millis(40));
        assert_eq!(child.cumulative_time(), Duration::from_millis(40));
        assert_eq!(stats.total_calls(), 3);
    }

    fn countdown(n: u32, platform: &FakePlatform) {
        let _scope = enter(id("countdown"));
        platform.advance(Duration::from_millis(1));

        if n > 0 {
            countdown(n - 1, platform);
        }
    }

    #[test]
    fn recursion_counts_primitive_calls_and_cumulative_time_once() {
        let (profile, platform) = fake_profile();

        profile.run(id("root"), || countdown(2, &platform));

        let stats = profile.into_stats();
        let countdown = row(&stats, "countdown");

        assert_eq!(countdown.calls(), 3);
        assert_eq!(countdown.primitive_calls(), 1);
        assert_eq!(countdown.internal_time(), Duration::from_millis(3));
        assert_eq!(countdown.cumulative_time(), Duration::from_millis(3));
        assert_eq!(stats.primitive_calls(), 2);
    }

    #[test]
    fn scope_without_session_is_noop() {
        let scope = enter(id("lonely"));
        assert!(scope.recorders.is_empty());
    }

    #[test]
    fn session_is_detached_after_run() {
        let (profile, _platform) = fake_profile();

        profile.run(id("root"), || {});

        {
            let _scope = enter(id("after"));
        }

        let stats = profile.into_stats();
        assert_eq!(stats.rows().len(), 1);
        assert_eq!(ACTIVE_SESSIONS.with_borrow(Vec::len), 0);
    }

    #[test]
    fn session_is_detached_after_panic() {
        let (profile, _platform) = fake_profile();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            profile.run(id("root"), || panic!("boom"));
        }));

        assert!(outcome.is_err());
        assert_eq!(ACTIVE_SESSIONS.with_borrow(Vec::len), 0);
    }

    #[test]
    fn nested_sessions_both_see_inner_work() {
        let (outer, platform) = fake_profile();
        let inner = Profile::with_platform(PlatformFacade::fake(platform.clone()));

        outer.run(id("outer"), || {
            inner.run(id("inner"), || {
                let _scope = enter(id("work"));
                platform.advance(Duration::from_millis(5));
            });
        });

        let outer_stats = outer.into_stats();
        let inner_stats = inner.into_stats();

        assert_eq!(row(&outer_stats, "work").calls(), 1);
        assert_eq!(row(&outer_stats, "inner").calls(), 1);
        assert_eq!(row(&inner_stats, "work").calls(), 1);
        assert!(inner_stats.rows().iter().all(|r| r.function().name() != "outer"));
    }

    #[test]
    fn sessions_on_other_threads_are_isolated() {
        let (profile, _platform) = fake_profile();

        profile.run(id("root"), || {
            thread::spawn(|| {
                let _scope = enter(id("elsewhere"));
            })
            .join()
            .unwrap();
        });

        let stats = profile.into_stats();
        assert!(stats.rows().iter().all(|r| r.function().name() != "elsewhere"));
    }

    #[test]
    fn scope_outliving_session_is_ignored() {
        let (profile, platform) = fake_profile();

        let escaped = profile.run(id("root"), || {
            platform.advance(Duration::from_millis(4));
            enter(id("escaped"))
        });
        let stats = profile.into_stats();
        drop(escaped);

        let root = row(&stats, "root");
        assert_eq!(root.calls(), 1);
        assert_eq!(root.cumulative_time(), Duration::from_millis(4));

        // Never closed, so no time is attributed.
        let escaped = row(&stats, "escaped");
        assert_eq!(escaped.calls(), 1);
        assert_eq!(escaped.cumulative_time(), Duration::ZERO);
    }

    static_assertions::assert_not_impl_any!(ProfiledScope: Send, Sync);
    static_assertions::assert_not_impl_any!(Profile: Send, Sync);
}
