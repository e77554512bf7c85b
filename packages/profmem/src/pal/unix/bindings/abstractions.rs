use std::fmt::Debug;
use std::io;

/// Bindings for FFI calls into the operating system.
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// The raw `ru_maxrss` field of `getrusage(RUSAGE_SELF)`, in platform-specific units.
    fn getrusage_self_max_rss(&self) -> io::Result<i64>;
}
