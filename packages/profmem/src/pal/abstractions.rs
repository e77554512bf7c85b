use std::fmt::Debug;
use std::io;
use std::time::Instant;

pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// The highest resident set size the process has reached since it started, in bytes.
    fn peak_resident_bytes(&self) -> io::Result<u64>;

    /// The current instant of the monotonic clock used for all time measurements.
    fn now(&self) -> Instant;
}
