use std::io;
use std::time::Instant;

use crate::pal::Platform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// A build target we do not know how to ask for peak memory.
///
/// Time measurements still work but every memory query fails.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    fn peak_resident_bytes(&self) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "peak resident set size is not supported on this build target",
        ))
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
