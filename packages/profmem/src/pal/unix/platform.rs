use std::io;
use std::time::Instant;

use crate::pal::Platform;
use crate::pal::unix::{Bindings, BindingsFacade};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::real());

// Apple platforms report `ru_maxrss` in bytes, everyone else in kilobytes.
#[cfg(any(target_os = "macos", target_os = "ios"))]
const MAX_RSS_UNIT_BYTES: u64 = 1;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
const MAX_RSS_UNIT_BYTES: u64 = 1024;

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    pub(crate) const fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }
}

impl Platform for BuildTargetPlatform {
    fn peak_resident_bytes(&self) -> io::Result<u64> {
        let max_rss = self.bindings.getrusage_self_max_rss()?;

        let units = u64::try_from(max_rss).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("operating system reported peak resident set size {max_rss}: {error}"),
            )
        })?;

        Ok(units.saturating_mul(MAX_RSS_UNIT_BYTES))
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
