use std::io;
use std::time::Instant;

use crate::pal::Platform;
use crate::pal::windows::{Bindings, BindingsFacade};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::real());

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    // Only executed in const context.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub(crate) const fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }
}

impl Platform for BuildTargetPlatform {
    fn peak_resident_bytes(&self) -> io::Result<u64> {
        let bytes = self.bindings.peak_working_set_size()?;

        Ok(u64::try_from(bytes).expect("usize fits in u64 on all supported Windows targets"))
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
