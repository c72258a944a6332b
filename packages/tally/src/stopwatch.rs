//! Elapsed-time readings taken through the platform abstraction.

use std::time::Duration;

use crate::pal::{Platform, PlatformFacade};

/// Measures the time elapsed since it was started.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stopwatch<'a> {
    platform: &'a PlatformFacade,
    started: Duration,
}

impl<'a> Stopwatch<'a> {
    pub(crate) fn start(platform: &'a PlatformFacade) -> Self {
        Self {
            platform,
            started: platform.now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.platform.now().saturating_sub(self.started)
    }
}

/// Runs `step`, adding the time it took to `total`.
///
/// The time is added even if `step` panics, so a caller that reports `total` from a
/// `Drop` implementation also accounts for the step that failed.
pub(crate) fn accumulate<R>(
    platform: &PlatformFacade,
    total: &mut Duration,
    step: impl FnOnce() -> R,
) -> R {
    let stopwatch = Stopwatch::start(platform);

    let _total = scopeguard::guard(total, |total| {
        *total = total.checked_add(stopwatch.elapsed()).expect(
            "elapsed time accumulation overflows Duration - this indicates an unrealistic scenario",
        );
    });

    step()
}
