//! Real platform implementation using the operating system monotonic clock.

use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RealPlatform {
    origin: Instant,
}

impl RealPlatform {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Platform for RealPlatform {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn time_does_not_go_backwards() {
        let platform = RealPlatform::new();

        let first = platform.now();
        let second = platform.now();

        assert!(second >= first);
    }
}
