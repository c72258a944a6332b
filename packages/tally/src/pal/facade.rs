//! Platform facade for switching between real and fake implementations.

use std::time::Duration;

use crate::pal::abstractions::Platform;
#[cfg(test)]
use crate::pal::fake::FakePlatform;
use crate::pal::real::RealPlatform;

/// Facade that allows switching between real and fake platform implementations.
#[derive(Debug, Clone)]
pub(crate) enum PlatformFacade {
    /// Real platform implementation reading the monotonic clock.
    Real(RealPlatform),

    /// Fake platform implementation for testing.
    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    /// Creates a new platform facade using the real implementation.
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform::new())
    }

    /// Creates a new platform facade using the fake implementation.
    #[cfg(test)]
    pub(crate) fn fake(fake_platform: FakePlatform) -> Self {
        Self::Fake(fake_platform)
    }
}

impl Platform for PlatformFacade {
    fn now(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.now(),
            #[cfg(test)]
            Self::Fake(platform) => platform.now(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn platform_facade_real() {
        let facade = PlatformFacade::real();
        assert!(matches!(facade, PlatformFacade::Real(_)));
    }

    #[test]
    fn platform_facade_fake_reads_fake_time() {
        let fake_platform = FakePlatform::new();
        fake_platform.set_now(Duration::from_millis(300));
        let facade = PlatformFacade::fake(fake_platform);

        assert_eq!(facade.now(), Duration::from_millis(300));
    }
}
