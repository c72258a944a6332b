use std::time::Duration;

/// Running statistics of the measurements recorded under one metric name.
///
/// Means and variances are updated incrementally, so memory use does not grow with the
/// number of samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MetricStats {
    pub(crate) samples: u64,
    pub(crate) total_count: u64,
    pub(crate) total_elapsed: Duration,

    count_mean: f64,
    // Sum of squared differences from the mean.
    count_m2: f64,

    elapsed_mean: f64,
    elapsed_m2: f64,
}

impl MetricStats {
    pub(crate) fn add(&mut self, count: u64, elapsed: Duration) {
        self.samples = self
            .samples
            .checked_add(1)
            .expect("sample count overflows u64 - this indicates an unrealistic scenario");

        self.total_count = self
            .total_count
            .checked_add(count)
            .expect("total item count overflows u64 - this indicates an unrealistic scenario");

        self.total_elapsed = self.total_elapsed.checked_add(elapsed).expect(
            "elapsed time accumulation overflows Duration - this indicates an unrealistic scenario",
        );

        #[expect(
            clippy::cast_precision_loss,
            reason = "statistics tolerate precision loss beyond 2^52 samples or items"
        )]
        let (samples, count) = (self.samples as f64, count as f64);

        update(&mut self.count_mean, &mut self.count_m2, samples, count);
        update(
            &mut self.elapsed_mean,
            &mut self.elapsed_m2,
            samples,
            elapsed.as_secs_f64(),
        );
    }

    /// Combines two sets of statistics as if all samples had been added to one.
    pub(crate) fn merge(&self, other: &Self) -> Self {
        if self.samples == 0 {
            return other.clone();
        }

        if other.samples == 0 {
            return self.clone();
        }

        let samples = self
            .samples
            .checked_add(other.samples)
            .expect("merging sample counts overflows u64 - this indicates an unrealistic scenario");

        #[expect(
            clippy::cast_precision_loss,
            reason = "statistics tolerate precision loss beyond 2^52 samples"
        )]
        let (a_samples, b_samples) = (self.samples as f64, other.samples as f64);

        let (count_mean, count_m2) = combine(
            (self.count_mean, self.count_m2, a_samples),
            (other.count_mean, other.count_m2, b_samples),
        );
        let (elapsed_mean, elapsed_m2) = combine(
            (self.elapsed_mean, self.elapsed_m2, a_samples),
            (other.elapsed_mean, other.elapsed_m2, b_samples),
        );

        Self {
            samples,
            total_count: self
                .total_count
                .checked_add(other.total_count)
                .expect("merging item counts overflows u64 - this indicates an unrealistic scenario"),
            total_elapsed: self.total_elapsed.checked_add(other.total_elapsed).expect(
                "merging elapsed times overflows Duration - this indicates an unrealistic scenario",
            ),
            count_mean,
            count_m2,
            elapsed_mean,
            elapsed_m2,
        }
    }

    pub(crate) fn count_mean(&self) -> f64 {
        self.count_mean
    }

    pub(crate) fn count_stddev(&self) -> f64 {
        self.stddev(self.count_m2)
    }

    /// Mean elapsed time in seconds.
    pub(crate) fn elapsed_mean(&self) -> f64 {
        self.elapsed_mean
    }

    /// Population standard deviation of the elapsed time in seconds.
    pub(crate) fn elapsed_stddev(&self) -> f64 {
        self.stddev(self.elapsed_m2)
    }

    fn stddev(&self, m2: f64) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "statistics tolerate precision loss beyond 2^52 samples"
        )]
        let samples = self.samples as f64;

        (m2 / samples).max(0.0).sqrt()
    }
}

fn update(mean: &mut f64, m2: &mut f64, samples: f64, value: f64) {
    let delta = value - *mean;
    *mean += delta / samples;
    *m2 += delta * (value - *mean);
}

fn combine(a: (f64, f64, f64), b: (f64, f64, f64)) -> (f64, f64) {
    let (a_mean, a_m2, a_samples) = a;
    let (b_mean, b_m2, b_samples) = b;

    let samples = a_samples + b_samples;
    let delta = b_mean - a_mean;

    let mean = a_mean + delta * b_samples / samples;
    let m2 = a_m2 + b_m2 + delta * delta * a_samples * b_samples / samples;

    (mean, m2)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn close_to(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = MetricStats::default();

        assert_eq!(stats.samples, 0);
        assert!(close_to(stats.count_mean(), 0.0));
        assert!(close_to(stats.count_stddev(), 0.0));
        assert!(close_to(stats.elapsed_stddev(), 0.0));
    }

    #[test]
    fn population_mean_and_stddev() {
        let mut stats = MetricStats::default();

        for (count, secs) in [(2, 1), (4, 1), (4, 1), (4, 1), (5, 3), (5, 3), (7, 3), (9, 3)] {
            stats.add(count, Duration::from_secs(secs));
        }

        assert_eq!(stats.samples, 8);
        assert_eq!(stats.total_count, 40);
        assert_eq!(stats.total_elapsed, Duration::from_secs(16));
        assert!(close_to(stats.count_mean(), 5.0));
        assert!(close_to(stats.count_stddev(), 2.0));
        assert!(close_to(stats.elapsed_mean(), 2.0));
        assert!(close_to(stats.elapsed_stddev(), 1.0));
    }

    #[test]
    fn merge_matches_single_accumulation() {
        let samples = [(1, 100), (3, 250), (8, 900), (2, 50), (6, 400)];

        let mut all = MetricStats::default();
        let mut first = MetricStats::default();
        let mut second = MetricStats::default();

        for (index, (count, millis)) in samples.into_iter().enumerate() {
            let elapsed = Duration::from_millis(millis);
            all.add(count, elapsed);

            if index < 2 {
                first.add(count, elapsed);
            } else {
                second.add(count, elapsed);
            }
        }

        let merged = first.merge(&second);

        assert_eq!(merged.samples, all.samples);
        assert_eq!(merged.total_count, all.total_count);
        assert_eq!(merged.total_elapsed, all.total_elapsed);
        assert!(close_to(merged.count_mean(), all.count_mean()));
        assert!(close_to(merged.count_stddev(), all.count_stddev()));
        assert!(close_to(merged.elapsed_mean(), all.elapsed_mean()));
        assert!(close_to(merged.elapsed_stddev(), all.elapsed_stddev()));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut stats = MetricStats::default();
        stats.add(3, Duration::from_secs(1));

        assert_eq!(stats.merge(&MetricStats::default()), stats);
        assert_eq!(MetricStats::default().merge(&stats), stats);
    }
}
