use crate::pal::PlatformFacade;
use crate::{DefaultSink, Instrument, MetricName, Sink};

/// Creates instances of [`Instrument`].
///
/// All parameters are optional:
/// * `name` - defaults to unnamed. Sinks that key data by name drop unnamed measurements.
/// * `sink` - defaults to [`DefaultSink`], which forwards to the process-wide default sink.
///
/// Use `Instrument::builder()` to create a new instance of this builder.
#[derive(Debug)]
pub struct InstrumentBuilder<S = DefaultSink>
where
    S: Sink,
{
    name: MetricName,
    sink: S,
    platform: PlatformFacade,
}

impl InstrumentBuilder<DefaultSink> {
    pub(crate) fn new() -> Self {
        Self {
            name: MetricName::UNNAMED,
            sink: DefaultSink,
            platform: PlatformFacade::real(),
        }
    }
}

impl<S> InstrumentBuilder<S>
where
    S: Sink,
{
    /// Sets the name reported with every measurement.
    ///
    /// # Example
    ///
    /// ```
    /// use tally::Instrument;
    ///
    /// let instrument = Instrument::builder().name("db_query_rows").build();
    /// assert_eq!(instrument.name(), Some("db_query_rows"));
    /// ```
    #[must_use]
    pub fn name(self, name: impl Into<MetricName>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Sets the sink that receives the measurements.
    ///
    /// # Example
    ///
    /// ```
    /// use tally::{FanOut, Instrument, LogSink, print_metric};
    ///
    /// let instrument = Instrument::builder()
    ///     .name("cache_fill")
    ///     .sink(FanOut::new().with(LogSink::default()).with(print_metric))
    ///     .build();
    /// # drop(instrument);
    /// ```
    #[must_use]
    pub fn sink<S2>(self, sink: S2) -> InstrumentBuilder<S2>
    where
        S2: Sink,
    {
        InstrumentBuilder {
            name: self.name,
            sink,
            platform: self.platform,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn platform(self, platform: PlatformFacade) -> Self {
        Self { platform, ..self }
    }

    /// Creates the instrument.
    #[must_use]
    pub fn build(self) -> Instrument<S> {
        Instrument::new(self.name, self.sink, self.platform)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn defaults_to_unnamed() {
        let instrument = Instrument::builder().build();
        assert_eq!(instrument.name(), None);
    }

    #[test]
    fn configures_name_and_sink() {
        let recorder = Recorder::new();

        let instrument = Instrument::builder()
            .name("configured")
            .sink(recorder.clone())
            .build();
        instrument.record(9, Duration::from_secs(1));

        assert_eq!(
            recorder.records(),
            vec![(Some("configured".to_owned()), 9, Duration::from_secs(1))]
        );
    }

    #[test]
    fn name_survives_sink_change() {
        let instrument = Instrument::builder()
            .name("kept")
            .sink(Recorder::new())
            .build();

        assert_eq!(instrument.name(), Some("kept"));
    }
}
