//! Metric names and the identities they are derived from.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

/// The name reported to a [`Sink`][crate::Sink] alongside each measurement.
///
/// A metric may be unnamed, in which case sinks receive `None`. Sinks that key their data by
/// name drop unnamed measurements with a warning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetricName(Option<Cow<'static, str>>);

impl MetricName {
    /// A metric without a name.
    pub const UNNAMED: Self = Self(None);

    /// Returns the name, if there is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this metric has a name.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.0.is_some()
    }

    /// Keeps an existing name or falls back to the one produced by `fallback`.
    #[must_use]
    pub(crate) fn or_else(self, fallback: impl FnOnce() -> String) -> Self {
        match self.0 {
            Some(name) => Self(Some(name)),
            None => Self(Some(Cow::Owned(fallback()))),
        }
    }
}

impl From<&'static str> for MetricName {
    fn from(value: &'static str) -> Self {
        Self(Some(Cow::Borrowed(value)))
    }
}

impl From<String> for MetricName {
    fn from(value: String) -> Self {
        Self(Some(Cow::Owned(value)))
    }
}

impl From<Option<String>> for MetricName {
    fn from(value: Option<String>) -> Self {
        Self(value.map(Cow::Owned))
    }
}

impl From<UnitName> for MetricName {
    fn from(value: UnitName) -> Self {
        Self(Some(Cow::Owned(value.to_string())))
    }
}

/// Identifies a plain function as the unit of work being measured.
///
/// Use the [`unit_name!`][crate::unit_name] macro to capture the identity of a function
/// in the calling module. The default metric name of a decorated function is this
/// identity formatted as `{module}.{function}`.
///
/// # Examples
///
/// ```
/// fn load_rows() -> Vec<u32> {
///     vec![1, 2, 3]
/// }
///
/// let unit = tally::unit_name!(load_rows);
/// assert_eq!(unit.to_string(), format!("{}.load_rows", module_path!()));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitName {
    module: &'static str,
    function: &'static str,
}

impl UnitName {
    /// Creates a unit identity from a module path and a function name.
    #[must_use]
    pub const fn new(module: &'static str, function: &'static str) -> Self {
        Self { module, function }
    }

    /// The module path the function is declared in.
    #[must_use]
    pub const fn module(&self) -> &'static str {
        self.module
    }

    /// The bare name of the function.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        self.function
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// Captures the [`UnitName`] of a function declared in or visible from the calling module.
///
/// # Examples
///
/// ```
/// fn checksum(data: &[u8]) -> u32 {
///     data.iter().map(|b| u32::from(*b)).sum()
/// }
///
/// let unit = tally::unit_name!(checksum);
/// assert_eq!(unit.function(), "checksum");
/// assert_eq!(unit.module(), module_path!());
/// ```
#[macro_export]
macro_rules! unit_name {
    ($function:ident) => {
        $crate::UnitName::new(::core::module_path!(), ::core::stringify!($function))
    };
}

/// Formats the default metric name of `method` when called on a receiver of type `T`.
///
/// The result is `{module}.{type}.{method}`, where the module and type come from the
/// type's path with any generic arguments removed.
pub(crate) fn method_metric_name<T>(method: &str) -> String
where
    T: ?Sized,
{
    let full_name = type_name::<T>();
    let path = full_name
        .split_once('<')
        .map_or(full_name, |(path, _generics)| path);

    match path.rsplit_once("::") {
        Some((module, type_name)) => format!("{module}.{type_name}.{method}"),
        None => format!("{path}.{method}"),
    }
}
