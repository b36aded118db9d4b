use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
    time::Duration,
};

/// The latency is a measure of how much a signal takes to
/// travel between two points.
///
/// The same type is used for the latency variation (jitter) of a link:
/// both are configured per hop and both add up along a path.
///
/// # Default [`Latency`]
///
/// ```
/// # use netchar_core::measure::Latency;
/// assert_eq!(
///     Latency::default().to_string(),
///     "0ms"
/// )
/// ```
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Latency(u64);

impl Latency {
    /// The `0` latency. I.e. no latency.
    ///
    pub const ZERO: Self = Self::new(Duration::ZERO);

    /// create a new latency with the given [`Duration`].
    ///
    /// # truncation
    ///
    /// The latency is precise up to the micro seconds. Constructing a
    /// [`Latency`] from a [`Duration`] that contains nano seconds
    /// precision value will truncate the nano seconds part.
    ///
    /// ```
    /// # use netchar_core::measure::Latency;
    /// # use std::time::Duration;
    /// let latency = Latency::new(Duration::from_nanos(987_654_321));
    /// assert_eq!(
    ///     latency.into_duration(),
    ///     Duration::from_micros(987_654),
    /// );
    /// ```
    ///
    #[inline(always)]
    pub const fn new(duration: Duration) -> Self {
        Self(duration.as_micros() as u64)
    }

    #[inline(always)]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// get the inner duration
    ///
    #[inline(always)]
    pub fn into_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }

    /// The latency in milliseconds, as published in the
    /// network characteristics updates.
    ///
    /// ```
    /// # use netchar_core::measure::Latency;
    /// # use std::time::Duration;
    /// let latency = Latency::new(Duration::from_micros(2_500));
    /// assert_eq!(latency.as_millis_f64(), 2.5);
    /// ```
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

impl Add for Latency {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Latency {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Latency {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Latency> for Duration {
    fn from(value: Latency) -> Self {
        value.into_duration()
    }
}
impl From<Duration> for Latency {
    fn from(value: Duration) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dur = crate::time::Duration::new(self.into_duration());
        dur.fmt(f)
    }
}

impl FromStr for Latency {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration = crate::time::Duration::from_str(s)?;

        Ok(Self::new(duration.into_duration()))
    }
}
