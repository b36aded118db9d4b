use std::{fmt, str::FromStr};

/// Packet loss of a link, or aggregated along a path.
///
/// # Example
///
/// ```
/// use netchar_core::measure::PacketLoss;
///
/// // No packet loss
/// let none = PacketLoss::None;
///
/// // 5% packet loss (programmatic)
/// let lossy = PacketLoss::rate(0.05).unwrap();
/// assert_eq!(lossy.to_string(), "5%");
///
/// // 5% packet loss (parsed)
/// let parsed: PacketLoss = "5%".parse().unwrap();
/// assert_eq!(parsed, lossy);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum PacketLoss {
    /// No packet loss (default).
    #[default]
    None,
    /// Loss at the given rate (`0.0..=1.0`).
    ///
    /// Use [`PacketLoss::rate`] to construct this variant, it validates
    /// the value at creation time.
    Rate(PacketLossRate),
}

/// A validated packet loss rate in the range `[0.0, 1.0]`.
///
/// `0.0` means no loss; `1.0` means all packets are dropped.
/// Constructed via [`PacketLoss::rate`] which rejects NaN, negative,
/// and out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketLossRate(f64);

impl PacketLoss {
    /// Create a `PacketLoss::Rate` with a validated loss probability.
    ///
    /// # Errors
    ///
    /// Returns an error if `rate` is not in `[0.0, 1.0]` (including NaN).
    pub fn rate(rate: f64) -> Result<Self, PacketLossRateError> {
        Ok(PacketLoss::Rate(PacketLossRate::new(rate)?))
    }

    /// The loss probability, `0.0` for [`PacketLoss::None`].
    pub fn value(self) -> f64 {
        match self {
            PacketLoss::None => 0.0,
            PacketLoss::Rate(rate) => rate.value(),
        }
    }

    /// The loss as a percentage, as published in the network
    /// characteristics updates.
    pub fn as_percent(self) -> f64 {
        self.value() * 100.0
    }

    /// Loss of two hops traversed one after the other.
    ///
    /// A packet makes it through only if it survives both hops, so the
    /// losses compound: `1 - (1 - a) * (1 - b)`.
    ///
    /// ```
    /// # use netchar_core::measure::PacketLoss;
    /// let a = PacketLoss::rate(0.01).unwrap();
    /// let b = PacketLoss::rate(0.02).unwrap();
    /// let total = a.compound(b);
    /// assert!((total.value() - 0.0298).abs() < 1e-12);
    /// ```
    pub fn compound(self, other: Self) -> Self {
        match (self, other) {
            (PacketLoss::None, other) => other,
            (this, PacketLoss::None) => this,
            (PacketLoss::Rate(a), PacketLoss::Rate(b)) => {
                let delivered = (1.0 - a.value()) * (1.0 - b.value());
                // both factors are in [0, 1], the product is too
                PacketLoss::Rate(PacketLossRate((1.0 - delivered).clamp(0.0, 1.0)))
            }
        }
    }
}

impl fmt::Display for PacketLoss {
    /// Formats as a percentage with up to 2 decimal places.
    ///
    /// - `PacketLoss::None` → `"0%"`
    /// - `PacketLoss::Rate(0.05)` → `"5%"`
    /// - `PacketLoss::Rate(0.123)` → `"12.30%"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketLoss::None => write!(f, "0%"),
            PacketLoss::Rate(rate) => write!(f, "{rate}"),
        }
    }
}

impl FromStr for PacketLoss {
    type Err = PacketLossParseError;

    /// Parses a percentage string like `"0%"`, `"5%"`, `"12.30%"`, `"100%"`.
    ///
    /// The `%` suffix is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(num) = s.strip_suffix('%') else {
            return Err(PacketLossParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| PacketLossParseError::InvalidNumber)?;
        let rate = pct / 100.0;
        if rate == 0.0 {
            return Ok(PacketLoss::None);
        }
        PacketLoss::rate(rate).map_err(PacketLossParseError::OutOfRange)
    }
}

impl fmt::Display for PacketLossRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        // If the percentage is a whole number, skip decimal places.
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{:.2}%", pct)
        }
    }
}

impl PacketLossRate {
    /// Create a new validated rate.
    ///
    /// # Errors
    ///
    /// Returns [`PacketLossRateError`] if `rate` is NaN, negative, or
    /// greater than `1.0`.
    pub fn new(rate: f64) -> Result<Self, PacketLossRateError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(PacketLossRateError(rate));
        }
        Ok(Self(rate))
    }

    /// Returns the inner `f64` value.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Error returned when constructing a [`PacketLossRate`] with a value
/// outside `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("packet loss rate must be in [0.0, 1.0], got {0}")]
pub struct PacketLossRateError(f64);

/// Error returned when parsing a [`PacketLoss`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketLossParseError {
    /// The string does not end with `%`.
    #[error("expected '%' suffix")]
    MissingSuffix,
    /// The numeric part could not be parsed as a float.
    #[error("invalid number before '%'")]
    InvalidNumber,
    /// The parsed percentage is outside `[0, 100]`.
    #[error("{0}")]
    OutOfRange(#[from] PacketLossRateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_nan_rejected() {
        assert!(PacketLoss::rate(f64::NAN).is_err());
    }

    #[test]
    fn rate_negative_rejected() {
        assert!(PacketLoss::rate(-0.1).is_err());
    }

    #[test]
    fn rate_above_one_rejected() {
        assert!(PacketLoss::rate(1.5).is_err());
    }

    #[test]
    fn error_display() {
        let err = PacketLoss::rate(2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "packet loss rate must be in [0.0, 1.0], got 2"
        );
    }

    #[test]
    fn display_whole_percent() {
        assert_eq!(PacketLoss::None.to_string(), "0%");
        assert_eq!(PacketLoss::rate(0.05).unwrap().to_string(), "5%");
        assert_eq!(PacketLoss::rate(1.0).unwrap().to_string(), "100%");
    }

    #[test]
    fn display_fractional_percent() {
        assert_eq!(PacketLoss::rate(0.123).unwrap().to_string(), "12.30%");
        assert_eq!(PacketLoss::rate(0.015).unwrap().to_string(), "1.50%");
    }

    #[test]
    fn parse() {
        assert_eq!("0%".parse::<PacketLoss>().unwrap(), PacketLoss::None);
        assert_eq!(
            "5%".parse::<PacketLoss>().unwrap(),
            PacketLoss::rate(0.05).unwrap()
        );
        assert!("5".parse::<PacketLoss>().is_err());
        assert!("abc%".parse::<PacketLoss>().is_err());
        assert!("150%".parse::<PacketLoss>().is_err());
        assert!("-1%".parse::<PacketLoss>().is_err());
    }

    #[test]
    fn losses_compound_multiplicatively() {
        let one = PacketLoss::rate(0.01).unwrap();
        let two = PacketLoss::rate(0.02).unwrap();

        let total = one.compound(two);

        // not 3%
        assert!((total.as_percent() - 2.98).abs() < 1e-9);
        assert_eq!(total.to_string(), "2.98%");
    }

    #[test]
    fn compound_with_none_is_identity() {
        let loss = PacketLoss::rate(0.1).unwrap();

        assert_eq!(loss.compound(PacketLoss::None), loss);
        assert_eq!(PacketLoss::None.compound(loss), loss);
        assert_eq!(PacketLoss::None.compound(PacketLoss::None), PacketLoss::None);
    }

    #[test]
    fn compound_total_loss() {
        let all = PacketLoss::rate(1.0).unwrap();
        let some = PacketLoss::rate(0.3).unwrap();

        assert_eq!(all.compound(some).value(), 1.0);
    }
}
