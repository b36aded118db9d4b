use anyhow::{bail, ensure};
use logos::{Lexer, Logos};
use std::{fmt, str::FromStr};

/// Throughput of a link or of a flow, in megabits per second.
///
/// Unlike a byte counter this is a rate that gets split between
/// competing flows, so it is kept as a floating point value: an
/// even split of `100mbps` between 3 flows is `33.33..mbps` each.
///
/// A link without any configured throughput is *unconstrained*. That
/// is expressed with `Option<Throughput>` rather than with a sentinel
/// value.
///
/// # Example
///
/// ```
/// # use netchar_core::measure::Throughput;
/// let throughput: Throughput = "1gbps".parse().unwrap();
/// assert_eq!(throughput.as_mbps(), 1_000.0);
/// assert_eq!(throughput.to_string(), "1000mbps");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Throughput(f64);

impl Throughput {
    pub const ZERO: Self = Self(0.0);

    /// create a throughput of `mbps` megabits per second
    ///
    /// negative and NaN values are clamped to [`Throughput::ZERO`]
    pub fn from_mbps(mbps: f64) -> Self {
        if mbps.is_nan() || mbps < 0.0 {
            Self::ZERO
        } else {
            Self(mbps)
        }
    }

    #[inline]
    pub fn as_mbps(self) -> f64 {
        self.0
    }

    /// the smaller of the two throughput, treating `None` as unconstrained
    ///
    /// ```
    /// # use netchar_core::measure::Throughput;
    /// let a = Some(Throughput::from_mbps(10.0));
    /// assert_eq!(Throughput::min_of(a, None), a);
    /// assert_eq!(Throughput::min_of(None, None), None);
    /// ```
    pub fn min_of(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if a <= b { a } else { b }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}mbps", self.0 as u64)
        } else {
            write!(f, "{}mbps", self.0)
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum ThroughputToken {
    #[token("bps")]
    Bps,
    #[token("kbps")]
    Kbps,
    #[token("mbps")]
    Mbps,
    #[token("gbps")]
    Gbps,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}

impl FromStr for Throughput {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, ThroughputToken>::new(s);

        let Some(Ok(ThroughputToken::Value)) = lex.next() else {
            bail!("Expecting to parse a number")
        };
        let number: f64 = lex.slice().parse()?;
        let Some(Ok(token)) = lex.next() else {
            bail!("Expecting to parse a unit")
        };
        // network rates use decimal prefixes
        let mbps = match token {
            ThroughputToken::Bps => number / 1_000_000.0,
            ThroughputToken::Kbps => number / 1_000.0,
            ThroughputToken::Mbps => number,
            ThroughputToken::Gbps => number * 1_000.0,
            ThroughputToken::Value => bail!("Expecting to parse a unit (bps, kbps, ...)"),
        };

        ensure!(
            lex.next().is_none(),
            "Not expecting any other tokens to parse a throughput"
        );

        Ok(Self::from_mbps(mbps))
    }
}
