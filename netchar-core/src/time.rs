use anyhow::{anyhow, bail, ensure, Result};
use core::fmt;
use logos::{Lexer, Logos};
use std::{str::FromStr, time};

/// Duration as written in scenario documents: a sequence of
/// `<number><unit>` pairs, e.g. `5ms`, `1s 250ms` or `800us`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub(crate) struct Duration(time::Duration);

impl Duration {
    pub(crate) fn new(dur: time::Duration) -> Self {
        Self(dur)
    }

    #[inline]
    pub(crate) fn into_duration(self) -> time::Duration {
        self.0
    }
}

impl fmt::Display for Duration {
    /// Milliseconds when the value is a whole number of milliseconds,
    /// microseconds otherwise. Both forms parse back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let us = self.0.as_micros();
        if us % 1_000 == 0 {
            write!(f, "{}ms", us / 1_000)
        } else {
            write!(f, "{us}us")
        }
    }
}

impl FromStr for Duration {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::new(s);

        let mut total = time::Duration::ZERO;
        let mut parsed_any = false;

        while let Some(next) = lex.next() {
            let number: Token = next.map_err(|()| anyhow!("Failed to parse: {s}"))?;

            ensure!(
                number == Token::Value,
                "Expecting duration to starts with number. Cannot parse {s}"
            );
            let number: u64 = lex.slice().parse()?;

            let Some(Ok(measure)) = lex.next() else {
                bail!("Expecting a measure, failed to parse: {s}")
            };
            total += match measure {
                Token::MicroSeconds => time::Duration::from_micros(number),
                Token::MilliSeconds => time::Duration::from_millis(number),
                Token::Seconds => time::Duration::from_secs(number),
                Token::Value => bail!("Failed to parse `{s}', expecting a measure."),
            };
            parsed_any = true;
        }

        ensure!(parsed_any, "Expecting a duration, got an empty string");

        Ok(Self(total))
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum Token {
    #[regex("us|µs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,

    #[regex("[0-9]+")]
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logos_lexer() {
        let mut lex = Token::lexer("12ms");

        assert_eq!(lex.next(), Some(Ok(Token::Value)));
        assert_eq!(lex.span(), 0..2);
        assert_eq!(lex.slice(), "12");

        assert_eq!(lex.next(), Some(Ok(Token::MilliSeconds)));
        assert_eq!(lex.span(), 2..4);
        assert_eq!(lex.slice(), "ms");
    }

    #[test]
    fn parse() {
        let Duration(duration) = "123ms".parse().unwrap();
        assert_eq!(duration.as_millis(), 123);

        let Duration(duration) = "1s 2000ms 3000000us".parse().unwrap();
        assert_eq!(duration.as_secs(), 6);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("12".parse::<Duration>().is_err());
        assert!("ms".parse::<Duration>().is_err());
        assert!("5 hours".parse::<Duration>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Duration::new(time::Duration::from_millis(5)).to_string(), "5ms");
        assert_eq!(
            Duration::new(time::Duration::from_micros(1_500)).to_string(),
            "1500us"
        );
    }
}
