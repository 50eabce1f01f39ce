use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Ticker symbol as accepted by the analysis service (e.g. AAPL, MSFT).
/// Input is normalized the way the search box does it: trimmed and
/// uppercased.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol {
    inner: String,
}

impl Symbol {
    pub fn new(symbol: &str) -> Self {
        Self {
            inner: symbol.trim().to_ascii_uppercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl std::str::FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Look-back window for every endpoint that takes a `period` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Period {
    /// Value sent on the wire (the service speaks yfinance period codes).
    pub fn as_query(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }

    /// Short label for the period row in the footer.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::TwoYears => "2Y",
            Self::FiveYears => "5Y",
        }
    }

    pub fn next(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsePeriodError(pub String);

impl std::fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown period: {}", self.0)
    }
}

impl std::error::Error for ParsePeriodError {}

impl std::str::FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::iter()
            .find(|period| {
                period.as_query() == normalized
                    || period.label().eq_ignore_ascii_case(&normalized)
            })
            .ok_or_else(|| ParsePeriodError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Period, Symbol};

    #[test]
    fn normalizes_symbol_input() {
        assert_eq!(Symbol::new("  aapl ").as_str(), "AAPL");
        assert!(Symbol::new("   ").is_empty());
    }

    #[test]
    fn parses_period_codes_and_labels() {
        assert_eq!("6mo".parse::<Period>(), Ok(Period::SixMonths));
        assert_eq!("1Y".parse::<Period>(), Ok(Period::OneYear));
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn period_cycle_wraps() {
        assert_eq!(Period::FiveYears.next(), Period::OneMonth);
        assert_eq!(Period::OneMonth.prev(), Period::FiveYears);
        assert_eq!(Period::SixMonths.next().prev(), Period::SixMonths);
    }
}
