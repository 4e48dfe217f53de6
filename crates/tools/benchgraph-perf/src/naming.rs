//! Benchmark name parsing.
//!
//! Benchmark names follow the convention `<name><<template>>/<size>`, with an
//! optional `_mean`, `_median` or `_stddev` suffix on the aggregate rows the
//! benchmark runner appends after repeated runs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Whole-string pattern for a benchmark name.
///
/// The template group stops at the first `>`, so nested template arguments
/// such as `Foo<Bar<int>>/8` are rejected.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z_]+)<(?P<template>[^>]+)>/(?P<size>[0-9]+)(?:_(?P<stat>mean|median|stddev))?$",
    )
    .expect("benchmark name pattern is a valid regex")
});

/// Aggregate statistic a derived record carries in its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    /// `_mean`
    Mean,
    /// `_median`
    Median,
    /// `_stddev`
    Stddev,
}

impl Statistic {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "mean" => Some(Self::Mean),
            "median" => Some(Self::Median),
            "stddev" => Some(Self::Stddev),
            _ => None,
        }
    }
}

/// Identity of a benchmark record, parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchName {
    /// Benchmark function name (letters and underscores).
    pub name: String,
    /// Template argument between the angle brackets, kept verbatim.
    pub template: String,
    /// Input size.
    pub size: u64,
    /// Aggregate statistic, if this is a derived record.
    pub stat: Option<Statistic>,
}

impl BenchName {
    /// Parse a benchmark name.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let caps = NAME_PATTERN
            .captures(raw)
            .ok_or_else(|| NameError::Mismatch(raw.to_string()))?;

        let size = caps["size"]
            .parse::<u64>()
            .map_err(|_| NameError::SizeOverflow(raw.to_string()))?;

        Ok(Self {
            name: caps["name"].to_string(),
            template: caps["template"].to_string(),
            size,
            stat: caps.name("stat").and_then(|m| Statistic::from_suffix(m.as_str())),
        })
    }

    /// Returns `true` for raw samples, `false` for derived aggregate rows.
    pub fn is_raw(&self) -> bool {
        self.stat.is_none()
    }
}

/// A benchmark name that violates the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name does not match `<name><<template>>/<size>[_stat]`.
    Mismatch(String),
    /// The size component does not fit in 64 bits.
    SizeOverflow(String),
}

impl NameError {
    /// The offending benchmark name.
    pub fn name(&self) -> &str {
        match self {
            Self::Mismatch(name) | Self::SizeOverflow(name) => name,
        }
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch(name) => write!(f, "unrecognized benchmark name: {name}"),
            Self::SizeOverflow(name) => write!(f, "benchmark size out of range: {name}"),
        }
    }
}

impl std::error::Error for NameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_name() {
        let parsed = BenchName::parse("simple_copy<8>/4096").unwrap();
        assert_eq!(parsed.name, "simple_copy");
        assert_eq!(parsed.template, "8");
        assert_eq!(parsed.size, 4096);
        assert_eq!(parsed.stat, None);
        assert!(parsed.is_raw());
    }

    #[test]
    fn parse_stat_suffixes() {
        let cases = [
            ("Foo<8>/100_mean", Statistic::Mean),
            ("Foo<8>/100_median", Statistic::Median),
            ("Foo<8>/100_stddev", Statistic::Stddev),
        ];
        for (raw, stat) in cases {
            let parsed = BenchName::parse(raw).unwrap();
            assert_eq!(parsed.size, 100);
            assert_eq!(parsed.stat, Some(stat));
            assert!(!parsed.is_raw());
        }
    }

    #[test]
    fn template_is_opaque() {
        let parsed = BenchName::parse("push_back<-1>/1").unwrap();
        assert_eq!(parsed.template, "-1");

        let parsed = BenchName::parse("Foo<unsigned, 16>/32").unwrap();
        assert_eq!(parsed.template, "unsigned, 16");
    }

    #[test]
    fn reject_malformed_names() {
        for raw in [
            "Bar_weird!!",
            "Foo/100",
            "Foo<>/100",
            "Foo<8>",
            "Foo<8>/",
            "Foo<8>/abc",
            "Foo2<8>/100",
            "Foo<8>/100_min",
            "Foo<8>/100_mean_extra",
            " Foo<8>/100",
            "Foo<Bar<int>>/8",
        ] {
            let err = BenchName::parse(raw).unwrap_err();
            assert_eq!(err, NameError::Mismatch(raw.to_string()), "{raw}");
        }
    }

    #[test]
    fn reject_oversized_size() {
        let raw = "Foo<8>/99999999999999999999999";
        let err = BenchName::parse(raw).unwrap_err();
        assert_eq!(err, NameError::SizeOverflow(raw.to_string()));
        assert_eq!(err.name(), raw);
    }

    #[test]
    fn error_message_names_the_input() {
        let err = BenchName::parse("Bar_weird!!").unwrap_err();
        assert!(err.to_string().contains("Bar_weird!!"));
    }
}
