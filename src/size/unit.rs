//! Units a byte count can be reported in.
//!
//! Every unit is binary: `KB` and `KiB` both mean 1024 bytes, `MB` and `MiB`
//! both mean 1024², and so on. There is no power-of-1000 interpretation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::SizeError;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;
const TIB: u64 = GIB * 1024;

/// A unit requested by the caller.
///
/// Several spellings map onto each variant (see [`SizeUnit::SPELLINGS`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    /// Raw bytes (`BYTES`, `B`).
    Bytes,
    /// 1024 bytes (`KB`, `KIB`).
    Kilobytes,
    /// 1024² bytes (`MB`, `MIB`).
    Megabytes,
    /// 1024³ bytes (`GB`, `GIB`).
    Gigabytes,
    /// 1024⁴ bytes (`TB`, `TIB`).
    Terabytes,
    /// Formatting mode: pick the largest fitting unit and render a string.
    Human,
}

/// Ladder scanned by [`format_human`], largest first.
const HUMAN_LADDER: [SizeUnit; 4] = [
    SizeUnit::Terabytes,
    SizeUnit::Gigabytes,
    SizeUnit::Megabytes,
    SizeUnit::Kilobytes,
];

impl SizeUnit {
    /// Accepted names (matched case-insensitively) and the unit they select.
    pub const SPELLINGS: [(&'static str, SizeUnit); 11] = [
        ("BYTES", Self::Bytes),
        ("B", Self::Bytes),
        ("KB", Self::Kilobytes),
        ("KIB", Self::Kilobytes),
        ("MB", Self::Megabytes),
        ("MIB", Self::Megabytes),
        ("GB", Self::Gigabytes),
        ("GIB", Self::Gigabytes),
        ("TB", Self::Terabytes),
        ("TIB", Self::Terabytes),
        ("HUMAN", Self::Human),
    ];

    /// Parses a unit name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::InvalidFormat`] listing every supported name.
    pub fn parse(name: &str) -> Result<Self, SizeError> {
        Self::SPELLINGS
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(name))
            .map(|(_, unit)| *unit)
            .ok_or_else(|| SizeError::invalid_format(name, supported_units()))
    }

    /// Bytes per unit, or `None` for [`SizeUnit::Human`].
    #[must_use]
    pub fn multiplier(self) -> Option<u64> {
        match self {
            Self::Bytes => Some(1),
            Self::Kilobytes => Some(KIB),
            Self::Megabytes => Some(MIB),
            Self::Gigabytes => Some(GIB),
            Self::Terabytes => Some(TIB),
            Self::Human => None,
        }
    }

    /// Short label used in human-readable output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bytes => "B",
            Self::Kilobytes => "KB",
            Self::Megabytes => "MB",
            Self::Gigabytes => "GB",
            Self::Terabytes => "TB",
            Self::Human => "human",
        }
    }

    /// Converts a byte count into this unit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn convert(self, bytes: u64) -> SizeValue {
        match self.multiplier() {
            Some(multiplier) => SizeValue::Quantity(bytes as f64 / multiplier as f64),
            None => SizeValue::Human(format_human(bytes)),
        }
    }
}

impl FromStr for SizeUnit {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every accepted unit name, for error messages.
#[must_use]
pub fn supported_units() -> String {
    let names: Vec<&str> = SizeUnit::SPELLINGS
        .iter()
        .map(|(spelling, _)| *spelling)
        .filter(|spelling| *spelling != "HUMAN")
        .collect();
    format!("{} or HUMAN", names.join(", "))
}

/// Renders a byte count with the largest unit it fills, to two decimals.
///
/// Counts below 1 KB are printed as whole bytes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_human(bytes: u64) -> String {
    for unit in HUMAN_LADDER {
        let Some(multiplier) = unit.multiplier() else {
            continue;
        };
        if bytes >= multiplier {
            return format!("{:.2} {}", bytes as f64 / multiplier as f64, unit.label());
        }
    }
    format!("{bytes} B")
}

/// A converted size: a plain number, or a human-readable string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SizeValue {
    /// `bytes / multiplier`, unrounded.
    Quantity(f64),
    /// Output of [`format_human`].
    Human(String),
}

impl SizeValue {
    /// Returns the numeric value, if this is not a human-readable string.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Quantity(value) => Some(*value),
            Self::Human(_) => None,
        }
    }

    /// Returns the human-readable string, if this is one.
    #[must_use]
    pub fn as_human(&self) -> Option<&str> {
        match self {
            Self::Quantity(_) => None,
            Self::Human(text) => Some(text),
        }
    }
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantity(value) => write!(f, "{value}"),
            Self::Human(text) => f.write_str(text),
        }
    }
}
