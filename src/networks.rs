// 💳 Network Classification - Patterns as Data
// Prefix/length patterns that identify the card network (issuer)

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::normalize::is_all_digits;

// ============================================================================
// PREFIX RANGE
// ============================================================================

/// Inclusive range of leading digits, e.g. `51-55` or a single prefix `4`.
///
/// Both bounds have the same width, so comparing the first `width` digits of
/// a number as strings is the same as comparing them numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrefixRange {
    start: String,
    end: String,
}

impl PrefixRange {
    /// Single prefix: numbers starting with exactly `prefix`.
    pub fn single(prefix: &str) -> Result<Self> {
        Self::between(prefix, prefix)
    }

    /// Range of prefixes from `start` to `end`, inclusive.
    pub fn between(start: &str, end: &str) -> Result<Self> {
        if start.is_empty() || !is_all_digits(start) || !is_all_digits(end) {
            bail!("Prefix bounds must be non-empty digit strings: {}-{}", start, end);
        }
        if start.len() != end.len() {
            bail!("Prefix bounds must have the same width: {}-{}", start, end);
        }
        if start > end {
            bail!("Prefix range is reversed: {}-{}", start, end);
        }

        Ok(PrefixRange {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Number of leading digits this range looks at
    pub fn width(&self) -> usize {
        self.start.len()
    }

    /// Check if `digits` begins with a prefix inside this range
    pub fn matches(&self, digits: &str) -> bool {
        match digits.get(..self.width()) {
            Some(head) => head >= self.start.as_str() && head <= self.end.as_str(),
            None => false,
        }
    }
}

impl TryFrom<String> for PrefixRange {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        match value.split_once('-') {
            Some((start, end)) => PrefixRange::between(start.trim(), end.trim()),
            None => PrefixRange::single(value.trim()),
        }
    }
}

impl From<PrefixRange> for String {
    fn from(range: PrefixRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for PrefixRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

// ============================================================================
// NETWORK PATTERN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPattern {
    /// Network name reported to callers (e.g. "Visa")
    pub name: String,

    /// Accepted leading digits
    pub prefixes: Vec<PrefixRange>,

    /// Accepted total lengths, in digits
    pub lengths: Vec<usize>,
}

impl NetworkPattern {
    pub fn new(name: impl Into<String>, prefixes: Vec<PrefixRange>, lengths: Vec<usize>) -> Self {
        NetworkPattern {
            name: name.into(),
            prefixes,
            lengths,
        }
    }

    /// Check if the whole normalized string belongs to this network.
    ///
    /// Anchored: every character must be a digit, the length must be one of
    /// `lengths`, and the leading digits must fall in one of `prefixes`.
    pub fn matches(&self, digits: &str) -> bool {
        is_all_digits(digits)
            && self.lengths.contains(&digits.len())
            && self.prefixes.iter().any(|p| p.matches(digits))
    }

    fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Network pattern has an empty name");
        }
        if self.prefixes.is_empty() {
            bail!("Network {} has no prefixes", self.name);
        }
        if self.lengths.is_empty() {
            bail!("Network {} has no lengths", self.name);
        }
        if let Some(prefix) = self
            .prefixes
            .iter()
            .find(|p| self.lengths.iter().all(|&len| p.width() > len))
        {
            bail!("Network {} prefix {} is longer than every allowed length", self.name, prefix);
        }
        Ok(())
    }
}

// ============================================================================
// NETWORK TABLE
// ============================================================================

/// Ordered list of network patterns. The first matching pattern wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTable {
    patterns: Vec<NetworkPattern>,
}

impl NetworkTable {
    /// Build a table, keeping the given order.
    pub fn from_patterns(patterns: Vec<NetworkPattern>) -> Result<Self> {
        let mut seen = HashSet::new();
        for pattern in &patterns {
            pattern.check()?;
            if !seen.insert(pattern.name.as_str()) {
                bail!("Duplicate network name: {}", pattern.name);
            }
        }

        Ok(NetworkTable { patterns })
    }

    /// Load patterns from a JSON array
    pub fn from_json(json: &str) -> Result<Self> {
        let patterns: Vec<NetworkPattern> =
            serde_json::from_str(json).context("Failed to parse network patterns JSON")?;
        NetworkTable::from_patterns(patterns)
    }

    /// The reference networks: Visa, MasterCard, DinersClub, Amex, Discover.
    pub fn reference() -> Self {
        NetworkTable {
            patterns: reference_patterns(),
        }
    }

    /// First network whose pattern matches the normalized digits
    pub fn classify(&self, digits: &str) -> Option<&NetworkPattern> {
        self.patterns.iter().find(|p| p.matches(digits))
    }

    pub fn get(&self, name: &str) -> Option<&NetworkPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Network names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    pub fn patterns(&self) -> &[NetworkPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::reference()
    }
}

fn range(start: &str, end: &str) -> PrefixRange {
    PrefixRange {
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn prefix(p: &str) -> PrefixRange {
    range(p, p)
}

/// Adapt this list to the networks you accept.
fn reference_patterns() -> Vec<NetworkPattern> {
    vec![
        NetworkPattern::new("Visa", vec![prefix("4")], vec![13, 16]),
        NetworkPattern::new("MasterCard", vec![range("51", "55")], vec![16]),
        NetworkPattern::new(
            "DinersClub",
            vec![range("300", "305"), prefix("36"), prefix("38")],
            vec![14],
        ),
        NetworkPattern::new("Amex", vec![prefix("34"), prefix("37")], vec![15]),
        NetworkPattern::new("Discover", vec![prefix("6011"), prefix("65")], vec![16]),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
