// 🧪 Test-Number Filter
// Publicly documented sandbox numbers must never validate as real cards

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use crate::normalize::{is_all_digits, normalize};

/// Well-known test numbers published by payment processors.
pub const REFERENCE_TEST_NUMBERS: [&str; 12] = [
    "378282246310005",
    "371449635398431",
    "378734493671000",
    "30569309025904",
    "38520000023237",
    "6011111111111117",
    "6011000990139424",
    "5555555555554444",
    "5105105105105100",
    "4111111111111111",
    "4012888888881881",
    "4222222222222",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNumberSet {
    numbers: BTreeSet<String>,
}

impl TestNumberSet {
    /// Build a set from configured entries. Entries are normalized; anything
    /// that is not all digits afterwards is rejected.
    pub fn from_numbers<I, S>(numbers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for raw in numbers {
            let number = normalize(raw.as_ref());
            if number.is_empty() || !is_all_digits(&number) {
                bail!("Test number must contain only digits: {:?}", raw.as_ref());
            }
            set.insert(number);
        }

        Ok(TestNumberSet { numbers: set })
    }

    pub fn reference() -> Self {
        TestNumberSet {
            numbers: REFERENCE_TEST_NUMBERS.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Exact match after normalization; no prefix matching.
    pub fn contains(&self, raw: &str) -> bool {
        self.numbers.contains(&normalize(raw))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.numbers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl Default for TestNumberSet {
    fn default() -> Self {
        Self::reference()
    }
}
