// ✅ Card Validator - checksum + network + test-number exclusion
// Combines the three checks into a single verdict, with an explanation on demand

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::config::ValidatorConfig;
use crate::luhn;
use crate::networks::NetworkTable;
use crate::normalize::{is_all_digits, mask, normalize};
use crate::test_numbers::TestNumberSet;

// ============================================================================
// VALIDATION REPORT
// ============================================================================

/// Why a number was rejected. Checks run in this order; the first failure
/// is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rejection {
    InvalidCharacters,
    ChecksumFailed,
    UnknownNetwork,
    TestNumber,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::InvalidCharacters => "Invalid Characters",
            Rejection::ChecksumFailed => "Checksum Failed",
            Rejection::UnknownNetwork => "Unknown Network",
            Rejection::TestNumber => "Test Number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Normalized number with all but the last four characters hidden
    pub masked: String,
    pub length: usize,
    pub checksum_ok: bool,
    pub network: Option<String>,
    pub is_test_number: bool,
    pub valid: bool,
    pub rejection: Option<Rejection>,
}

impl ValidationReport {
    pub fn summary(&self) -> String {
        match self.rejection {
            None => format!(
                "{} valid ({})",
                self.masked,
                self.network.as_deref().unwrap_or("Unknown")
            ),
            Some(reason) => format!("{} invalid: {}", self.masked, reason.as_str()),
        }
    }
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

/// Aggregate of many reports, used by the batch CLI mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub by_network: BTreeMap<String, usize>,
    pub by_rejection: BTreeMap<Rejection, usize>,
}

impl BatchSummary {
    pub fn record(&mut self, report: &ValidationReport) {
        self.total += 1;
        if report.valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
        if let Some(network) = &report.network {
            *self.by_network.entry(network.clone()).or_insert(0) += 1;
        }
        if let Some(reason) = report.rejection {
            *self.by_rejection.entry(reason).or_insert(0) += 1;
        }
    }
}

// ============================================================================
// CARD VALIDATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct CardValidator {
    networks: NetworkTable,
    test_numbers: TestNumberSet,

    /// Network name → index into `networks`, built once at construction
    predicates: HashMap<String, usize>,
}

impl CardValidator {
    pub fn new(networks: NetworkTable, test_numbers: TestNumberSet) -> Self {
        let predicates = networks
            .names()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        CardValidator {
            networks,
            test_numbers,
            predicates,
        }
    }

    /// Reference networks and reference test numbers
    pub fn reference() -> Self {
        CardValidator::new(NetworkTable::reference(), TestNumberSet::reference())
    }

    pub fn from_config(config: ValidatorConfig) -> Result<Self> {
        let (networks, test_numbers) = config.into_tables()?;
        info!(
            networks = networks.len(),
            test_numbers = test_numbers.len(),
            "Loaded card validator configuration"
        );
        Ok(CardValidator::new(networks, test_numbers))
    }

    /// True iff the checksum passes, a network matches, and the number is
    /// not a known test number.
    pub fn validate(&self, raw: &str) -> bool {
        let digits = normalize(raw);
        is_all_digits(&digits)
            && luhn::verify_checksum(&digits)
            && self.networks.classify(&digits).is_some()
            && !self.test_numbers.contains(&digits)
    }

    /// Full explanation of the verdict for `raw`
    pub fn report(&self, raw: &str) -> ValidationReport {
        let digits = normalize(raw);
        let checksum_ok = luhn::verify_checksum(&digits);
        let network = self.networks.classify(&digits).map(|p| p.name.clone());
        let is_test_number = self.test_numbers.contains(&digits);

        let rejection = if !is_all_digits(&digits) {
            Some(Rejection::InvalidCharacters)
        } else if !checksum_ok {
            Some(Rejection::ChecksumFailed)
        } else if network.is_none() {
            Some(Rejection::UnknownNetwork)
        } else if is_test_number {
            Some(Rejection::TestNumber)
        } else {
            None
        };

        let masked = mask(&digits);
        if let Some(reason) = rejection {
            debug!(number = %masked, reason = reason.as_str(), "Card number rejected");
        }

        ValidationReport {
            masked,
            length: digits.chars().count(),
            checksum_ok,
            network,
            is_test_number,
            valid: rejection.is_none(),
            rejection,
        }
    }

    /// Name of the first network whose pattern matches
    pub fn network_of(&self, raw: &str) -> Option<&str> {
        self.networks
            .classify(&normalize(raw))
            .map(|p| p.name.as_str())
    }

    /// Check `raw` against the named network's pattern only. Unknown names
    /// never match.
    pub fn is_network(&self, name: &str, raw: &str) -> bool {
        self.predicates
            .get(name)
            .map_or(false, |&i| self.networks.patterns()[i].matches(&normalize(raw)))
    }

    /// Predicate for one configured network, e.g. `predicate("Visa")`.
    pub fn predicate<'a>(&'a self, name: &str) -> Option<impl Fn(&str) -> bool + 'a> {
        let pattern = &self.networks.patterns()[*self.predicates.get(name)?];
        Some(move |raw: &str| pattern.matches(&normalize(raw)))
    }

    pub fn verify_checksum(&self, raw: &str) -> bool {
        luhn::verify_checksum(raw)
    }

    pub fn is_test_number(&self, raw: &str) -> bool {
        self.test_numbers.contains(raw)
    }

    pub fn networks(&self) -> &NetworkTable {
        &self.networks
    }

    pub fn test_numbers(&self) -> &TestNumberSet {
        &self.test_numbers
    }
}

impl Default for CardValidator {
    fn default() -> Self {
        Self::reference()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luhn::check_digit;
    use crate::test_numbers::REFERENCE_TEST_NUMBERS;

    /// Luhn-valid sample numbers outside the test-number list
    const SAMPLES: [(&str, &str); 16] = [
        ("4000000000000002", "Visa"),
        ("4242424242424242", "Visa"),
        ("4000000000006", "Visa"),
        ("4444333322221111", "Visa"),
        ("5200828282828210", "MasterCard"),
        ("5100000000000008", "MasterCard"),
        ("30000000000004", "DinersClub"),
        ("30500000000003", "DinersClub"),
        ("36000000000008", "DinersClub"),
        ("38000000000006", "DinersClub"),
        ("340000000000009", "Amex"),
        ("370000000000002", "Amex"),
        ("378282246310013", "Amex"),
        ("6011000000000004", "Discover"),
        ("6500000000000002", "Discover"),
        ("6599999999999995", "Discover"),
    ];

    /// Prefixes covering every range edge, and the lengths to generate
    const GENERATED: [(&str, &[&str], &[usize]); 5] = [
        ("Visa", &["4"], &[13, 16]),
        ("MasterCard", &["51", "52", "53", "54", "55"], &[16]),
        ("DinersClub", &["300", "301", "302", "303", "304", "305", "36", "38"], &[14]),
        ("Amex", &["34", "37"], &[15]),
        ("Discover", &["6011", "6500", "6599", "65"], &[16]),
    ];

    /// Sixteen Luhn-valid numbers per network, cycling through its prefixes
    fn generated_samples(prefixes: &[&str], lengths: &[usize]) -> Vec<String> {
        (0..16usize)
            .map(|i| {
                let prefix = prefixes[i % prefixes.len()];
                let length = lengths[i % lengths.len()];
                let width = length - 1 - prefix.len();
                let fill = format!("{:0width$}", i * 7919 + 13, width = width);
                let payload = format!("{}{}", prefix, fill);
                format!("{}{}", payload, check_digit(&payload).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_samples_validate() {
        let validator = CardValidator::reference();
        for (number, network) in SAMPLES {
            assert!(validator.validate(number), "{} should be valid", number);
            assert_eq!(validator.network_of(number), Some(network));
        }
    }

    #[test]
    fn test_sixteen_samples_per_network() {
        let validator = CardValidator::reference();
        for (network, prefixes, lengths) in GENERATED {
            let samples = generated_samples(prefixes, lengths);
            assert_eq!(samples.len(), 16);
            for number in &samples {
                assert!(!validator.is_test_number(number));
                assert!(validator.validate(number), "{} should be valid", number);
                assert_eq!(validator.network_of(number), Some(network));
            }
            for prefix in prefixes {
                assert!(samples.iter().any(|n| n.starts_with(prefix)), "{} not covered", prefix);
            }
        }
    }

    #[test]
    fn test_just_outside_prefix_edges() {
        let validator = CardValidator::reference();
        for (prefix, length) in [("50", 16), ("56", 16), ("306", 14), ("35", 15), ("6010", 16), ("66", 16)] {
            let payload = format!("{}{}", prefix, "0".repeat(length - 1 - prefix.len()));
            let number = format!("{}{}", payload, check_digit(&payload).unwrap());
            assert!(validator.verify_checksum(&number));
            assert_eq!(validator.network_of(&number), None, "{} should be unknown", number);
            assert!(!validator.validate(&number));
        }
    }

    #[test]
    fn test_reference_test_numbers_never_validate() {
        let validator = CardValidator::reference();
        for number in REFERENCE_TEST_NUMBERS {
            assert!(validator.verify_checksum(number));
            assert!(validator.network_of(number).is_some());
            assert!(!validator.validate(number), "{} is a test number", number);

            let report = validator.report(number);
            assert_eq!(report.rejection, Some(Rejection::TestNumber));
        }
    }

    #[test]
    fn test_visa_scenario() {
        let validator = CardValidator::reference();
        // Still a test number, but its network is reported
        assert_eq!(validator.network_of("4111111111111111"), Some("Visa"));

        let no_test_numbers = TestNumberSet::from_numbers(Vec::<String>::new()).unwrap();
        let custom = CardValidator::new(NetworkTable::reference(), no_test_numbers);
        assert!(custom.validate("4111111111111111"));
        assert_eq!(custom.network_of("4111111111111111"), Some("Visa"));
    }

    #[test]
    fn test_discover_test_number_scenario() {
        let validator = CardValidator::reference();
        assert!(validator.verify_checksum("6011111111111117"));
        assert_eq!(validator.network_of("6011111111111117"), Some("Discover"));
        assert!(!validator.validate("6011111111111117"));
    }

    #[test]
    fn test_whitespace_insensitive() {
        let validator = CardValidator::reference();
        assert_eq!(
            validator.validate("4000 0000 0000 0002"),
            validator.validate("4000000000000002")
        );
        assert!(validator.validate("4000 0000 0000 0002"));
        assert_eq!(validator.network_of(" 3400 000000 00009 "), Some("Amex"));
        assert!(validator.is_test_number("4111 1111 1111 1111"));
    }

    #[test]
    fn test_empty_input() {
        let validator = CardValidator::reference();
        assert!(validator.verify_checksum(""));
        assert!(!validator.validate(""));
        assert_eq!(validator.network_of(""), None);
        assert_eq!(validator.report("").rejection, Some(Rejection::UnknownNetwork));
        assert!(!validator.validate("   \t\n"));
    }

    #[test]
    fn test_unknown_prefix() {
        let validator = CardValidator::reference();
        assert!(validator.verify_checksum("9999999999999995"));
        assert!(!validator.validate("9999999999999995"));
        assert_eq!(validator.network_of("9999999999999995"), None);
    }

    #[test]
    fn test_garbage_input_is_false() {
        let validator = CardValidator::reference();
        let long = "4".repeat(10_000);
        for raw in ["abc", "4111-1111-1111-1111", "０１２３", "💳", long.as_str()] {
            assert!(!validator.validate(raw), "{:?} should be invalid", raw);
        }
        assert_eq!(
            validator.report("4000-0000-0000-0002").rejection,
            Some(Rejection::InvalidCharacters)
        );
    }

    #[test]
    fn test_bad_checksum_with_valid_network() {
        let validator = CardValidator::reference();
        let report = validator.report("4000000000000003");
        assert_eq!(report.network.as_deref(), Some("Visa"));
        assert!(!report.checksum_ok);
        assert_eq!(report.rejection, Some(Rejection::ChecksumFailed));
        assert!(!report.valid);
    }

    #[test]
    fn test_is_network_and_predicates() {
        let validator = CardValidator::reference();
        assert!(validator.is_network("Visa", "4000000000000002"));
        assert!(!validator.is_network("MasterCard", "4000000000000002"));
        assert!(validator.is_network("Amex", "3782 822463 10005"));
        assert!(!validator.is_network("JCB", "3530111333300000"));

        let is_diners = validator.predicate("DinersClub").unwrap();
        assert!(is_diners("36000000000008"));
        assert!(!is_diners("6011000000000004"));
        assert!(validator.predicate("JCB").is_none());
    }

    #[test]
    fn test_every_network_has_a_predicate() {
        let validator = CardValidator::reference();
        for (number, network) in SAMPLES {
            for name in validator.networks().names() {
                assert_eq!(validator.is_network(name, number), name == network);
            }
        }
    }

    #[test]
    fn test_report_agrees_with_validate() {
        let validator = CardValidator::reference();
        let inputs = [
            "",
            "   ",
            "4000000000000002",
            "4000 0000 0000 0002",
            "4000-0000-0000-0002",
            "4111111111111111",
            "6011111111111117",
            "4000000000000003",
            "abc",
            "9999999999999995",
            "40000000000000006",
        ];
        for raw in inputs.iter().copied().chain(REFERENCE_TEST_NUMBERS) {
            let report = validator.report(raw);
            assert_eq!(report.valid, validator.validate(raw));
            assert_eq!(report.valid, report.rejection.is_none());
        }
    }

    #[test]
    fn test_report_masks_number() {
        let report = CardValidator::reference().report("4000 0000 0000 0002");
        assert_eq!(report.masked, "************0002");
        assert_eq!(report.length, 16);
        assert_eq!(report.summary(), "************0002 valid (Visa)");
    }

    #[test]
    fn test_custom_config() {
        let json = r#"{
            "networks": [{"name": "JCB", "prefixes": ["3528-3589"], "lengths": [16]}],
            "test_numbers": ["3530111333300000"]
        }"#;
        let validator = CardValidator::from_config(ValidatorConfig::from_json(json).unwrap()).unwrap();

        let payload = "352800000000000";
        let number = format!("{}{}", payload, check_digit(payload).unwrap());
        assert!(validator.validate(&number));
        assert_eq!(validator.network_of(&number), Some("JCB"));
        assert!(!validator.validate("3530111333300000"));
        // Reference networks are gone
        assert!(!validator.validate("4000000000000002"));
    }

    #[test]
    fn test_batch_summary() {
        let validator = CardValidator::reference();
        let mut summary = BatchSummary::default();
        for raw in ["4000000000000002", "4111111111111111", "abc", "9999999999999995"] {
            summary.record(&validator.report(raw));
        }

        assert_eq!(summary.total, 4);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 3);
        assert_eq!(summary.by_network.get("Visa"), Some(&2));
        assert_eq!(summary.by_rejection.get(&Rejection::TestNumber), Some(&1));
        assert_eq!(summary.by_rejection.get(&Rejection::InvalidCharacters), Some(&1));
        assert_eq!(summary.by_rejection.get(&Rejection::UnknownNetwork), Some(&1));
    }

    #[test]
    fn test_validator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CardValidator>();
    }
}
