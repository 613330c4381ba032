// Card Validation - Core Library
// Luhn checksum, card-network classification, and test-number exclusion

pub mod normalize;
pub mod luhn;
pub mod networks;
pub mod test_numbers;
pub mod config;
pub mod validator;

use std::sync::OnceLock;

// Re-export commonly used types
pub use config::{ValidatorConfig, CONFIG_ENV_VAR};
pub use luhn::check_digit;
pub use networks::{NetworkPattern, NetworkTable, PrefixRange};
pub use normalize::{mask, normalize};
pub use test_numbers::{TestNumberSet, REFERENCE_TEST_NUMBERS};
pub use validator::{BatchSummary, CardValidator, Rejection, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static REFERENCE: OnceLock<CardValidator> = OnceLock::new();

/// Process-wide validator over the reference tables, built on first use.
pub fn reference_validator() -> &'static CardValidator {
    REFERENCE.get_or_init(CardValidator::reference)
}

// ============================================================================
// FREE FUNCTIONS (reference tables)
// ============================================================================

/// True iff the checksum passes, a network matches, and the number is not a test number.
pub fn validate(raw: &str) -> bool {
    reference_validator().validate(raw)
}

pub fn network_of(raw: &str) -> Option<&'static str> {
    reference_validator().network_of(raw)
}

pub fn is_network(name: &str, raw: &str) -> bool {
    reference_validator().is_network(name, raw)
}

pub fn verify_checksum(raw: &str) -> bool {
    luhn::verify_checksum(raw)
}

pub fn is_test_number(raw: &str) -> bool {
    reference_validator().is_test_number(raw)
}

pub fn is_visa(raw: &str) -> bool {
    is_network("Visa", raw)
}

pub fn is_mastercard(raw: &str) -> bool {
    is_network("MasterCard", raw)
}

pub fn is_diners_club(raw: &str) -> bool {
    is_network("DinersClub", raw)
}

pub fn is_amex(raw: &str) -> bool {
    is_network("Amex", raw)
}

pub fn is_discover(raw: &str) -> bool {
    is_network("Discover", raw)
}
