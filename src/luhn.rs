// 🔢 Luhn mod-10 checksum
// See https://en.wikipedia.org/wiki/Luhn_algorithm

use crate::normalize::{is_all_digits, normalize};

// ============================================================================
// CHECKSUM
// ============================================================================

/// Luhn sum of a digit string. Returns `None` if any character is not an
/// ASCII digit.
fn luhn_sum(digits: &str) -> Option<u32> {
    if !is_all_digits(digits) {
        return None;
    }

    let sum = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    Some(sum)
}

/// Verify the Luhn checksum of `raw` after whitespace normalization.
///
/// Any non-digit character fails the check. The empty string passes
/// (its sum is 0), so callers need network classification to reject it.
pub fn verify_checksum(raw: &str) -> bool {
    luhn_sum(&normalize(raw)).map_or(false, |sum| sum % 10 == 0)
}

/// Digit that, appended to `payload`, makes a Luhn-valid number.
pub fn check_digit(payload: &str) -> Option<u8> {
    // Appending shifts every payload digit one position, so sum the payload
    // with a placeholder zero in the check position.
    let mut padded = normalize(payload);
    padded.push('0');
    let sum = luhn_sum(&padded)?;
    Some(((10 - sum % 10) % 10) as u8)
}

// ============================================================================
// TESTS
// ============================================================================
