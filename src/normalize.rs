// 🧹 Normalizer - raw input → digit string
// Strips whitespace so numbers can be pasted straight from form fields

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Remove every whitespace character from `raw`.
///
/// Nothing else is touched: dashes, letters and punctuation pass through
/// and fail the later stages on their own.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True when every character is an ASCII digit (vacuously true for "").
pub fn is_all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Render a number for logs, keeping only the last four characters.
pub fn mask(s: &str) -> String {
    let count = s.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }

    let hidden = count - 4;
    s.chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
