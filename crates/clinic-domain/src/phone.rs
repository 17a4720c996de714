//! Phone number validation and search normalization.

/// Number of trailing digits compared when matching phone numbers.
///
/// Long enough to identify a mobile number, short enough to ignore the
/// country code or a national trunk prefix.
pub const PHONE_TAIL_LEN: usize = 9;

/// Validate an international phone number: `+`, a non-zero leading digit,
/// 8–15 digits in total, nothing else.
pub fn is_valid_international(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    if !(8..=15).contains(&digits.len()) {
        return false;
    }
    if digits.starts_with('0') {
        return false;
    }
    digits.chars().all(|c| c.is_ascii_digit())
}

/// Strip everything but ASCII digits.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Trailing digits used for formatting-insensitive phone matching.
///
/// Returns `None` when the input has no digits at all.
pub fn phone_tail(input: &str) -> Option<String> {
    let digits = digits_only(input);
    if digits.is_empty() {
        return None;
    }
    let start = digits.len().saturating_sub(PHONE_TAIL_LEN);
    Some(digits[start..].to_owned())
}
