//! Luhn checksum for order and withdrawal numbers.
//!
//! Only non-empty strings of ASCII digits can be valid. Whitespace, signs and
//! any other character make a number invalid.

/// Returns true if `number` is a non-empty digit string passing the Luhn check.
///
/// # Example
///
/// ```
/// use gophermart_core::luhn::is_valid;
///
/// assert!(is_valid("79927398713"));
/// assert!(!is_valid("79927398710"));
/// assert!(!is_valid("7992 7398 713"));
/// ```
#[must_use]
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    checksum(number.bytes().rev(), false) % 10 == 0
}

/// Computes the digit that completes `payload` into a valid number.
///
/// Returns `None` if `payload` contains anything other than ASCII digits.
#[must_use]
pub fn check_digit(payload: &str) -> Option<u8> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // The check digit takes the rightmost position, so the payload's last
    // digit is the first one doubled.
    let sum = checksum(payload.bytes().rev(), true);
    u8::try_from((10 - sum % 10) % 10).ok()
}

fn checksum(digits_right_to_left: impl Iterator<Item = u8>, double_first: bool) -> u32 {
    digits_right_to_left
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if (i % 2 == 1) != double_first {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}
