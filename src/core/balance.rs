//! Balance formatting: smallest-unit decimal strings to display units.
//!
//! Pure string arithmetic, so arbitrarily large balances keep every digit.

/// Display scale of the Keeta token (1 KTA = 10^9 smallest units)
pub const KTA_DECIMALS: u32 = 9;

/// Divide `raw` by 10^`decimals` and render exactly `decimals` fractional digits.
///
/// Accepts an optional sign and an optional fractional part; digits beyond the
/// display precision are rounded half away from zero. Returns `None` when `raw`
/// is not a decimal number, so callers can show it unformatted.
pub fn format_balance(raw: &str, decimals: u32) -> Option<String> {
    let parsed = parse_decimal(raw)?;
    let decimals = decimals as usize;

    let mut units: Vec<u8> = parsed.int.bytes().map(|b| b - b'0').collect();
    if parsed.frac.as_bytes().first().is_some_and(|d| *d >= b'5') {
        increment(&mut units);
    }

    // Left-pad so there is at least one integer digit once the point is placed.
    let width = decimals.saturating_add(1);
    if units.len() < width {
        let pad = width - units.len();
        units.splice(0..0, std::iter::repeat(0).take(pad));
    }
    let split = units.len() - decimals;
    let int_part = strip_leading_zeros(&units[..split]);
    let frac_part: String = units[split..].iter().map(|d| char::from(b'0' + d)).collect();

    let is_zero = units.iter().all(|d| *d == 0);
    let sign = if parsed.negative && !is_zero { "-" } else { "" };
    if decimals == 0 {
        Some(format!("{}{}", sign, int_part))
    } else {
        Some(format!("{}{}.{}", sign, int_part, frac_part))
    }
}

struct ParsedDecimal<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
}

fn parse_decimal(raw: &str) -> Option<ParsedDecimal<'_>> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (body, ""),
    };
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !all_digits(frac) {
        return None;
    }
    Some(ParsedDecimal { negative, int, frac })
}

fn increment(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == 9 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

fn strip_leading_zeros(digits: &[u8]) -> String {
    let first = digits.iter().position(|d| *d != 0).unwrap_or(digits.len().saturating_sub(1));
    digits[first..].iter().map(|d| char::from(b'0' + d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_tokens() {
        assert_eq!(format_balance("9000000000", KTA_DECIMALS).as_deref(), Some("9.000000000"));
        assert_eq!(format_balance("0", KTA_DECIMALS).as_deref(), Some("0.000000000"));
    }

    #[test]
    fn test_fractional_tokens() {
        assert_eq!(format_balance("1", KTA_DECIMALS).as_deref(), Some("0.000000001"));
        assert_eq!(format_balance("123456789", KTA_DECIMALS).as_deref(), Some("0.123456789"));
        assert_eq!(format_balance("1500000000", KTA_DECIMALS).as_deref(), Some("1.500000000"));
    }

    #[test]
    fn test_large_balance_keeps_every_digit() {
        assert_eq!(
            format_balance("123456789012345678901234567890", KTA_DECIMALS).as_deref(),
            Some("123456789012345678901.234567890")
        );
    }

    #[test]
    fn test_sign_and_rounding() {
        assert_eq!(format_balance("-2500000000", KTA_DECIMALS).as_deref(), Some("-2.500000000"));
        assert_eq!(format_balance("1.5", KTA_DECIMALS).as_deref(), Some("0.000000002"));
        assert_eq!(format_balance("999999999.9", KTA_DECIMALS).as_deref(), Some("1.000000000"));
        assert_eq!(format_balance("-0.2", KTA_DECIMALS).as_deref(), Some("0.000000000"));
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(format_balance("0042", 0).as_deref(), Some("42"));
    }

    #[test]
    fn test_wide_scale_pads_once() {
        let formatted = format_balance("7", 200_000).unwrap();
        assert_eq!(formatted.len(), "0.".len() + 200_000);
        assert!(formatted.starts_with("0.000"));
        assert!(formatted.ends_with("007"));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert_eq!(format_balance("pending", KTA_DECIMALS), None);
        assert_eq!(format_balance("", KTA_DECIMALS), None);
        assert_eq!(format_balance("-", KTA_DECIMALS), None);
        assert_eq!(format_balance("1.2.3", KTA_DECIMALS), None);
        assert_eq!(format_balance("0x10", KTA_DECIMALS), None);
    }
}
