//! Total per-value coercions. Every function here degrades gracefully:
//! the worst outcome for malformed input is an empty string or the trimmed
//! raw value, never an error.

use chrono::NaiveDate;

/// Date patterns tried in order; the first full match wins.
pub const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

const CURRENCY_CODES: [&str; 7] = ["USD", "EUR", "GBP", "CAD", "AUD", "INR", "JPY"];

/// Characters commonly mangled by OCR in scanned documents.
fn ocr_correct(c: char) -> char {
    match c {
        'O' | 'o' => '0',
        'I' | 'l' | '|' => '1',
        'S' => '5',
        'B' => '8',
        _ => c,
    }
}

/// Trim ends and collapse internal whitespace runs to a single space.
pub fn clean_string(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_email(value: &str) -> String {
    clean_string(value).to_lowercase()
}

/// Digit content after OCR correction; 11-digit numbers with a leading 1
/// drop the US country code.
pub fn normalize_phone(value: &str) -> String {
    let corrected: String = clean_string(value).chars().map(ocr_correct).collect();
    let digits: String = corrected.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

/// Capitalize the first letter of each alphabetic run, lower-case the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alphabetic = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }
    out
}

/// Parse against [`DATE_FORMATS`], emitting ISO `YYYY-MM-DD`. Unparseable
/// non-empty input keeps the trimmed raw value verbatim.
pub fn parse_date(value: &str) -> String {
    let raw = clean_string(value);
    if raw.is_empty() {
        return raw;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, fmt) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw
}

/// Parse a monetary amount: strips currency codes/symbols and OCR noise,
/// resolves decimal-vs-grouping separators, rounds to 2 decimal places.
/// Returns `None` when nothing numeric remains.
pub fn parse_amount(value: &str) -> Option<f64> {
    let raw = clean_string(value);
    if raw.is_empty() {
        return None;
    }
    let raw = raw.replace(' ', "");
    let raw = strip_currency_codes(&raw);
    let raw: String = raw.chars().filter(|c| !matches!(*c, '$' | '€' | '£')).collect();
    let mut raw: String = raw.chars().map(ocr_correct).collect();

    let has_comma = raw.contains(',');
    let has_dot = raw.contains('.');
    if has_comma && has_dot {
        // Whichever separator occurs last is the decimal separator; the
        // other is grouping. Handles both 1,234.50 and 1.234,50.
        let last_comma = raw.rfind(',');
        let last_dot = raw.rfind('.');
        if last_comma > last_dot {
            raw = raw.replace('.', "").replace(',', ".");
        } else {
            raw = raw.replace(',', "");
        }
    } else if has_comma && raw.matches(',').count() == 1 {
        // A lone comma with 1-2 trailing digits is a decimal separator.
        let (left, right) = raw.split_once(',').unwrap_or((raw.as_str(), ""));
        raw = if right.len() == 1 || right.len() == 2 {
            format!("{left}.{right}")
        } else {
            format!("{left}{right}")
        };
    } else {
        raw = raw.replace(',', "");
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, '.' | '-'))
        .collect();
    let parsed: f64 = cleaned.parse().ok()?;
    Some((parsed * 100.0).round() / 100.0)
}

/// Two-decimal rendering for normalized amounts.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

fn strip_currency_codes(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let matched = CURRENCY_CODES.iter().find(|code| {
            bytes.len() - i >= code.len()
                && bytes[i..i + code.len()].eq_ignore_ascii_case(code.as_bytes())
        });
        match matched {
            Some(code) => i += code.len(),
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    // Only whole ASCII substrings were removed, so the remainder is valid
    // UTF-8; the fallback is unreachable.
    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}

/// Infer a currency from symbols or codes embedded in raw amount text.
pub fn detect_currency(value: &str) -> String {
    let raw = clean_string(value);
    if raw.is_empty() {
        return "USD".to_string();
    }
    let upper = raw.to_uppercase();
    if upper.contains("EUR") || raw.contains('€') {
        return "EUR".to_string();
    }
    if upper.contains("GBP") || raw.contains('£') {
        return "GBP".to_string();
    }
    if upper.contains("CAD") {
        return "CAD".to_string();
    }
    if upper.contains("AUD") {
        return "AUD".to_string();
    }
    if upper.contains("INR") || raw.contains('₹') {
        return "INR".to_string();
    }
    if upper.contains("JPY") || raw.contains('¥') {
        return "JPY".to_string();
    }
    "USD".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_string_collapses_whitespace() {
        assert_eq!(clean_string("  Jane \t Doe \n"), "Jane Doe");
        assert_eq!(clean_string(""), "");
        assert_eq!(clean_string("   "), "");
    }

    #[test]
    fn title_case_handles_runs() {
        assert_eq!(title_case("jane doe"), "Jane Doe");
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("MCALLISTER"), "Mcallister");
        assert_eq!(title_case("42 main st"), "42 Main St");
    }

    #[test]
    fn email_lower_cased() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn phone_formats_converge() {
        assert_eq!(normalize_phone("(555) 123-4567"), "5551234567");
        assert_eq!(normalize_phone("15551234567"), "5551234567");
        assert_eq!(normalize_phone("+1 555 123 4567"), "5551234567");
    }

    #[test]
    fn phone_ocr_confusables_corrected() {
        // O→0, S→5, l→1
        assert_eq!(normalize_phone("(555) l23-4S6O"), "5551234560");
    }

    #[test]
    fn phone_short_numbers_kept_as_digits() {
        assert_eq!(normalize_phone("x123"), "123");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn dates_parse_in_pattern_order() {
        assert_eq!(parse_date("1990-03-15"), "1990-03-15");
        assert_eq!(parse_date("03/15/1990"), "1990-03-15");
        assert_eq!(parse_date("03-15-1990"), "1990-03-15");
        assert_eq!(parse_date("15-03-1990"), "1990-03-15");
        assert_eq!(parse_date("1990/03/15"), "1990-03-15");
    }

    #[test]
    fn ambiguous_date_prefers_us_order() {
        // 01-02 could be Jan 2 or Feb 1; MM-DD-YYYY is tried first.
        assert_eq!(parse_date("01-02-1990"), "1990-01-02");
    }

    #[test]
    fn unparseable_date_passes_through() {
        assert_eq!(parse_date(" March 15, 1990 "), "March 15, 1990");
        assert_eq!(parse_date(""), "");
    }

    #[test]
    fn amount_us_format() {
        assert_eq!(parse_amount("1,234.50"), Some(1234.50));
        assert_eq!(parse_amount("$1,234.50"), Some(1234.50));
    }

    #[test]
    fn amount_european_format() {
        assert_eq!(parse_amount("1.234,50"), Some(1234.50));
        assert_eq!(parse_amount("€1.234,50"), Some(1234.50));
    }

    #[test]
    fn amount_lone_comma_decimal_vs_grouping() {
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("12,50"), Some(12.5));
        assert_eq!(parse_amount("12,500"), Some(12500.0));
    }

    #[test]
    fn amount_currency_codes_stripped() {
        assert_eq!(parse_amount("USD 250.00"), Some(250.0));
        assert_eq!(parse_amount("250 eur"), Some(250.0));
    }

    #[test]
    fn amount_ocr_confusables_corrected() {
        assert_eq!(parse_amount("1O0.5O"), Some(100.5));
    }

    #[test]
    fn amount_rounds_to_cents() {
        assert_eq!(parse_amount("3.14159"), Some(3.14));
        assert_eq!(parse_amount("99.996"), Some(100.0));
    }

    #[test]
    fn amount_garbage_is_none() {
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("--"), None);
    }

    #[test]
    fn amount_negative() {
        assert_eq!(parse_amount("-42.10"), Some(-42.10));
    }

    #[test]
    fn currency_detection() {
        assert_eq!(detect_currency("€1.234,50"), "EUR");
        assert_eq!(detect_currency("£99"), "GBP");
        assert_eq!(detect_currency("1234 cad"), "CAD");
        assert_eq!(detect_currency("¥500"), "JPY");
        assert_eq!(detect_currency("$100"), "USD");
        assert_eq!(detect_currency("100"), "USD");
        assert_eq!(detect_currency(""), "USD");
    }
}
