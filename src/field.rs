//! Cell parsers for the typed column kinds.
//!
//! Both parsers are total: input that does not fit the expected shape yields
//! `None` rather than an error, so a malformed cell never aborts iteration.

/// A number read from a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Widens the number to a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Rounds half away from zero; out-of-range floats saturate.
    pub fn round_to_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f.round() as i64,
        }
    }
}

/// Parses the usual spreadsheet spellings of a boolean, ignoring case.
///
/// ```
/// use autocsv::field::parse_boolean;
///
/// assert_eq!(parse_boolean("Yes"), Some(true));
/// assert_eq!(parse_boolean("OFF"), Some(false));
/// assert_eq!(parse_boolean("maybe"), None);
/// ```
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a number written with any regional thousands/decimal convention.
///
/// Accepts an optional leading `-`, digit groups optionally separated by one
/// consistent non-digit thousands character, then optionally a different
/// non-digit decimal character followed by digits. `0x` prefixes are read as
/// hexadecimal. Anything ambiguous or malformed is `None`.
///
/// ```
/// use autocsv::field::{parse_number, Number};
///
/// assert_eq!(parse_number("1.234.567,89"), Some(Number::Float(1234567.89)));
/// assert_eq!(parse_number("1'234'567"), Some(Number::Int(1234567)));
/// assert_eq!(parse_number("2.456.70"), None);
/// assert_eq!(parse_number("0x20"), Some(Number::Int(32)));
/// ```
pub fn parse_number(value: &str) -> Option<Number> {
    if value.is_empty() {
        return None;
    }

    if let Some(hex) = value.strip_prefix("0x") {
        return Some(Number::Int(parse_hex_prefix(hex)));
    }

    let (thousands, decimal) = match_grouping(value)?;

    let mut normalized = String::with_capacity(value.len());
    for c in value.chars() {
        if Some(c) == thousands {
            continue;
        }
        normalized.push(if Some(c) == decimal { '.' } else { c });
    }

    // both digit runs are optional in the grammar
    if normalized == "." || normalized == "-." {
        return None;
    }

    if decimal.is_some() {
        return normalized.parse::<f64>().ok().map(Number::Float);
    }

    match normalized.as_str() {
        "" | "-" => Some(Number::Int(0)),
        digits => match digits.parse::<i64>() {
            Ok(i) => Some(Number::Int(i)),
            Err(_) => digits.parse::<f64>().ok().map(Number::Float),
        },
    }
}

/// Reads the leading hexadecimal digits, `0` when there are none.
fn parse_hex_prefix(s: &str) -> i64 {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_hexdigit())
        .map_or(s.len(), |(i, _)| i);
    let digits = &s[..end];
    if digits.is_empty() {
        return 0;
    }
    i64::from_str_radix(digits, 16).unwrap_or(i64::MAX)
}

/// Matches `-? (D{1,3} (K? D{3} (K D{3})*)?)? (X D*)?` where `K` and `X` are
/// single non-digit characters and `X != K`.
///
/// Returns the thousands and decimal characters of the accepted reading. A
/// reading with a thousands character is preferred over one without.
fn match_grouping(value: &str) -> Option<(Option<char>, Option<char>)> {
    let chars: Vec<char> = value.chars().collect();
    let body = match chars.first() {
        Some('-') => &chars[1..],
        _ => &chars[..],
    };

    match_with_thousands(body)
        .map(|(k, x)| (Some(k), x))
        .or_else(|| match_plain(body).map(|x| (None, x)))
}

fn digit_run(chars: &[char]) -> usize {
    chars.iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Reads `X D*` through the end, or nothing at all.
fn match_decimal_tail(rest: &[char]) -> Option<Option<char>> {
    match rest.split_first() {
        None => Some(None),
        Some((&x, digits)) if !x.is_ascii_digit() && digit_run(digits) == digits.len() => {
            Some(Some(x))
        }
        Some(_) => None,
    }
}

fn match_with_thousands(body: &[char]) -> Option<(char, Option<char>)> {
    let lead = digit_run(body);
    if !(1..=3).contains(&lead) {
        return None;
    }

    let k = *body.get(lead)?;
    let mut pos = lead + 1;
    loop {
        // exactly three digits per group
        if digit_run(&body[pos..]) != 3 {
            return None;
        }
        pos += 3;
        match body.get(pos) {
            Some(&c) if c == k => pos += 1,
            _ => break,
        }
    }

    match match_decimal_tail(&body[pos..])? {
        Some(x) if x == k => None,
        x => Some((k, x)),
    }
}

fn match_plain(body: &[char]) -> Option<Option<char>> {
    let lead = digit_run(body);
    match_decimal_tail(&body[lead..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_words_in_any_case() {
        for word in ["true", "on", "yes", "1"] {
            assert_eq!(parse_boolean(word), Some(true));
            assert_eq!(parse_boolean(&word.to_uppercase()), Some(true));
        }
        for word in ["false", "off", "no", "0", "False", "NO"] {
            assert_eq!(parse_boolean(word), Some(false));
        }
        assert_eq!(parse_boolean("foo"), None);
        assert_eq!(parse_boolean(""), None);
    }

    #[test]
    fn not_numbers() {
        for input in ["", "notanumber", "x", "f", "-f", "NaN", "three", "not a number"] {
            assert_eq!(parse_number(input), None, "{input}");
        }
    }

    #[test]
    fn hex_numbers() {
        assert_eq!(parse_number("0x"), Some(Number::Int(0)));
        assert_eq!(parse_number("0x0"), Some(Number::Int(0)));
        assert_eq!(parse_number("0x1"), Some(Number::Int(1)));
        assert_eq!(parse_number("0x20"), Some(Number::Int(32)));
        assert_eq!(parse_number("0xff"), Some(Number::Int(255)));
    }

    #[test]
    fn integers_with_grouping() {
        let cases = [
            ("123", 123),
            ("-123", -123),
            ("123456", 123456),
            ("1'234'567", 1234567),
            ("-1'234'567", -1234567),
            ("1234567", 1234567),
            ("2.456", 2456),
            ("-2.456", -2456),
            ("1 234", 1234),
            ("1_234", 1234),
            ("1.234.567.890", 1234567890),
            ("-1'234'567'890", -1234567890),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_number(input), Some(Number::Int(expected)), "{input}");
        }
    }

    #[test]
    fn floats_in_regional_formats() {
        let cases = [
            ("3.1416", 3.1416),
            ("-123.45", -123.45),
            ("1'084.24", 1084.24),
            ("2,123.30", 2123.3),
            ("1.234,50", 1234.5),
            ("-1 234,50", -1234.5),
            ("123.456,789", 123456.789),
            ("123_456.789", 123456.789),
            ("1'234'567'890.12345", 1234567890.12345),
            ("1,234,567.89", 1234567.89),
            ("1234567,89", 1234567.89),
            ("1.234.567,89", 1234567.89),
            ("-1,234,567·89", -1234567.89),
            ("1'234'567,89", 1234567.89),
            ("1.234.567'89", 1234567.89),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_number(input), Some(Number::Float(expected)), "{input}");
        }
    }

    #[test]
    fn dangling_decimal_markers() {
        let cases = [
            ("123.", 123.0),
            ("-123.", -123.0),
            ("1,234.", 1234.0),
            ("1?234.", 1234.0),
            ("-1.234,", -1234.0),
            (".5", 0.5),
            ("-.01", -0.01),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_number(input), Some(Number::Float(expected)), "{input}");
        }
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-."), None);
    }

    #[test]
    fn ambiguous_groupings_are_rejected() {
        for input in [
            "2.456.70",
            "-2.456.70",
            "1'234'567'890.123'45",
            "1,23,456",
        ] {
            assert_eq!(parse_number(input), None, "{input}");
        }
    }

    #[test]
    fn rounding_to_integer() {
        assert_eq!(Number::Float(2.5).round_to_i64(), 3);
        assert_eq!(Number::Float(-2.5).round_to_i64(), -3);
        assert_eq!(Number::Float(2.4).round_to_i64(), 2);
        assert_eq!(Number::Int(7).round_to_i64(), 7);
    }
}
