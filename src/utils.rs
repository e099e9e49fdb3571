//! # Utility Functions Module
//!
//! Small helpers shared by the CLI and the optimizer.

/// Parses the permissive boolean forms accepted on the command line.
///
/// Accepts `yes/true/t/y/1` and `no/false/f/n/0`, case-insensitive.
/// Used as a clap `value_parser`, hence the `String` error.
///
/// # Example
/// ```rust
/// use image_batch::utils::parse_bool;
///
/// assert_eq!(parse_bool("Yes"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("Boolean value expected, got '{}'", value)),
    }
}

/// Canonical decimal form of an integer written in a file name.
///
/// Surrounding whitespace and a leading `+`/`-` are accepted, single `_`
/// may separate digits, leading zeros are dropped. There is no size limit.
/// Returns `None` for anything that is not an integer.
///
/// # Example
/// ```rust
/// use image_batch::utils::canonical_integer;
///
/// assert_eq!(canonical_integer("00007").as_deref(), Some("7"));
/// assert_eq!(canonical_integer("1_000").as_deref(), Some("1000"));
/// assert_eq!(canonical_integer("-0").as_deref(), Some("0"));
/// assert_eq!(canonical_integer("1__0"), None);
/// ```
pub fn canonical_integer(text: &str) -> Option<String> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }

    let digits: String = body.chars().filter(|c| *c != '_').collect();
    let digits = digits.trim_start_matches('0');
    Some(match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    })
}

/// Left-pads a canonical integer with zeros up to `width` characters.
///
/// The sign counts towards the width and values already `width` long or
/// longer are returned as-is: `zero_pad("7", 4) == "0007"`,
/// `zero_pad("12345", 4) == "12345"`, `zero_pad("-3", 4) == "00-3"`.
pub fn zero_pad(value: &str, width: usize) -> String {
    let padding = width.saturating_sub(value.chars().count());
    format!("{}{}", "0".repeat(padding), value)
}
