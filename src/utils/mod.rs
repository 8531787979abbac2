use chrono::NaiveDate;

/// Helper function to format the date
///
/// This function takes a `NaiveDate` and formats it as a string in the "yyyy-mm-dd" format,
/// the same shape the pharmacy API uses for expiry and purchase dates.
///
/// # Arguments
///
/// * `date` - A `NaiveDate` object representing the date to be formatted
///
/// # Returns
///
/// A `String` containing the formatted date
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats an amount as dollars with two decimals, e.g. `$12.50`.
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Helper function to escape special characters for HTML
///
/// Chat messages and medicine details come from users and from a remote
/// service, so every piece of text is escaped before it is placed into
/// markup.
///
/// # Arguments
///
/// * `text` - A string slice containing the text to be escaped
///
/// # Returns
///
/// A `String` where `&`, `<`, `>`, `"` and `'` are replaced by entities
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Checks a phone number: optional `+`, a non-zero first digit and at most
/// sixteen digits. Spaces, dashes and parentheses are ignored.
pub fn validate_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let mut chars = digits.chars();
    match chars.next() {
        Some(first) if ('1'..='9').contains(&first) => {}
        _ => return false,
    }
    digits.len() <= 16 && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dates_as_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(format_date(date), "2025-06-30");
    }

    #[test]
    fn currency_has_two_decimals() {
        assert_eq!(format_currency(3.5), "$3.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.567), "$1234.57");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<img src="x" onerror='y'> & co"#),
            "&lt;img src=&quot;x&quot; onerror=&#39;y&#39;&gt; &amp; co"
        );
        assert_eq!(escape_html("paracetamol"), "paracetamol");
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("+1 (555) 123-4567"));
        assert!(validate_phone("9876543210"));
        assert!(!validate_phone("0123456"));
        assert!(!validate_phone("+"));
        assert!(!validate_phone("12345678901234567"));
        assert!(!validate_phone("98a76"));
    }
}
