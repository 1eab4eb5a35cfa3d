use unicode_width::UnicodeWidthStr;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use solar_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let grouped = group_thousands(int_part);
    let body = match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    };

    // "-0.00" reads as noise in a report.
    if negative && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format an optional value, rendering absence as `"N/A"`.
///
/// # Examples
///
/// ```
/// use solar_core::formatting::format_optional;
///
/// assert_eq!(format_optional(Some(90.0), 2), "90.00");
/// assert_eq!(format_optional(None, 2), "N/A");
/// ```
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format_number(v, decimals))
}

/// Format a fraction (e.g. a performance ratio of `0.8512`) as a percentage.
///
/// # Examples
///
/// ```
/// use solar_core::formatting::format_percent;
///
/// assert_eq!(format_percent(Some(0.8512), 2), "85.12%");
/// assert_eq!(format_percent(None, 2), "N/A");
/// ```
pub fn format_percent(fraction: Option<f64>, decimals: u32) -> String {
    match fraction {
        Some(f) => format!("{}%", format_number(f * 100.0, decimals)),
        None => "N/A".to_string(),
    }
}

/// Format an energy amount given in MWh with two decimals and the unit.
pub fn format_mwh(mwh: f64) -> String {
    format!("{} MWh", format_number(mwh, 2))
}

// ── Column alignment ──────────────────────────────────────────────────────────

/// Horizontal alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Terminal display width of `s` ("Março" is 5 columns, not 6 bytes).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad `s` with spaces to `width` display columns. Longer strings are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use solar_core::formatting::{pad, Align};
///
/// assert_eq!(pad("Março", 7, Align::Left), "Março  ");
/// assert_eq!(pad("42", 5, Align::Right), "   42");
/// ```
pub fn pad(s: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(display_width(s));
    let spaces = " ".repeat(fill);
    match align {
        Align::Left => format!("{}{}", s, spaces),
        Align::Right => format!("{}{}", spaces, s),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
