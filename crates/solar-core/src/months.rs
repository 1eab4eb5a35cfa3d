//! Portuguese month-name table shared by the extractors and the summaries.
//!
//! Monthly summary rows reference their month by name ("Janeiro", "Março",
//! ...). Anything that is not in [`MONTH_NAMES`] (or the handful of
//! accepted spellings in [`ALTERNATE_SPELLINGS`]) is reported as unmapped
//! rather than treated as an error.

/// Canonical month names, indexed by `month_number - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Additional spellings seen in hand-typed sheets.
const ALTERNATE_SPELLINGS: &[(&str, u32)] = &[("Marco", 3)];

/// Map a month-reference cell to its number (1–12).
///
/// Surrounding whitespace is ignored and the comparison is case-insensitive.
/// Returns `None` for unknown or mis-encoded text.
///
/// # Examples
///
/// ```
/// use solar_core::months::month_number;
///
/// assert_eq!(month_number("Janeiro"), Some(1));
/// assert_eq!(month_number("  março "), Some(3));
/// assert_eq!(month_number("Mar\u{221A}\u{00DF}o"), None);
/// ```
pub fn month_number(text: &str) -> Option<u32> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, num)| (*name, num))
        .chain(ALTERNATE_SPELLINGS.iter().copied())
        .find(|(name, _)| name.to_lowercase() == needle)
        .map(|(_, num)| num)
}

/// Canonical name for a month number, or `None` outside 1–12.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_NAMES.get(idx).copied()
}
