//! Selects which configured sheets are actually present in a workbook.

use solar_core::layout::SheetSpec;
use tracing::debug;

/// Split `specs` into the sheets present in `available` and those missing.
///
/// Both lists keep configuration order; sheet names match exactly
/// (case and whitespace sensitive). Missing sheets are skipped silently;
/// callers report them from [`SheetSelection::missing`].
pub fn locate_sheets(specs: &[SheetSpec], available: &[String]) -> SheetSelection {
    let mut selection = SheetSelection::default();

    for spec in specs {
        if available.iter().any(|name| name == &spec.sheet_name) {
            debug!("Sheet '{}' found (CAD '{}')", spec.sheet_name, spec.cad);
            selection.present.push(spec.clone());
        } else {
            debug!("Sheet '{}' not found in workbook, skipping", spec.sheet_name);
            selection.missing.push(spec.sheet_name.clone());
        }
    }

    selection
}

/// Result of [`locate_sheets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSelection {
    /// Sheets to process, in configuration order.
    pub present: Vec<SheetSpec>,
    /// Names of configured sheets absent from the workbook.
    pub missing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_core::layout::WorkbookLayout;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_locate_keeps_configuration_order() {
        let specs = WorkbookLayout::default().sheets;
        let available = names(&["CAD 1 2024-2025", "Resumo", "CAD 3 2024", "CAD 3 2023"]);

        let selection = locate_sheets(&specs, &available);
        let present: Vec<&str> = selection
            .present
            .iter()
            .map(|s| s.sheet_name.as_str())
            .collect();
        assert_eq!(present, vec!["CAD 3 2023", "CAD 3 2024", "CAD 1 2024-2025"]);
        assert_eq!(selection.missing, vec!["CAD 3 2025"]);
    }

    #[test]
    fn test_locate_exact_match_only() {
        let specs = vec![SheetSpec::new("CAD 3 2023", "CAD 3")];
        let available = names(&["cad 3 2023", "CAD 3 2023 ", "CAD 3  2023"]);

        let selection = locate_sheets(&specs, &available);
        assert!(selection.present.is_empty());
        assert_eq!(selection.missing, vec!["CAD 3 2023"]);
    }

    #[test]
    fn test_locate_nothing_present() {
        let specs = WorkbookLayout::default().sheets;
        let selection = locate_sheets(&specs, &names(&["Plan1"]));
        assert!(selection.present.is_empty());
        assert_eq!(selection.missing.len(), 4);
    }

    #[test]
    fn test_locate_carries_cad_label() {
        let specs = vec![SheetSpec::new("CAD 1 2024-2025", "CAD 1")];
        let selection = locate_sheets(&specs, &names(&["CAD 1 2024-2025"]));
        assert_eq!(selection.present[0].cad, "CAD 1");
    }
}
