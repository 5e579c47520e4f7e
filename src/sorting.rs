//! Column sorting.
//!
//! Cells are compared numerically when both parse as numbers and with a
//! case-folding text collation otherwise. Numbers order before text so the
//! comparison stays a total order for mixed columns.

use crate::config::SortingIcons;
use std::cmp::Ordering;

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Value of the `direction` request parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Header icon for this direction.
    pub fn icon<'a>(&self, icons: &'a SortingIcons) -> &'a str {
        match self {
            SortDirection::Ascending => &icons.asc,
            SortDirection::Descending => &icons.desc,
        }
    }

    /// Returns true for [`SortDirection::Descending`].
    pub fn is_descending(&self) -> bool {
        *self == SortDirection::Descending
    }

    fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Which column is sorted, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    column: Option<usize>,
    direction: SortDirection,
}

impl SortState {
    /// Creates an unsorted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the sorted column, if any.
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// Current direction; meaningless while [`SortState::column`] is `None`.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Activates a column header: the same column flips direction, a new
    /// column starts ascending. Returns the new direction.
    pub fn toggle(&mut self, column: usize) -> SortDirection {
        self.direction = if self.column == Some(column) {
            self.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        self.column = Some(column);
        self.direction
    }

    /// Forgets the sorted column.
    pub fn reset(&mut self) {
        self.column = None;
        self.direction = SortDirection::Ascending;
    }
}

/// Collapses runs of whitespace to a single space and trims the ends.
pub fn normalize_cell(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn collate(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    // lowercase before uppercase on ties
    folded.then_with(|| b.cmp(a))
}

/// Compares two normalized cell values.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collate(a, b),
    }
}

/// Returns the row order that sorts `keys` in `direction`.
///
/// The sort is stable: rows with equal keys keep their relative order in
/// both directions.
pub fn sort_order(keys: &[String], direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| match direction {
        SortDirection::Ascending => compare_cells(&keys[a], &keys[b]),
        SortDirection::Descending => compare_cells(&keys[b], &keys[a]),
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(values: &[&str], direction: SortDirection) -> Vec<String> {
        let keys: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        sort_order(&keys, direction)
            .into_iter()
            .map(|i| keys[i].clone())
            .collect()
    }

    #[test]
    fn test_numeric_aware_ascending() {
        assert_eq!(
            sorted(&["10", "2", "abc"], SortDirection::Ascending),
            vec!["2", "10", "abc"]
        );
    }

    #[test]
    fn test_descending() {
        assert_eq!(
            sorted(&["10", "2", "abc"], SortDirection::Descending),
            vec!["abc", "10", "2"]
        );
    }

    #[test]
    fn test_text_collation_folds_case() {
        assert_eq!(
            sorted(&["banana", "Apple", "cherry", "apple"], SortDirection::Ascending),
            vec!["apple", "Apple", "banana", "cherry"]
        );
    }

    #[test]
    fn test_decimals_and_negatives() {
        assert_eq!(
            sorted(&["1.5", "-3", "0", "12"], SortDirection::Ascending),
            vec!["-3", "0", "1.5", "12"]
        );
    }

    #[test]
    fn test_empty_cells_are_text() {
        assert_eq!(compare_cells("", "5"), Ordering::Greater);
        assert_eq!(compare_cells("", ""), Ordering::Equal);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let keys: Vec<String> = vec!["b".into(), "a".into(), "b".into()];
        assert_eq!(sort_order(&keys, SortDirection::Ascending), vec![1, 0, 2]);
        assert_eq!(sort_order(&keys, SortDirection::Descending), vec![0, 2, 1]);
    }

    #[test]
    fn test_normalize_cell() {
        assert_eq!(normalize_cell("  Jane \n  Doe "), "Jane Doe");
        assert_eq!(normalize_cell("   "), "");
    }

    #[test]
    fn test_toggle() {
        let mut state = SortState::new();
        assert_eq!(state.toggle(2), SortDirection::Ascending);
        assert_eq!(state.toggle(2), SortDirection::Descending);
        assert_eq!(state.toggle(2), SortDirection::Ascending);
        assert_eq!(state.toggle(0), SortDirection::Ascending);
        assert_eq!(state.column(), Some(0));

        state.reset();
        assert_eq!(state.column(), None);
    }

    #[test]
    fn test_direction_param_and_icon() {
        let icons = SortingIcons::default();
        assert_eq!(SortDirection::Ascending.as_param(), "ASC");
        assert_eq!(SortDirection::Descending.as_param(), "DESC");
        assert_eq!(SortDirection::Descending.icon(&icons), "▼");
    }

    proptest! {
        #[test]
        fn prop_descending_reverses_ascending(values in proptest::collection::hash_set("[a-z][a-z0-9]{0,5}", 0..40)) {
            let keys: Vec<String> = values.into_iter().collect();
            let asc: Vec<&String> = sort_order(&keys, SortDirection::Ascending).into_iter().map(|i| &keys[i]).collect();
            let mut desc: Vec<&String> = sort_order(&keys, SortDirection::Descending).into_iter().map(|i| &keys[i]).collect();
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }

        #[test]
        fn prop_numbers_sort_by_value(values in proptest::collection::hash_set(0u32..100_000, 0..40)) {
            let keys: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let sorted: Vec<u32> = sort_order(&keys, SortDirection::Ascending)
                .into_iter()
                .map(|i| keys[i].parse().unwrap())
                .collect();
            let mut expected: Vec<u32> = values.into_iter().collect();
            expected.sort_unstable();
            prop_assert_eq!(sorted, expected);
        }
    }
}
