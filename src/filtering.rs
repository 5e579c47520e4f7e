//! Row filtering.
//!
//! A row is visible when the filter text is a case-insensitive substring of
//! any filterable column. Columns may carry a type hint that normalizes the
//! cell text before matching.

/// Type hint of a filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Plain text, matched case-insensitively.
    #[default]
    Text,
    /// Phone numbers: only the digits of the cell are matched.
    PhoneNumber,
}

impl FilterKind {
    /// Reads a column type hint; unknown hints are plain text.
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "phone_number" => FilterKind::PhoneNumber,
            _ => FilterKind::Text,
        }
    }

    /// Normalizes cell text for matching.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.trim().to_lowercase();
        match self {
            FilterKind::Text => text,
            FilterKind::PhoneNumber => text.chars().filter(char::is_ascii_digit).collect(),
        }
    }
}

/// A column taking part in filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterColumn {
    /// Column index in the row.
    pub index: usize,
    /// Type hint.
    pub kind: FilterKind,
}

/// Filter predicate over a set of columns.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    columns: Vec<FilterColumn>,
    text: String,
    needle: String,
}

impl Filter {
    /// Creates an inactive filter over the given columns.
    pub fn new(columns: Vec<FilterColumn>) -> Self {
        Self {
            columns,
            text: String::new(),
            needle: String::new(),
        }
    }

    /// Filterable columns.
    pub fn columns(&self) -> &[FilterColumn] {
        &self.columns
    }

    /// Sets the filter text; surrounding whitespace is ignored.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.trim().to_string();
        self.needle = self.text.to_lowercase();
    }

    /// The trimmed filter text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true when the filter hides anything.
    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    /// Tests one row. `cell` returns the text of a column; the first
    /// matching column decides.
    pub fn matches<F>(&self, cell: F) -> bool
    where
        F: Fn(usize) -> Option<String>,
    {
        if !self.is_active() {
            return true;
        }
        self.columns.iter().any(|column| {
            cell(column.index)
                .map(|text| column.kind.normalize(&text).contains(&self.needle))
                .unwrap_or(false)
        })
    }
}
