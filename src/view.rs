//! The surface a table draws on.
//!
//! The table controller never touches a rendering surface directly. It reads
//! rows and header cells through [`ViewPort`] and writes visibility, the
//! empty-state row, count text, pagination links, sort icons and the loading
//! indicator back through it.
//!
//! [`MemoryView`] is the in-memory implementation: it keeps everything in
//! plain vectors and renders a terminal table with lipgloss styles.
//!
//! ```rust
//! use bubbletea_easytable::view::{HeaderCell, MemoryView, ViewPort};
//!
//! let view = MemoryView::new(vec![
//!     HeaderCell::new("Name").sortable(),
//!     HeaderCell::new("Age"),
//! ])
//! .with_rows(vec![
//!     vec!["Ada".into(), "36".into()],
//!     vec!["Alan".into(), "41".into()],
//! ]);
//!
//! assert_eq!(view.row_count(), 2);
//! assert_eq!(view.cell_text(1, 0).as_deref(), Some("Alan"));
//! ```

use crate::filtering::FilterKind;
use crate::paginator::PageLink;
use lipgloss_extras::prelude::*;
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

/// What kind of element a view wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// A table with a header row and a body.
    Table,
    /// Anything else, by name.
    Other(String),
}

/// A header cell and the behaviors it opts into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Column title.
    pub title: String,
    /// Clicking the header sorts by this column.
    pub sortable: bool,
    /// The column takes part in filtering, with this type hint.
    pub filter: Option<FilterKind>,
    /// Field name sent as the sort column in remote mode.
    pub data_column: Option<String>,
    /// Fixed display width.
    pub width: Option<usize>,
}

impl HeaderCell {
    /// Creates a plain header cell.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sortable: false,
            filter: None,
            data_column: None,
            width: None,
        }
    }

    /// Marks the column sortable (builder pattern).
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Marks the column filterable with a type hint (builder pattern).
    pub fn filterable(mut self, kind: FilterKind) -> Self {
        self.filter = Some(kind);
        self
    }

    /// Marks the column filterable from a textual type hint such as
    /// `"phone_number"` (builder pattern). Unknown hints filter as text.
    pub fn filterable_hint(self, hint: &str) -> Self {
        self.filterable(FilterKind::from_hint(hint))
    }

    /// Sets the remote sort field (builder pattern).
    pub fn with_data_column(mut self, column: impl Into<String>) -> Self {
        self.data_column = Some(column.into());
        self
    }

    /// Sets a fixed display width (builder pattern).
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Events dispatched on the view for external listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// A page was selected from the pagination control.
    PageSelected {
        /// The newly active page.
        page: usize,
    },
    /// The next-page link or key was used.
    PageNext {
        /// The newly active page.
        page: usize,
    },
}

/// Read/write access to a table surface.
///
/// Row indices are positions in the current body order.
pub trait ViewPort {
    /// Kind of the wrapped element.
    fn kind(&self) -> ElementKind;

    /// Header cells, in column order.
    fn headers(&self) -> Vec<HeaderCell>;

    /// Number of data rows in the body, excluding the empty-state row.
    fn row_count(&self) -> usize;

    /// Text of a cell, or `None` when the cell does not exist.
    fn cell_text(&self, row: usize, column: usize) -> Option<String>;

    /// Reorders the body: new position `i` takes the row previously at
    /// `order[i]`.
    fn reorder_rows(&mut self, order: &[usize]);

    /// Replaces every body row.
    fn replace_rows(&mut self, rows: Vec<Vec<String>>);

    /// Shows or hides one row.
    fn set_row_visible(&mut self, row: usize, visible: bool);

    /// Shows the empty-state row with the given text.
    fn show_empty(&mut self, text: &str);

    /// Removes the empty-state row, if shown.
    fn remove_empty(&mut self);

    /// Sets the count text, or hides it with `None`.
    fn set_count_text(&mut self, text: Option<&str>);

    /// Redraws the pagination control. An empty list clears it.
    fn draw_pagination(&mut self, links: &[PageLink], previous: &str, next: &str);

    /// Sets the sort icon of a header cell.
    fn set_sort_icon(&mut self, column: usize, icon: &str);

    /// Shows the loading indicator with the given frame, or hides it with
    /// `None`.
    fn set_loading(&mut self, frame: Option<&str>);

    /// Pins the header row at the given offset.
    fn set_sticky_header(&mut self, _top: &str) {}

    /// Dispatches an event to external listeners.
    fn dispatch(&mut self, event: TableEvent);
}

/// Something views can be looked up in by selector.
pub trait ViewHost {
    /// View type handed out.
    type View: ViewPort;

    /// Takes the view registered under `selector`.
    fn query(&mut self, selector: &str) -> Option<Self::View>;
}

/// Styles used by [`MemoryView::view`].
#[derive(Debug, Clone)]
pub struct Styles {
    /// Header titles.
    pub header: Style,
    /// The active page link.
    pub active_link: Style,
    /// Other page links.
    pub link: Style,
    /// Ellipsis placeholders and separators.
    pub muted: Style,
    /// Empty-state row and loading indicator.
    pub notice: Style,
}

impl Default for Styles {
    fn default() -> Self {
        use lipgloss::AdaptiveColor;

        let muted = Style::new().foreground(AdaptiveColor {
            Light: "#A49FA5",
            Dark: "#777777",
        });

        Self {
            header: Style::new().bold(true),
            active_link: Style::new().bold(true).foreground(AdaptiveColor {
                Light: "#1a1a1a",
                Dark: "#dddddd",
            }),
            link: Style::new().foreground(AdaptiveColor {
                Light: "#909090",
                Dark: "#626262",
            }),
            muted: muted.clone(),
            notice: muted,
        }
    }
}

/// In-memory table surface.
#[derive(Debug, Clone)]
pub struct MemoryView {
    kind: ElementKind,
    headers: Vec<HeaderCell>,
    rows: Vec<Vec<String>>,
    hidden: Vec<bool>,
    sort_icons: Vec<Option<String>>,
    empty: Option<String>,
    count_text: Option<String>,
    links: Vec<PageLink>,
    arrows: (String, String),
    loading: Option<String>,
    sticky_top: Option<String>,
    events: Vec<TableEvent>,
    /// Rendering styles.
    pub styles: Styles,
}

impl MemoryView {
    /// Creates an empty table with the given header cells.
    pub fn new(headers: Vec<HeaderCell>) -> Self {
        let columns = headers.len();
        Self {
            kind: ElementKind::Table,
            headers,
            rows: Vec::new(),
            hidden: Vec::new(),
            sort_icons: vec![None; columns],
            empty: None,
            count_text: None,
            links: Vec::new(),
            arrows: (String::new(), String::new()),
            loading: None,
            sticky_top: None,
            events: Vec::new(),
            styles: Styles::default(),
        }
    }

    /// Sets the body rows (builder pattern).
    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.hidden = vec![false; rows.len()];
        self.rows = rows;
        self
    }

    /// Sets the element kind (builder pattern).
    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Appends a body row; call `refresh` on the table afterwards.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
        self.hidden.push(false);
    }

    /// Removes a body row; call `refresh` on the table afterwards.
    pub fn remove_row(&mut self, row: usize) -> Option<Vec<String>> {
        if row >= self.rows.len() {
            return None;
        }
        self.hidden.remove(row);
        Some(self.rows.remove(row))
    }

    /// All body rows in body order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows currently shown.
    pub fn visible_rows(&self) -> Vec<&[String]> {
        self.rows
            .iter()
            .zip(&self.hidden)
            .filter(|(_, hidden)| !**hidden)
            .map(|(row, _)| row.as_slice())
            .collect()
    }

    /// Values of one column across the rows currently shown.
    pub fn visible_column(&self, column: usize) -> Vec<String> {
        self.visible_rows()
            .into_iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect()
    }

    /// Text of the empty-state row, if shown.
    pub fn empty_text(&self) -> Option<&str> {
        self.empty.as_deref()
    }

    /// Current count text, if shown.
    pub fn count_text(&self) -> Option<&str> {
        self.count_text.as_deref()
    }

    /// Current pagination links.
    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    /// Icon of a header cell.
    pub fn sort_icon(&self, column: usize) -> Option<&str> {
        self.sort_icons.get(column).and_then(|icon| icon.as_deref())
    }

    /// Returns true while the loading indicator is shown.
    pub fn loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Offset of the pinned header, if pinned.
    pub fn sticky_top(&self) -> Option<&str> {
        self.sticky_top.as_deref()
    }

    /// Drains the dispatched events.
    pub fn take_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                if let Some(width) = header.width {
                    return width;
                }
                let title = self.header_label(i).width();
                self.rows
                    .iter()
                    .zip(&self.hidden)
                    .filter(|(_, hidden)| !**hidden)
                    .filter_map(|(row, _)| row.get(i))
                    .map(|cell| cell.width())
                    .fold(title, usize::max)
            })
            .collect()
    }

    fn header_label(&self, column: usize) -> String {
        let title = self
            .headers
            .get(column)
            .map(|h| h.title.as_str())
            .unwrap_or_default();
        match self.sort_icon(column) {
            Some(icon) if !icon.is_empty() => format!("{} {}", title, icon),
            _ => title.to_string(),
        }
    }

    fn view_links(&self) -> String {
        self.links
            .iter()
            .map(|link| match link {
                PageLink::Previous => self.styles.link.clone().inline(true).render(&self.arrows.0),
                PageLink::Next => self.styles.link.clone().inline(true).render(&self.arrows.1),
                PageLink::Ellipsis => self.styles.muted.clone().inline(true).render("…"),
                PageLink::Page {
                    number,
                    active: true,
                } => self
                    .styles
                    .active_link
                    .clone()
                    .inline(true)
                    .render(&format!("[{}]", number)),
                PageLink::Page { number, .. } => self
                    .styles
                    .link
                    .clone()
                    .inline(true)
                    .render(&number.to_string()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders the table.
    pub fn view(&self) -> String {
        let widths = self.column_widths();
        let pad = |text: &str, width: usize| {
            let fill = width.saturating_sub(text.width());
            format!("{}{}", text, " ".repeat(fill))
        };

        let mut lines = Vec::new();

        let header = (0..self.headers.len())
            .map(|i| pad(&self.header_label(i), widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(self.styles.header.clone().inline(true).render(&header));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );

        if let Some(frame) = &self.loading {
            let text = format!("{} Loading…", frame);
            lines.push(self.styles.notice.clone().inline(true).render(&text));
        } else {
            for row in self.visible_rows() {
                let cells = widths
                    .iter()
                    .enumerate()
                    .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or_default(), *w))
                    .collect::<Vec<_>>()
                    .join(" | ");
                lines.push(cells);
            }
            if let Some(empty) = &self.empty {
                lines.push(self.styles.notice.clone().inline(true).render(empty));
            }
        }

        if let Some(count) = &self.count_text {
            lines.push(self.styles.muted.clone().inline(true).render(count));
        }
        if !self.links.is_empty() {
            lines.push(self.view_links());
        }

        lines.join("\n")
    }
}

impl ViewPort for MemoryView {
    fn kind(&self) -> ElementKind {
        self.kind.clone()
    }

    fn headers(&self) -> Vec<HeaderCell> {
        self.headers.clone()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.rows.get(row).and_then(|r| r.get(column)).cloned()
    }

    fn reorder_rows(&mut self, order: &[usize]) {
        let rows: Vec<Vec<String>> = order
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        let hidden: Vec<bool> = order
            .iter()
            .filter_map(|&i| self.hidden.get(i).copied())
            .collect();
        self.rows = rows;
        self.hidden = hidden;
    }

    fn replace_rows(&mut self, rows: Vec<Vec<String>>) {
        self.hidden = vec![false; rows.len()];
        self.rows = rows;
    }

    fn set_row_visible(&mut self, row: usize, visible: bool) {
        if let Some(hidden) = self.hidden.get_mut(row) {
            *hidden = !visible;
        }
    }

    fn show_empty(&mut self, text: &str) {
        self.empty = Some(text.to_string());
    }

    fn remove_empty(&mut self) {
        self.empty = None;
    }

    fn set_count_text(&mut self, text: Option<&str>) {
        self.count_text = text.map(str::to_string);
    }

    fn draw_pagination(&mut self, links: &[PageLink], previous: &str, next: &str) {
        self.links = links.to_vec();
        self.arrows = (previous.to_string(), next.to_string());
    }

    fn set_sort_icon(&mut self, column: usize, icon: &str) {
        if let Some(slot) = self.sort_icons.get_mut(column) {
            *slot = Some(icon.to_string());
        }
    }

    fn set_loading(&mut self, frame: Option<&str>) {
        self.loading = frame.map(str::to_string);
    }

    fn set_sticky_header(&mut self, top: &str) {
        self.sticky_top = Some(top.to_string());
    }

    fn dispatch(&mut self, event: TableEvent) {
        self.events.push(event);
    }
}

/// Selector-indexed collection of [`MemoryView`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    views: HashMap<String, MemoryView>,
}

impl MemoryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view under a selector (builder pattern).
    pub fn with_view(mut self, selector: impl Into<String>, view: MemoryView) -> Self {
        self.views.insert(selector.into(), view);
        self
    }
}

impl ViewHost for MemoryDocument {
    type View = MemoryView;

    fn query(&mut self, selector: &str) -> Option<MemoryView> {
        self.views.remove(selector)
    }
}
