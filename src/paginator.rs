//! Page window state for the table.
//!
//! Pages are 1-based. The paginator never renders rows itself: it tracks the
//! active page and page count, computes which rows belong to the active page
//! and describes the pagination control as a list of [`PageLink`]s.
//!
//! ```rust
//! use bubbletea_easytable::config::PageSize;
//! use bubbletea_easytable::paginator::Model;
//!
//! let mut paginator = Model::new(PageSize::Limited(10));
//! paginator.set_page_count_for_rows(25);
//! assert_eq!(paginator.page_count(), 3);
//!
//! paginator.set_page(Some(5));
//! assert_eq!(paginator.page(), 3);
//! assert_eq!(paginator.slice_bounds(25), 20..25);
//! ```

use crate::config::{parse_int, PageSize};
use crate::key::{self, Binding, KeyMap as KeyMapTrait};
use crossterm::event::KeyCode;
use std::ops::Range;

/// Key bindings for moving between pages.
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page. Default keys: PageUp, Left Arrow, 'h'
    pub prev_page: Binding,
    /// Next page. Default keys: PageDown, Right Arrow, 'l'
    pub next_page: Binding,
    /// First page. Default keys: Home, 'g'
    pub first_page: Binding,
    /// Last page. Default keys: End, 'G'
    pub last_page: Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: Binding::new(vec![KeyCode::PageUp, KeyCode::Left, KeyCode::Char('h')])
                .with_help("←/h", "prev page"),
            next_page: Binding::new(vec![KeyCode::PageDown, KeyCode::Right, KeyCode::Char('l')])
                .with_help("→/l", "next page"),
            first_page: Binding::new(vec![KeyCode::Home, KeyCode::Char('g')])
                .with_help("g/home", "first page"),
            last_page: Binding::new(vec![KeyCode::End, KeyCode::Char('G')])
                .with_help("G/end", "last page"),
        }
    }
}

impl KeyMapTrait for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![vec![
            &self.prev_page,
            &self.next_page,
            &self.first_page,
            &self.last_page,
        ]]
    }
}

/// One entry of the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// Link to the previous page.
    Previous,
    /// Link to a numbered page.
    Page {
        /// 1-based page number.
        number: usize,
        /// True for the active page.
        active: bool,
    },
    /// Placeholder for a skipped range of pages.
    Ellipsis,
    /// Link to the next page.
    Next,
}

/// What a pagination link or key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// A page number; `None` when the input was not numeric.
    Page(Option<i64>),
    /// One page back.
    Previous,
    /// One page forward.
    Next,
}

impl PageTarget {
    /// Reads a link value: `"prev"`, `"next"` or a page number.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "prev" | "previous" => PageTarget::Previous,
            "next" => PageTarget::Next,
            other => PageTarget::Page(parse_int(other)),
        }
    }
}

impl From<usize> for PageTarget {
    fn from(page: usize) -> Self {
        PageTarget::Page(Some(page as i64))
    }
}

/// Values substituted into the count text template.
///
/// | placeholder | value |
/// |---|---|
/// | `{CP}` | current page |
/// | `{TP}` | total pages |
/// | `{PF}` | first visible row |
/// | `{PL}` | last visible row |
/// | `{TR}` | total rows |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountText {
    /// Active page.
    pub current_page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// 1-based index of the first visible row.
    pub first: usize,
    /// 1-based index of the last visible row; 0 when nothing is visible.
    pub last: usize,
    /// Total number of rows.
    pub total: usize,
}

impl CountText {
    /// Fills the template; returns `None` when no row is visible so the
    /// count can be hidden.
    pub fn render(&self, template: &str) -> Option<String> {
        if self.last == 0 {
            return None;
        }
        Some(
            template
                .replace("{CP}", &self.current_page.to_string())
                .replace("{TP}", &self.total_pages.to_string())
                .replace("{PF}", &self.first.to_string())
                .replace("{PL}", &self.last.to_string())
                .replace("{TR}", &self.total.to_string()),
        )
    }
}

/// Page window state.
#[derive(Debug, Clone)]
pub struct Model {
    page: usize,
    page_count: usize,
    page_size: PageSize,
    enabled: bool,
    /// Key bindings.
    pub keymap: PaginatorKeyMap,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Model {
    /// Creates an enabled paginator on page 1 of 1.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_count: 1,
            page_size: normalize(page_size),
            enabled: true,
            keymap: PaginatorKeyMap::default(),
        }
    }

    /// Enables or disables slicing (builder pattern). A disabled paginator
    /// treats every row as part of the active page.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns true when pagination is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the active page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the number of pages (at least 1).
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Returns the page size.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Changes the page size. The page count must be recomputed afterwards.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = normalize(page_size);
    }

    /// Moves to `page`, clamped into `[1, page_count]`. `None` and values
    /// below 1 select the first page.
    pub fn set_page(&mut self, page: Option<i64>) {
        let requested = match page {
            Some(p) if p >= 1 => p as usize,
            _ => 1,
        };
        self.page = requested.min(self.page_count).max(1);
    }

    /// Resolves a link target against the active page and moves there.
    pub fn go_to(&mut self, target: PageTarget) {
        let page = self.resolve(target);
        self.set_page(page);
    }

    /// Page number a target points at, before clamping.
    pub fn resolve(&self, target: PageTarget) -> Option<i64> {
        match target {
            PageTarget::Page(page) => page,
            PageTarget::Previous => Some(self.page as i64 - 1),
            PageTarget::Next => Some(self.page as i64 + 1),
        }
    }

    /// Recomputes the page count from the number of visible rows.
    ///
    /// Pages are `ceil(rows / page_size)`, at least 1. An unbounded page size
    /// always yields a single page. The active page is clamped.
    pub fn set_page_count_for_rows(&mut self, rows: usize) {
        self.page_count = match self.page_size {
            PageSize::Limited(size) => rows.div_ceil(size).max(1),
            PageSize::Unbounded => 1,
        };
        self.clamp();
    }

    /// Accepts a server-supplied page count (1 when absent). The active page
    /// is clamped.
    pub fn set_page_count(&mut self, page_count: Option<usize>) {
        self.page_count = page_count.unwrap_or(1).max(1);
        self.clamp();
    }

    fn clamp(&mut self) {
        self.page = self.page.clamp(1, self.page_count);
    }

    fn is_sliced(&self) -> bool {
        self.enabled && self.page_size.limit().is_some()
    }

    /// 1-based index of the first row on the active page.
    pub fn page_start(&self) -> usize {
        match self.page_size {
            PageSize::Limited(size) if self.enabled => (self.page - 1) * size + 1,
            _ => 1,
        }
    }

    /// 1-based index of the last row slot on the active page. This is not
    /// clamped to the row count; see [`Model::last_visible`].
    pub fn page_end(&self, rows: usize) -> usize {
        match self.page_size {
            PageSize::Limited(size) if self.enabled => self.page_start() + size - 1,
            _ => rows,
        }
    }

    /// 1-based index of the last row actually shown, 0 without rows.
    pub fn last_visible(&self, rows: usize) -> usize {
        self.page_end(rows).min(rows)
    }

    /// 0-based, end-exclusive range of visible rows on the active page.
    pub fn slice_bounds(&self, rows: usize) -> Range<usize> {
        if !self.is_sliced() {
            return 0..rows;
        }
        let start = (self.page_start() - 1).min(rows);
        let end = self.page_end(rows).min(rows);
        start..end
    }

    /// Count text values for a local table with `rows` visible rows.
    pub fn count(&self, rows: usize) -> CountText {
        CountText {
            current_page: self.page,
            total_pages: self.page_count,
            first: self.page_start(),
            last: self.last_visible(rows),
            total: rows,
        }
    }

    /// Describes the pagination control.
    ///
    /// Returns an empty list when there is a single page. With
    /// `side_links = Some(n)`, `n > 0` and more than `n + 3` pages, only the
    /// first page, the last page and a window of `n` pages on each side of
    /// the active page are linked; skipped ranges become
    /// [`PageLink::Ellipsis`]. A window touching either end is shifted so
    /// it keeps its width.
    pub fn links(&self, side_links: Option<usize>) -> Vec<PageLink> {
        if self.page_count <= 1 {
            return Vec::new();
        }

        let mut links = vec![PageLink::Previous];
        let count = self.page_count as i64;
        let active = self.page as i64;
        let page = |i: i64| PageLink::Page {
            number: i as usize,
            active: i == active,
        };

        match side_links.map(|n| n as i64) {
            Some(side) if side > 0 && count > side + 3 => {
                let mut start = active - side;
                let mut end = active + side;
                if start <= 0 {
                    end += start.abs() + 1;
                    start = 1;
                } else if end > count - 1 {
                    start -= end - count;
                    end = count;
                }

                let mut i = 1;
                while i <= count {
                    if i == 1 || i == count || (i >= start && i <= end) {
                        links.push(page(i));
                    } else {
                        links.push(PageLink::Ellipsis);
                        if i < start {
                            i = start - 1;
                        } else {
                            i = (count - 1).max(1);
                        }
                    }
                    i += 1;
                }
            }
            _ => links.extend((1..=count).map(page)),
        }

        links.push(PageLink::Next);
        links
    }
}

fn normalize(page_size: PageSize) -> PageSize {
    match page_size {
        PageSize::Limited(0) => PageSize::Unbounded,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn numbers(links: &[PageLink]) -> Vec<Option<usize>> {
        links
            .iter()
            .filter_map(|link| match link {
                PageLink::Page { number, .. } => Some(Some(*number)),
                PageLink::Ellipsis => Some(None),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        let paginator = Model::default();
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.page_count(), 1);
        assert_eq!(paginator.page_size(), PageSize::Limited(10));
    }

    #[test]
    fn test_page_count_and_clamping() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(25);
        assert_eq!(paginator.page_count(), 3);

        paginator.set_page(Some(5));
        assert_eq!(paginator.page(), 3);

        paginator.set_page(Some(0));
        assert_eq!(paginator.page(), 1);

        paginator.set_page(None);
        assert_eq!(paginator.page(), 1);
    }

    #[test]
    fn test_zero_rows_still_have_one_page() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(0);
        assert_eq!(paginator.page_count(), 1);
        assert_eq!(paginator.count(0).render("{PF}-{PL}"), None);
    }

    #[test]
    fn test_shrinking_page_count_clamps_active_page() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(100);
        paginator.set_page(Some(9));
        paginator.set_page_count_for_rows(35);
        assert_eq!(paginator.page(), 4);
    }

    #[test]
    fn test_unbounded_page_size() {
        let mut paginator = Model::new(PageSize::Unbounded);
        paginator.set_page_count_for_rows(42);
        assert_eq!(paginator.page_count(), 1);
        assert_eq!(paginator.page_start(), 1);
        assert_eq!(paginator.page_end(42), 42);
        assert_eq!(paginator.slice_bounds(42), 0..42);
    }

    #[test]
    fn test_disabled_paginator_shows_all_rows() {
        let mut paginator = Model::new(PageSize::Limited(5)).with_enabled(false);
        paginator.set_page_count_for_rows(12);
        assert_eq!(paginator.slice_bounds(12), 0..12);
        assert_eq!(paginator.page_start(), 1);
        assert_eq!(paginator.page_end(12), 12);
    }

    #[test]
    fn test_slice_bounds_on_last_page() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(25);
        paginator.set_page(Some(3));
        assert_eq!(paginator.page_start(), 21);
        assert_eq!(paginator.page_end(25), 30);
        assert_eq!(paginator.last_visible(25), 25);
        assert_eq!(paginator.slice_bounds(25), 20..25);
    }

    #[test]
    fn test_go_to_targets() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(30);

        paginator.go_to(PageTarget::Next);
        assert_eq!(paginator.page(), 2);
        paginator.go_to(PageTarget::Next);
        paginator.go_to(PageTarget::Next);
        assert_eq!(paginator.page(), 3);
        paginator.go_to(PageTarget::Previous);
        assert_eq!(paginator.page(), 2);
        paginator.go_to(PageTarget::parse("abc"));
        assert_eq!(paginator.page(), 1);
        paginator.go_to(PageTarget::parse("3"));
        assert_eq!(paginator.page(), 3);
    }

    #[test]
    fn test_count_text() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(25);
        paginator.set_page(Some(3));

        let text = paginator.count(25).render("Showing {PF} - {PL} of {TR} rows");
        assert_eq!(text.as_deref(), Some("Showing 21 - 25 of 25 rows"));

        let text = paginator.count(25).render("Page {CP} of {TP}");
        assert_eq!(text.as_deref(), Some("Page 3 of 3"));
    }

    #[test]
    fn test_single_page_has_no_links() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count_for_rows(7);
        assert!(paginator.links(None).is_empty());
    }

    #[test]
    fn test_all_links_without_side_links() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count(Some(5));
        paginator.set_page(Some(2));

        let links = paginator.links(None);
        assert_eq!(links.first(), Some(&PageLink::Previous));
        assert_eq!(links.last(), Some(&PageLink::Next));
        assert_eq!(
            numbers(&links),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
        assert!(links.contains(&PageLink::Page {
            number: 2,
            active: true
        }));
    }

    #[test]
    fn test_sliding_window_in_the_middle() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count(Some(20));
        paginator.set_page(Some(10));

        assert_eq!(
            numbers(&paginator.links(Some(2))),
            vec![
                Some(1),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                None,
                Some(20)
            ]
        );
    }

    #[test]
    fn test_sliding_window_shifts_at_the_start() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count(Some(20));
        paginator.set_page(Some(1));

        assert_eq!(
            numbers(&paginator.links(Some(2))),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(20)]
        );
    }

    #[test]
    fn test_sliding_window_shifts_at_the_end() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count(Some(20));
        paginator.set_page(Some(20));

        assert_eq!(
            numbers(&paginator.links(Some(2))),
            vec![Some(1), None, Some(16), Some(17), Some(18), Some(19), Some(20)]
        );
    }

    #[test]
    fn test_side_links_ignored_for_few_pages() {
        let mut paginator = Model::new(PageSize::Limited(10));
        paginator.set_page_count(Some(5));
        assert_eq!(numbers(&paginator.links(Some(2))).len(), 5);
    }

    #[test]
    fn test_short_help() {
        let paginator = Model::default();
        assert_eq!(
            key::short_help_view(&paginator.keymap, " • "),
            "←/h prev page • →/l next page"
        );
    }

    proptest! {
        #[test]
        fn prop_page_count_is_ceiling(rows in 0usize..10_000, size in 1usize..500) {
            let mut paginator = Model::new(PageSize::Limited(size));
            paginator.set_page_count_for_rows(rows);
            prop_assert_eq!(paginator.page_count(), rows.div_ceil(size).max(1));
        }

        #[test]
        fn prop_set_page_always_in_range(
            rows in 0usize..10_000,
            size in 1usize..500,
            page in proptest::option::of(any::<i64>()),
        ) {
            let mut paginator = Model::new(PageSize::Limited(size));
            paginator.set_page_count_for_rows(rows);
            paginator.set_page(page);
            prop_assert!(paginator.page() >= 1);
            prop_assert!(paginator.page() <= paginator.page_count());
        }

        #[test]
        fn prop_links_mark_exactly_one_active_page(
            pages in 2usize..200,
            active in 1i64..200,
            side in proptest::option::of(0usize..6),
        ) {
            let mut paginator = Model::new(PageSize::Limited(10));
            paginator.set_page_count(Some(pages));
            paginator.set_page(Some(active));
            let links = paginator.links(side);
            let active_links = links
                .iter()
                .filter(|l| matches!(l, PageLink::Page { active: true, .. }))
                .count();
            prop_assert_eq!(active_links, 1);
        }
    }
}
