//! Table controller.
//!
//! [`Model`] mounts on a [`ViewPort`] and keeps pagination, sorting and
//! filtering consistent with each other:
//!
//! - a filter change recomputes the page count and returns to page 1;
//! - a page size change recomputes the page count and re-clamps the page;
//! - a local sort reorders every row and keeps the active page.
//!
//! In local mode all rows live in the view. In remote mode every page, sort,
//! filter or page size change sends one request to a [`RemoteSource`] and the
//! answer arrives as a [`PageLoadedMsg`] through [`Model::update`].
//!
//! ```rust
//! use bubbletea_easytable::config::{Config, PageSize};
//! use bubbletea_easytable::table::Model;
//! use bubbletea_easytable::view::{HeaderCell, MemoryView};
//!
//! let rows = (1..=25).map(|i| vec![format!("Row {}", i)]).collect();
//! let view = MemoryView::new(vec![HeaderCell::new("Name")]).with_rows(rows);
//! let config = Config::new()
//!     .with_pagination(true)
//!     .with_page_size(PageSize::Limited(10));
//!
//! let mut table = Model::new(view, config).unwrap();
//! assert_eq!(table.page_count(), 3);
//!
//! table.set_current_page(5usize);
//! assert_eq!(table.page(), 3);
//! assert_eq!(table.view().count_text(), Some("Showing 21 - 25 of 25 rows"));
//! ```

use crate::config::{Config, PageSize};
use crate::debounce;
use crate::error::{Error, Result};
use crate::filtering::{Filter, FilterColumn};
use crate::key;
use crate::loading;
use crate::paginator::{self, CountText, PageTarget};
use crate::remote::{record_cells, HttpSource, PageRequest, RemoteResponse, RemoteSource, ResponseData};
use crate::sorting::{normalize_cell, sort_order, SortDirection, SortState};
use crate::view::{ElementKind, HeaderCell, TableEvent, ViewHost, ViewPort};
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Internal ID management for table instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Called with every remote response, successful or not.
pub type SuccessHandler = Box<dyn Fn(&RemoteResponse) + Send>;

/// Called when a remote load fails, with the error, its message and its
/// status text.
pub type ErrorHandler = Box<dyn Fn(&Error, &str, &str) + Send>;

/// Input from the controls a table is wired to.
///
/// Controls are matched by the ids configured in `pageSizeSelector`,
/// `filteringInput` and `filteringTrigger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMsg {
    /// The user changed a control's value.
    Changed {
        /// Control id.
        control: String,
        /// New value.
        value: String,
    },
    /// The user activated a button.
    Clicked {
        /// Control id.
        control: String,
    },
}

/// Result of a remote page load.
#[derive(Debug)]
pub struct PageLoadedMsg {
    /// Table that issued the request.
    pub id: i64,
    seq: u64,
    result: Result<RemoteResponse>,
}

/// Table controller over a view.
pub struct Model<V: ViewPort> {
    id: i64,
    view: V,
    config: Config,
    headers: Vec<HeaderCell>,
    paginator: paginator::Model,
    sort: SortState,
    filter: Filter,
    filter_input: String,
    // filter visibility per body row, in body order
    visible: Vec<bool>,
    debounce: debounce::Model,
    loading: loading::Model,
    source: Option<Arc<dyn RemoteSource>>,
    request_sort: Option<(String, SortDirection)>,
    empty: bool,
    seq: u64,
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl<V: ViewPort> Model<V> {
    /// Mounts a table on a view.
    ///
    /// In remote mode the endpoint is reached through an [`HttpSource`]
    /// built from `config.ajax`.
    ///
    /// # Errors
    ///
    /// [`Error::NotATable`] when the view is not a table,
    /// [`Error::MissingColumns`] and [`Error::MissingUrl`] for incomplete
    /// remote settings.
    pub fn new(view: V, config: Config) -> Result<Self> {
        Self::build(view, config, None)
    }

    /// Mounts a table on a view, loading remote pages from `source`.
    pub fn with_source(view: V, config: Config, source: Arc<dyn RemoteSource>) -> Result<Self> {
        Self::build(view, config, Some(source))
    }

    /// Mounts a table on the view registered under `selector`.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] when nothing matches, plus the errors of
    /// [`Model::new`].
    pub fn from_selector<H>(host: &mut H, selector: &str, config: Config) -> Result<Self>
    where
        H: ViewHost<View = V>,
    {
        let view = host
            .query(selector)
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))?;
        Self::new(view, config)
    }

    fn build(view: V, config: Config, source: Option<Arc<dyn RemoteSource>>) -> Result<Self> {
        if let ElementKind::Other(name) = view.kind() {
            return Err(Error::NotATable(name));
        }

        let source = if config.is_ajax() {
            if config.ajax.columns.is_empty() {
                return Err(Error::MissingColumns);
            }
            match source {
                Some(source) => Some(source),
                None => Some(Arc::new(HttpSource::new(&config.ajax)?) as Arc<dyn RemoteSource>),
            }
        } else {
            None
        };

        let headers = view.headers();
        let filter_columns = if config.filtering {
            headers
                .iter()
                .enumerate()
                .filter_map(|(index, header)| header.filter.map(|kind| FilterColumn { index, kind }))
                .collect()
        } else {
            Vec::new()
        };

        let request_sort = (config.is_ajax() && !config.ajax.sorting.column.is_empty()).then(|| {
            let direction = if config.ajax.sorting.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            (config.ajax.sorting.column.clone(), direction)
        });

        let mut model = Self {
            id: next_id(),
            paginator: paginator::Model::new(config.page_size).with_enabled(config.pagination),
            visible: vec![true; view.row_count()],
            view,
            headers,
            sort: SortState::new(),
            filter: Filter::new(filter_columns),
            filter_input: String::new(),
            debounce: debounce::Model::default(),
            loading: loading::Model::new(),
            source,
            request_sort,
            empty: false,
            seq: 0,
            on_success: None,
            on_error: None,
            config,
        };
        model.mount();
        Ok(model)
    }

    fn mount(&mut self) {
        log::debug!(
            "mounting table {} ({} mode, {} rows)",
            self.id,
            if self.config.is_ajax() { "remote" } else { "local" },
            self.view.row_count()
        );

        if self.config.sticky_header {
            self.view.set_sticky_header(&self.config.sticky_header_top);
        }

        if self.config.sorting {
            if let Some((column, direction)) = self.request_sort.clone() {
                let sorted = (0..self.headers.len())
                    .find(|&i| self.headers[i].sortable && self.data_column(i) == column);
                if let Some(i) = sorted {
                    self.sort.toggle(i);
                    if direction.is_descending() {
                        self.sort.toggle(i);
                    }
                }
            }
            self.draw_sort_icons();
        }

        if !self.config.is_ajax() {
            self.paginator.set_page_count_for_rows(self.visible_count());
            self.paginator.set_page(Some(self.config.page_active as i64));
            self.draw();
        }
    }

    /// Registers the remote success handler (builder pattern).
    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RemoteResponse) + Send + 'static,
    {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Registers the remote error handler (builder pattern). Without one,
    /// failures are logged at error level.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error, &str, &str) + Send + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Sets the delay between the last keystroke and the filter run
    /// (builder pattern).
    pub fn with_filter_delay(mut self, delay: Duration) -> Self {
        self.debounce.delay = delay;
        self
    }

    /// Uses another loading indicator (builder pattern).
    pub fn with_loading(mut self, loading: loading::Model) -> Self {
        self.loading = loading;
        self
    }

    /// Initial command: the first page load in remote mode, nothing in
    /// local mode.
    pub fn init(&mut self) -> Option<Cmd> {
        if !self.config.is_ajax() {
            return None;
        }
        self.load_page(Some(self.config.page_active), false)
    }

    /// Unique id of this table.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The view, mutably. Call [`Model::refresh`] after changing its rows.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Active page (1-based).
    pub fn page(&self) -> usize {
        self.paginator.page()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    /// Rows per page.
    pub fn page_size(&self) -> PageSize {
        self.paginator.page_size()
    }

    /// Sort column and direction.
    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Applied filter text.
    pub fn filter_text(&self) -> &str {
        self.filter.text()
    }

    /// Returns true while a remote load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.active()
    }

    /// Returns true while the empty-state row is shown.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Help line for the page navigation keys.
    pub fn help_view(&self) -> String {
        key::short_help_view(&self.paginator.keymap, " • ")
    }

    fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    // Field sent as the sort column for a header.
    fn data_column(&self, column: usize) -> String {
        let Some(header) = self.headers.get(column) else {
            return String::new();
        };
        header
            .data_column
            .clone()
            .or_else(|| self.config.ajax.columns.get(column).cloned())
            .unwrap_or_else(|| header.title.clone())
    }

    fn compute_visibility(&self) -> Vec<bool> {
        (0..self.view.row_count())
            .map(|row| self.filter.matches(|column| self.view.cell_text(row, column)))
            .collect()
    }

    fn draw(&mut self) {
        let positions: Vec<usize> = self
            .visible
            .iter()
            .enumerate()
            .filter(|(_, visible)| **visible)
            .map(|(row, _)| row)
            .collect();
        let total = positions.len();

        self.paginator.set_page_count_for_rows(total);
        let window = self.paginator.slice_bounds(total);

        for (row, visible) in self.visible.iter().enumerate() {
            if !visible {
                self.view.set_row_visible(row, false);
            }
        }
        for (position, &row) in positions.iter().enumerate() {
            self.view.set_row_visible(row, window.contains(&position));
        }

        self.empty = total == 0;
        if self.empty {
            self.view.show_empty(self.config.empty_text());
        } else {
            self.view.remove_empty();
        }

        if self.config.pagination {
            self.draw_count(self.paginator.count(total));
            self.draw_links();
        }
    }

    fn draw_count(&mut self, count: CountText) {
        let text = count.render(&self.config.count_text);
        self.view.set_count_text(text.as_deref());
    }

    fn draw_links(&mut self) {
        let links = self.paginator.links(self.config.pagination_side_links);
        self.view.draw_pagination(
            &links,
            &self.config.pagination_previous.arrow,
            &self.config.pagination_next.arrow,
        );
    }

    fn draw_sort_icons(&mut self) {
        let icons = &self.config.sorting_icons;
        for (i, header) in self.headers.iter().enumerate() {
            if !header.sortable {
                continue;
            }
            let icon = match self.sort.column() {
                Some(column) if column == i => self.sort.direction().icon(icons),
                _ => icons.none.as_str(),
            };
            self.view.set_sort_icon(i, icon);
        }
    }

    /// Moves to a page, a number or previous/next, clamped into the valid
    /// range. Selecting the active page does nothing, and so does any move
    /// while pagination is off.
    ///
    /// Dispatches [`TableEvent::PageNext`] for [`PageTarget::Next`] and
    /// [`TableEvent::PageSelected`] otherwise. Returns the page load in
    /// remote mode.
    pub fn set_current_page(&mut self, target: impl Into<PageTarget>) -> Option<Cmd> {
        if !self.config.pagination {
            return None;
        }
        let target = target.into();
        let before = self.paginator.page();
        self.paginator.go_to(target);
        let page = self.paginator.page();
        if page == before {
            return None;
        }

        log::debug!("table {} page {} -> {}", self.id, before, page);
        let event = match target {
            PageTarget::Next => TableEvent::PageNext { page },
            _ => TableEvent::PageSelected { page },
        };
        self.view.dispatch(event);

        if self.config.is_ajax() {
            return self.load_page(Some(page), false);
        }
        self.draw();
        None
    }

    /// Changes the page size and re-clamps the active page. In remote mode
    /// page 1 is reloaded, unless the table is empty.
    pub fn set_page_size(&mut self, page_size: PageSize) -> Option<Cmd> {
        self.paginator.set_page_size(page_size);
        self.config.page_size = self.paginator.page_size();
        log::debug!("table {} page size {:?}", self.id, self.config.page_size);

        if self.config.is_ajax() {
            if self.empty {
                return None;
            }
            self.paginator.set_page(Some(1));
            return self.load_page(Some(1), false);
        }
        self.draw();
        None
    }

    /// Applies a page size selector value; non-numeric values show every
    /// row on one page.
    pub fn select_page_size(&mut self, value: &str) -> Option<Cmd> {
        self.set_page_size(PageSize::parse(value))
    }

    /// Sorts by a sortable column, toggling the direction when it is
    /// already sorted. Ignored when sorting is off or the column is not
    /// sortable.
    ///
    /// Local tables reorder every row and keep the active page. Remote
    /// tables reload page 1 with the new sort, unless they are empty.
    pub fn sort_by(&mut self, column: usize) -> Option<Cmd> {
        let sortable = self.headers.get(column).is_some_and(|h| h.sortable);
        if !self.config.sorting || !sortable {
            return None;
        }

        if self.config.is_ajax() {
            if self.empty {
                return None;
            }
            let direction = self.sort.toggle(column);
            self.request_sort = Some((self.data_column(column), direction));
            self.draw_sort_icons();
            self.paginator.set_page(Some(1));
            return self.load_page(Some(1), false);
        }

        let direction = self.sort.toggle(column);
        let keys: Vec<String> = (0..self.view.row_count())
            .map(|row| normalize_cell(&self.view.cell_text(row, column).unwrap_or_default()))
            .collect();
        let order = sort_order(&keys, direction);

        self.view.reorder_rows(&order);
        self.visible = order
            .iter()
            .map(|&row| self.visible.get(row).copied().unwrap_or(true))
            .collect();

        log::debug!("table {} sorted by column {} {}", self.id, column, direction.as_param());
        self.draw_sort_icons();
        self.draw();
        None
    }

    /// Applies a filter immediately and returns to page 1. Empty text
    /// clears the filter.
    ///
    /// Remote tables reload page 1 with the filter text.
    pub fn filter_now(&mut self, text: &str) -> Option<Cmd> {
        if !self.config.filtering {
            return None;
        }
        self.debounce.cancel();
        self.filter_input = text.to_string();
        self.filter.set_text(text);
        log::debug!("table {} filter {:?}", self.id, self.filter.text());

        self.paginator.set_page(Some(1));
        if self.config.is_ajax() {
            return self.load_page(Some(1), false);
        }
        self.visible = self.compute_visibility();
        self.draw();
        None
    }

    /// Runs the filter with the text last typed into the filter input.
    pub fn run_filter(&mut self) -> Option<Cmd> {
        let text = self.filter_input.clone();
        self.filter_now(&text)
    }

    /// Records typed filter input. Without a filter trigger the filter runs
    /// once typing pauses; the returned command is the debounce tick.
    pub fn filter_input_changed(&mut self, text: &str) -> Option<Cmd> {
        self.record_filter_input(text, self.debounce.delay)
    }

    /// Records filter input set by the program; the filter runs on the
    /// next tick.
    pub fn set_filter_input(&mut self, text: &str) -> Option<Cmd> {
        self.record_filter_input(text, Duration::ZERO)
    }

    fn record_filter_input(&mut self, text: &str, delay: Duration) -> Option<Cmd> {
        if !self.config.filtering {
            return None;
        }
        self.filter_input = text.to_string();
        if !self.config.filtering_trigger.is_empty() {
            return None;
        }
        Some(self.debounce.trigger_after(delay))
    }

    /// Re-reads the rows of the view and redraws. Use after adding or
    /// removing rows. Remote tables reload the active page.
    pub fn refresh(&mut self) -> Option<Cmd> {
        if self.config.is_ajax() {
            return self.load_page(None, false);
        }
        self.visible = self.compute_visibility();
        self.draw();
        None
    }

    /// Loads a page from the remote source; `None` reloads the active page.
    /// With `reset_sort` the request sort is cleared first.
    ///
    /// Returns `None` in local mode.
    pub fn load_page(&mut self, page: Option<usize>, reset_sort: bool) -> Option<Cmd> {
        let source = Arc::clone(self.source.as_ref()?);

        if reset_sort {
            self.sort.reset();
            self.request_sort = None;
            if self.config.sorting {
                self.draw_sort_icons();
            }
        }

        let page = page.unwrap_or_else(|| self.paginator.page());
        let request = PageRequest {
            page: Some(page),
            limit: if self.config.pagination {
                self.paginator.page_size().limit()
            } else {
                None
            },
            sort: if self.config.sorting {
                self.request_sort.clone()
            } else {
                None
            },
            filter: self
                .filter
                .is_active()
                .then(|| self.filter.text().to_string()),
            data: self.config.ajax.data.clone(),
        };

        self.seq += 1;
        let id = self.id;
        let seq = self.seq;

        self.loading.show();
        self.view.set_loading(Some(self.loading.frame()));
        log::debug!("table {} loading page {} (request {})", id, page, seq);

        Some(Box::pin(async move {
            let result = source.fetch(request).await;
            Some(Box::new(PageLoadedMsg { id, seq, result }) as Msg)
        }))
    }

    /// Animation command for the loading indicator, while a load is in
    /// flight. Run it alongside the load command to animate the indicator.
    pub fn animate_loading(&self) -> Option<Cmd> {
        self.loading.spin()
    }

    fn page_loaded(&mut self, loaded: PageLoadedMsg) -> Option<Cmd> {
        if loaded.seq != self.seq {
            log::debug!("table {} dropping stale response {}", self.id, loaded.seq);
            return None;
        }

        self.loading.stop();
        self.view.set_loading(None);

        match loaded.result {
            Ok(response) => {
                self.apply_response(&response);
                if let Some(handler) = &self.on_success {
                    handler(&response);
                }
            }
            Err(err) => {
                log::warn!("table {} failed to load page: {}", self.id, err);
                self.show_remote_empty();
                match &self.on_error {
                    Some(handler) => handler(&err, &err.message(), &err.status_text()),
                    None => log::error!("{} ({})", err.message(), err.status_text()),
                }
            }
        }
        None
    }

    fn apply_response(&mut self, response: &RemoteResponse) {
        let records = response.records();
        if !response.success || records.is_empty() {
            self.show_remote_empty();
            return;
        }

        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| record_cells(record, &self.config.ajax.columns))
            .collect();
        let shown = rows.len();
        self.view.replace_rows(rows);
        self.visible = vec![true; shown];
        self.view.remove_empty();
        self.empty = false;

        let paged = response.data.as_ref().and_then(ResponseData::paged);
        self.paginator.set_page_count(paged.and_then(|p| p.last_page));
        self.paginator
            .set_page(paged.and_then(|p| p.current_page).map(|p| p as i64));

        if self.config.pagination {
            let count = match paged {
                Some(p) => {
                    let first = p.from.unwrap_or_else(|| self.paginator.page_start());
                    CountText {
                        current_page: self.paginator.page(),
                        total_pages: self.paginator.page_count(),
                        first,
                        last: p.to.unwrap_or(first + shown - 1),
                        total: p.total.unwrap_or(shown),
                    }
                }
                None => CountText {
                    current_page: 1,
                    total_pages: 1,
                    first: 1,
                    last: shown,
                    total: shown,
                },
            };
            self.draw_count(count);
            self.draw_links();
        }
    }

    fn show_remote_empty(&mut self) {
        self.view.replace_rows(Vec::new());
        self.visible.clear();
        self.view.show_empty(self.config.empty_text());
        self.empty = true;
        self.paginator.set_page_count(None);
        self.view.set_count_text(None);
        self.view.draw_pagination(
            &[],
            &self.config.pagination_previous.arrow,
            &self.config.pagination_next.arrow,
        );
    }

    fn handle_key(&mut self, msg: &KeyMsg) -> Option<Cmd> {
        let keymap = &self.paginator.keymap;
        let target = if keymap.prev_page.matches(msg) {
            PageTarget::Previous
        } else if keymap.next_page.matches(msg) {
            PageTarget::Next
        } else if keymap.first_page.matches(msg) {
            PageTarget::Page(Some(1))
        } else if keymap.last_page.matches(msg) {
            PageTarget::Page(Some(self.paginator.page_count() as i64))
        } else {
            return None;
        };
        self.set_current_page(target)
    }

    fn handle_input(&mut self, input: &InputMsg) -> Option<Cmd> {
        let is = |control: &str, configured: &str| !configured.is_empty() && control == configured;
        match input {
            InputMsg::Changed { control, value } if is(control, &self.config.page_size_selector) => {
                self.select_page_size(value)
            }
            InputMsg::Changed { control, value } if is(control, &self.config.filtering_input) => {
                self.filter_input_changed(value)
            }
            InputMsg::Clicked { control } if is(control, &self.config.filtering_trigger) => {
                self.run_filter()
            }
            _ => None,
        }
    }

    /// Handles page keys, control input, the filter debounce, loading
    /// indicator ticks and remote responses.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            return self.handle_key(key_msg);
        }
        if let Some(input) = msg.downcast_ref::<InputMsg>() {
            return self.handle_input(input);
        }
        if self.debounce.update(&msg) {
            return self.run_filter();
        }
        if let Some(cmd) = self.loading.update(&msg) {
            self.view.set_loading(Some(self.loading.frame()));
            return Some(cmd);
        }
        match msg.downcast::<PageLoadedMsg>() {
            Ok(loaded) if loaded.id == self.id => self.page_loaded(*loaded),
            _ => None,
        }
    }
}
