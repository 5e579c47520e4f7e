#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-easytable/")]

//! # bubbletea-easytable
//!
//! A table controller for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications that adds pagination, column sorting and row filtering to an
//! existing table, with rows either held locally or loaded page by page from
//! a remote endpoint.
//!
//! ## Overview
//!
//! The controller ([`table::Model`]) never draws anything itself. It reads
//! and writes the table through the [`view::ViewPort`] trait, and ships with
//! [`view::MemoryView`], an in-memory table that renders with lipgloss
//! styles. It follows the Elm Architecture like every bubbletea component:
//! input arrives as messages through `update()`, deferred work (the filter
//! debounce, remote fetches, the loading indicator) leaves as commands.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Options, JSON parsing and override merging |
//! | [`table`] | The controller |
//! | [`paginator`] | Page window, count text and pagination links |
//! | [`sorting`] | Sort state and numeric-aware cell comparison |
//! | [`filtering`] | Substring filter with column type hints |
//! | [`remote`] | Remote page requests and responses |
//! | [`view`] | The view trait and the in-memory view |
//! | [`debounce`] | Cancellable delayed trigger |
//! | [`loading`] | Loading indicator |
//! | [`key`] | Key bindings |
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use bubbletea_easytable::prelude::*;
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//!
//! struct App {
//!     table: Table<MemoryView>,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let view = MemoryView::new(vec![
//!             HeaderCell::new("Name").sortable().filterable(FilterKind::Text),
//!             HeaderCell::new("Phone").filterable_hint("phone_number"),
//!         ])
//!         .with_rows(vec![
//!             vec!["Ada".into(), "(555) 123-4567".into()],
//!             vec!["Alan".into(), "+44 20 7946 0018".into()],
//!         ]);
//!         let config = Config::new()
//!             .with_pagination(true)
//!             .with_sorting(true)
//!             .with_filtering(true)
//!             .with_filtering_input("search");
//!
//!         let mut table = Table::new(view, config).unwrap();
//!         let cmd = table.init();
//!         (Self { table }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.table.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("{}\n{}", self.table.view().view(), self.table.help_view())
//!     }
//! }
//! ```
//!
//! ## Options
//!
//! Options can be built in code or read from JSON:
//!
//! ```rust
//! use bubbletea_easytable::config::Config;
//!
//! let config = Config::from_json(r#"{
//!     "pagination": true,
//!     "pageSize": 25,
//!     "dataType": "ajax",
//!     "ajax": { "url": "https://example.com/users", "columns": ["id", "name"] }
//! }"#).unwrap();
//! assert!(config.is_ajax());
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod filtering;
pub mod key;
pub mod loading;
pub mod paginator;
pub mod remote;
pub mod sorting;
pub mod table;
pub mod view;

pub use config::{AjaxConfig, Config, DataType, PageSize};
pub use error::{Error, Result};
pub use filtering::FilterKind;
pub use key::{Binding, KeyMap};
pub use paginator::{Model as Paginator, PageLink, PageTarget};
pub use remote::{HttpSource, PageRequest, RemoteResponse, RemoteSource};
pub use sorting::SortDirection;
pub use table::{InputMsg, Model as Table, PageLoadedMsg};
pub use view::{HeaderCell, MemoryDocument, MemoryView, TableEvent, ViewHost, ViewPort};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_easytable::prelude::*;
///
/// let view = MemoryView::new(vec![HeaderCell::new("Name")]);
/// let table = Table::new(view, Config::new()).unwrap();
/// assert_eq!(table.page(), 1);
/// ```
pub mod prelude {
    pub use crate::config::{AjaxConfig, Config, DataType, HttpMethod, PageSize, SortingIcons};
    pub use crate::error::{Error, Result};
    pub use crate::filtering::FilterKind;
    pub use crate::key::{Binding, KeyMap};
    pub use crate::paginator::{PageLink, PageTarget};
    pub use crate::remote::{HttpSource, PageRequest, RemoteResponse, RemoteSource};
    pub use crate::sorting::SortDirection;
    pub use crate::table::{InputMsg, Model as Table, PageLoadedMsg};
    pub use crate::view::{HeaderCell, MemoryDocument, MemoryView, TableEvent, ViewHost, ViewPort};
}
