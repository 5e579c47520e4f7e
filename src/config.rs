//! Table configuration.
//!
//! A [`Config`] starts from defaults and is customized either with the
//! `with_*` builder methods or by merging a JSON option object:
//!
//! ```rust
//! use bubbletea_easytable::config::{Config, PageSize};
//!
//! let config = Config::from_json(r#"{
//!     "pagination": true,
//!     "pageSize": 25,
//!     "sorting": true,
//!     "sortingIcons": { "asc": "^" }
//! }"#).unwrap();
//!
//! assert!(config.pagination);
//! assert_eq!(config.page_size, PageSize::Limited(25));
//! assert_eq!(config.sorting_icons.asc, "^");
//! assert_eq!(config.sorting_icons.desc, "▼"); // untouched default
//! ```
//!
//! Merging follows the widget's override rules: `ajax`, `paginationNext`,
//! `paginationPrevious` and `sortingIcons` merge key by key, unknown
//! `dataType` values fall back to `html`, `pageActive` only applies when it
//! is numeric and a non-numeric `pageSize` makes the page size unbounded.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Default count text template.
pub const DEFAULT_COUNT_TEXT: &str = "Showing {PF} - {PL} of {TR} rows";

/// Default text of the empty-state row.
pub const DEFAULT_EMPTY_TEXT: &str = "No Records Found";

/// Option keys whose values are merged key by key instead of replaced.
const NESTED_KEYS: [&str; 4] = ["ajax", "paginationNext", "paginationPrevious", "sortingIcons"];

/// Parses the leading integer of a string, ignoring surrounding whitespace.
///
/// `"12px"` reads as 12 and `"abc"` as `None`.
pub(crate) fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| n * sign)
}

fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

/// Number of rows shown per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// At most this many rows per page (always at least 1).
    Limited(usize),
    /// Every visible row on a single page.
    Unbounded,
}

impl PageSize {
    /// Reads a page size from a selector value; anything non-numeric or
    /// below 1 is unbounded.
    pub fn parse(input: &str) -> Self {
        match parse_int(input) {
            Some(n) if n > 0 => PageSize::Limited(n as usize),
            _ => PageSize::Unbounded,
        }
    }

    fn from_value(value: &Value) -> Self {
        match int_from_value(value) {
            Some(n) if n > 0 => PageSize::Limited(n as usize),
            _ => PageSize::Unbounded,
        }
    }

    /// Returns the row limit, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            PageSize::Limited(n) => Some(*n),
            PageSize::Unbounded => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Limited(10)
    }
}

impl Serialize for PageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PageSize::Limited(n) => serializer.serialize_u64(*n as u64),
            PageSize::Unbounded => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(PageSize::from_value(&value))
    }
}

/// Where table rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DataType {
    /// Rows already present in the view.
    #[default]
    Html,
    /// Rows fetched page by page from a remote endpoint.
    Ajax,
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ajax" => DataType::Ajax,
            _ => DataType::Html,
        }
    }
}

/// HTTP method used for remote requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Parameters travel in the query string.
    #[default]
    Get,
    /// Parameters travel in the request body.
    Post,
}

/// Body encoding for `POST` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// `application/json` body.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded` body.
    Form,
}

/// Sort column and direction sent to the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AjaxSorting {
    /// Data column to sort by; empty means unsorted.
    pub column: String,
    /// Sort descending when set.
    pub desc: bool,
}

/// Remote data source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AjaxConfig {
    /// Endpoint URL.
    pub url: String,
    /// HTTP method.
    #[serde(rename = "type")]
    pub method: HttpMethod,
    /// Extra parameters sent with every request.
    pub data: Map<String, Value>,
    /// Record fields rendered as table cells, in column order.
    pub columns: Vec<String>,
    /// Initial sort sent to the endpoint.
    pub sorting: AjaxSorting,
    /// Text of the empty-state row in remote mode.
    pub empty_text: String,
    /// Body encoding for `POST`.
    pub encoding: BodyEncoding,
    /// Value of the `X-CSRF-TOKEN` header on `POST` requests.
    pub csrf_token: Option<String>,
}

impl Default for AjaxConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: HttpMethod::default(),
            data: Map::new(),
            columns: Vec::new(),
            sorting: AjaxSorting::default(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
            encoding: BodyEncoding::default(),
            csrf_token: None,
        }
    }
}

impl AjaxConfig {
    /// Creates remote settings for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the HTTP method (builder pattern).
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the record fields rendered as cells (builder pattern).
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an extra request parameter (builder pattern).
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Sets the `POST` body encoding (builder pattern).
    pub fn with_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the CSRF token sent on `POST` requests (builder pattern).
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}

/// Label of a previous/next pagination link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrow {
    /// Text shown on the link.
    pub arrow: String,
}

impl Arrow {
    fn new(arrow: &str) -> Self {
        Self {
            arrow: arrow.to_string(),
        }
    }
}

impl Default for Arrow {
    fn default() -> Self {
        Self::new("»")
    }
}

/// Icons shown in sortable column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingIcons {
    /// Column not sorted.
    pub none: String,
    /// Column sorted ascending.
    pub asc: String,
    /// Column sorted descending.
    pub desc: String,
}

impl Default for SortingIcons {
    fn default() -> Self {
        Self {
            none: "⇅".to_string(),
            asc: "▲".to_string(),
            desc: "▼".to_string(),
        }
    }
}

/// Complete option set of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Enables pagination.
    pub pagination: bool,
    /// Rows per page.
    pub page_size: PageSize,
    /// Page shown after initialization (1-based).
    pub page_active: usize,
    /// Control id of the page size selector; empty when there is none.
    pub page_size_selector: String,
    /// Enables sorting on sortable headers.
    pub sorting: bool,
    /// Enables filtering on filterable columns.
    pub filtering: bool,
    /// Control id of the filter text input.
    pub filtering_input: String,
    /// Control id of the button that runs the filter; when empty the
    /// filter runs after typing pauses.
    pub filtering_trigger: String,
    /// Local or remote rows.
    pub data_type: DataType,
    /// Remote data source settings.
    pub ajax: AjaxConfig,
    /// Count text template; see [`crate::paginator::CountText`].
    pub count_text: String,
    /// Text of the empty-state row in local mode.
    pub empty_text: String,
    /// Label of the next-page link.
    pub pagination_next: Arrow,
    /// Label of the previous-page link.
    pub pagination_previous: Arrow,
    /// Links shown on each side of the active page; `None` shows every page.
    pub pagination_side_links: Option<usize>,
    /// Icons for sortable headers.
    pub sorting_icons: SortingIcons,
    /// Pins the header row while the body scrolls.
    pub sticky_header: bool,
    /// Offset of the pinned header.
    pub sticky_header_top: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pagination: false,
            page_size: PageSize::default(),
            page_active: 1,
            page_size_selector: String::new(),
            sorting: false,
            filtering: false,
            filtering_input: String::new(),
            filtering_trigger: String::new(),
            data_type: DataType::default(),
            ajax: AjaxConfig::default(),
            count_text: DEFAULT_COUNT_TEXT.to_string(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
            pagination_next: Arrow::new("»"),
            pagination_previous: Arrow::new("«"),
            pagination_side_links: None,
            sorting_icons: SortingIcons::default(),
            sticky_header: false,
            sticky_header_top: String::new(),
        }
    }
}

impl Config {
    /// Creates a configuration with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a JSON option object merged over the
    /// defaults.
    pub fn from_json(options: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(options)?;
        let mut config = Self::default();
        config.merge(&overrides)?;
        Ok(config)
    }

    /// Merges a JSON option object into this configuration.
    ///
    /// Non-object values are ignored.
    pub fn merge(&mut self, overrides: &Value) -> Result<()> {
        let Some(options) = overrides.as_object() else {
            return Ok(());
        };

        let mut base = serde_json::to_value(&*self)?;
        let Some(properties) = base.as_object_mut() else {
            return Ok(());
        };

        for (key, value) in options {
            match key.as_str() {
                k if NESTED_KEYS.contains(&k) => {
                    let target = properties
                        .entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let (Some(target), Some(value)) = (target.as_object_mut(), value.as_object())
                    {
                        for (k, v) in value {
                            target.insert(k.clone(), v.clone());
                        }
                    }
                }
                "dataType" => {
                    let data_type = value
                        .as_str()
                        .map(|s| DataType::from(s.to_string()))
                        .unwrap_or_default();
                    properties.insert(key.clone(), serde_json::to_value(data_type)?);
                }
                "pageActive" => {
                    if let Some(page) = int_from_value(value) {
                        properties.insert(key.clone(), Value::from(page.max(1)));
                    }
                }
                "pageSize" => {
                    properties.insert(
                        key.clone(),
                        serde_json::to_value(PageSize::from_value(value))?,
                    );
                }
                "paginationSideLinks" => {
                    let side_links = int_from_value(value).filter(|n| *n >= 0);
                    properties.insert(key.clone(), serde_json::to_value(side_links)?);
                }
                _ => {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }

        *self = serde_json::from_value(base)?;
        Ok(())
    }

    /// Returns true in remote mode.
    pub fn is_ajax(&self) -> bool {
        self.data_type == DataType::Ajax
    }

    /// Text of the empty-state row for the current mode.
    pub fn empty_text(&self) -> &str {
        if self.is_ajax() {
            &self.ajax.empty_text
        } else {
            &self.empty_text
        }
    }

    /// Enables or disables pagination (builder pattern).
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.pagination = enabled;
        self
    }

    /// Sets the page size (builder pattern).
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the initially active page (builder pattern).
    pub fn with_page_active(mut self, page: usize) -> Self {
        self.page_active = page.max(1);
        self
    }

    /// Enables or disables sorting (builder pattern).
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.sorting = enabled;
        self
    }

    /// Enables or disables filtering (builder pattern).
    pub fn with_filtering(mut self, enabled: bool) -> Self {
        self.filtering = enabled;
        self
    }

    /// Sets the filter input control id (builder pattern).
    pub fn with_filtering_input(mut self, control: impl Into<String>) -> Self {
        self.filtering_input = control.into();
        self
    }

    /// Sets the filter trigger control id (builder pattern).
    pub fn with_filtering_trigger(mut self, control: impl Into<String>) -> Self {
        self.filtering_trigger = control.into();
        self
    }

    /// Sets the page size selector control id (builder pattern).
    pub fn with_page_size_selector(mut self, control: impl Into<String>) -> Self {
        self.page_size_selector = control.into();
        self
    }

    /// Switches to remote mode with the given settings (builder pattern).
    pub fn with_ajax(mut self, ajax: AjaxConfig) -> Self {
        self.data_type = DataType::Ajax;
        self.ajax = ajax;
        self
    }

    /// Sets the count text template (builder pattern).
    pub fn with_count_text(mut self, template: impl Into<String>) -> Self {
        self.count_text = template.into();
        self
    }

    /// Sets the empty-state text for local mode (builder pattern).
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Limits pagination links to a window around the active page
    /// (builder pattern).
    pub fn with_side_links(mut self, side_links: Option<usize>) -> Self {
        self.pagination_side_links = side_links;
        self
    }

    /// Sets the sortable header icons (builder pattern).
    pub fn with_sorting_icons(mut self, icons: SortingIcons) -> Self {
        self.sorting_icons = icons;
        self
    }

    /// Pins the header row at the given offset (builder pattern).
    pub fn with_sticky_header(mut self, top: impl Into<String>) -> Self {
        self.sticky_header = true;
        self.sticky_header_top = top.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.pagination);
        assert_eq!(config.page_size, PageSize::Limited(10));
        assert_eq!(config.page_active, 1);
        assert_eq!(config.data_type, DataType::Html);
        assert_eq!(config.count_text, DEFAULT_COUNT_TEXT);
        assert_eq!(config.pagination_previous.arrow, "«");
        assert_eq!(config.pagination_next.arrow, "»");
        assert_eq!(config.ajax.method, HttpMethod::Get);
        assert_eq!(config.pagination_side_links, None);
    }

    #[test]
    fn test_parse_int_reads_leading_digits() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int(" 7px"), Some(7));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_merge_nested_keys_merge_per_key() {
        let mut config = Config::default();
        config
            .merge(&json!({
                "ajax": { "url": "/users", "columns": ["id", "name"] },
                "sortingIcons": { "asc": "^" }
            }))
            .unwrap();

        assert_eq!(config.ajax.url, "/users");
        assert_eq!(config.ajax.columns, vec!["id", "name"]);
        assert_eq!(config.ajax.empty_text, DEFAULT_EMPTY_TEXT);
        assert_eq!(config.sorting_icons.asc, "^");
        assert_eq!(config.sorting_icons.none, "⇅");
    }

    #[test]
    fn test_merge_unknown_data_type_falls_back_to_html() {
        let mut config = Config::default();
        config.merge(&json!({ "dataType": "xml" })).unwrap();
        assert_eq!(config.data_type, DataType::Html);

        config.merge(&json!({ "dataType": "ajax" })).unwrap();
        assert!(config.is_ajax());
    }

    #[test]
    fn test_merge_page_active_only_when_numeric() {
        let mut config = Config::default();
        config.merge(&json!({ "pageActive": "3" })).unwrap();
        assert_eq!(config.page_active, 3);

        config.merge(&json!({ "pageActive": "later" })).unwrap();
        assert_eq!(config.page_active, 3);
    }

    #[test]
    fn test_merge_non_numeric_page_size_is_unbounded() {
        let mut config = Config::default();
        config.merge(&json!({ "pageSize": "all" })).unwrap();
        assert_eq!(config.page_size, PageSize::Unbounded);

        config.merge(&json!({ "pageSize": "20" })).unwrap();
        assert_eq!(config.page_size, PageSize::Limited(20));
    }

    #[test]
    fn test_merge_ignores_non_objects() {
        let mut config = Config::default();
        config.merge(&json!(["pagination"])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(
            r#"{
                "pagination": true,
                "paginationSideLinks": 2,
                "countText": "Page {CP} of {TP}",
                "ajax": { "type": "POST", "encoding": "form" }
            }"#,
        )
        .unwrap();

        assert!(config.pagination);
        assert_eq!(config.pagination_side_links, Some(2));
        assert_eq!(config.count_text, "Page {CP} of {TP}");
        assert_eq!(config.ajax.method, HttpMethod::Post);
        assert_eq!(config.ajax.encoding, BodyEncoding::Form);
    }

    #[test]
    fn test_from_json_rejects_invalid_json() {
        assert!(Config::from_json("{ pagination: ").is_err());
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_pagination(true)
            .with_page_size(PageSize::Limited(5))
            .with_sorting(true)
            .with_ajax(AjaxConfig::new("/api/rows").with_columns(["a", "b"]));

        assert!(config.pagination);
        assert!(config.sorting);
        assert!(config.is_ajax());
        assert_eq!(config.ajax.columns.len(), 2);
        assert_eq!(config.empty_text(), DEFAULT_EMPTY_TEXT);
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!(PageSize::parse("50"), PageSize::Limited(50));
        assert_eq!(PageSize::parse("0"), PageSize::Unbounded);
        assert_eq!(PageSize::parse("All"), PageSize::Unbounded);
        assert_eq!(PageSize::Limited(4).limit(), Some(4));
        assert_eq!(PageSize::Unbounded.limit(), None);
    }
}
