//! Remote page loading.
//!
//! In remote mode every page, sort or page-size change sends one
//! [`PageRequest`] to a [`RemoteSource`]. The bundled [`HttpSource`] talks to
//! an HTTP endpoint returning
//!
//! ```json
//! { "success": true,
//!   "data": { "data": [...], "current_page": 2, "last_page": 5,
//!             "from": 11, "to": 13, "total": 50 },
//!   "message": "" }
//! ```
//!
//! where `data` may also be a bare array of records.

use crate::config::{AjaxConfig, BodyEncoding, HttpMethod};
use crate::error::{Error, Result};
use crate::sorting::SortDirection;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parameters of one page load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    /// Requested page.
    pub page: Option<usize>,
    /// Rows per page; `None` when pagination is off or unbounded.
    pub limit: Option<usize>,
    /// Sort field and direction.
    pub sort: Option<(String, SortDirection)>,
    /// Active filter text.
    pub filter: Option<String>,
    /// Extra parameters from the configuration.
    pub data: Map<String, Value>,
}

impl PageRequest {
    /// All parameters as a JSON object: the extra data overlaid with
    /// `page`, `limit`, `column`, `direction` and `filter`.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = self.data.clone();
        if let Some(page) = self.page {
            params.insert("page".into(), Value::from(page));
        }
        if let Some(limit) = self.limit {
            params.insert("limit".into(), Value::from(limit));
        }
        if let Some((column, direction)) = &self.sort {
            params.insert("column".into(), Value::from(column.as_str()));
            params.insert("direction".into(), Value::from(direction.as_param()));
        }
        if let Some(filter) = &self.filter {
            params.insert("filter".into(), Value::from(filter.as_str()));
        }
        params
    }

    /// All parameters as string pairs, for query strings and form bodies.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.params()
            .into_iter()
            .map(|(key, value)| (key, value_text(&value)))
            .collect()
    }
}

/// Text of a JSON value as shown in a cell or sent in a form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a record as table cells, one per mapped column.
pub fn record_cells(record: &Value, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| record.get(column).map(value_text).unwrap_or_default())
        .collect()
}

/// Paged payload of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagedData {
    /// Records of the requested page.
    pub data: Vec<Value>,
    /// Page the server returned.
    #[serde(default)]
    pub current_page: Option<usize>,
    /// Number of pages.
    #[serde(default)]
    pub last_page: Option<usize>,
    /// 1-based index of the first record.
    #[serde(default)]
    pub from: Option<usize>,
    /// 1-based index of the last record.
    #[serde(default)]
    pub to: Option<usize>,
    /// Total number of records.
    #[serde(default)]
    pub total: Option<usize>,
}

/// The `data` member of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Records with paging metadata.
    Paged(PagedData),
    /// A bare list of records.
    Rows(Vec<Value>),
}

impl ResponseData {
    /// The records, whatever the shape.
    pub fn records(&self) -> &[Value] {
        match self {
            ResponseData::Paged(paged) => &paged.data,
            ResponseData::Rows(rows) => rows,
        }
    }

    /// Paging metadata, when present.
    pub fn paged(&self) -> Option<&PagedData> {
        match self {
            ResponseData::Paged(paged) => Some(paged),
            ResponseData::Rows(_) => None,
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteResponse {
    /// Whether the server considers the request successful.
    #[serde(default)]
    pub success: bool,
    /// Records and paging metadata.
    #[serde(default)]
    pub data: Option<ResponseData>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteResponse {
    /// Records of the response, empty when there is no data.
    pub fn records(&self) -> &[Value] {
        self.data.as_ref().map(ResponseData::records).unwrap_or_default()
    }
}

/// Turns a status and body into a response or an error.
///
/// Non-2xx statuses become [`Error::Http`] with the body's `message`, if it
/// has one. Bodies that are not the expected JSON become [`Error::Decode`].
pub fn parse_response(status: u16, status_text: &str, body: &str) -> Result<RemoteResponse> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").map(value_text))
            .unwrap_or_default();
        return Err(Error::http(status, status_text, message));
    }
    serde_json::from_str(body).map_err(|e| Error::decode(e.to_string(), body))
}

/// Something that can load a page of records.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Loads one page.
    async fn fetch(&self, request: PageRequest) -> Result<RemoteResponse>;
}

/// [`RemoteSource`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: reqwest::Url,
    method: HttpMethod,
    encoding: BodyEncoding,
    csrf_token: Option<String>,
}

impl HttpSource {
    /// Creates a source for the configured endpoint.
    pub fn new(ajax: &AjaxConfig) -> Result<Self> {
        if ajax.url.is_empty() {
            return Err(Error::MissingUrl);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url: reqwest::Url::parse(&ajax.url)?,
            method: ajax.method,
            encoding: ajax.encoding,
            csrf_token: ajax.csrf_token.clone(),
        })
    }

    /// Uses a preconfigured client (builder pattern).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }

    fn build(&self, request: &PageRequest) -> reqwest::RequestBuilder {
        match self.method {
            HttpMethod::Get => self.client.get(self.url.clone()).query(&request.pairs()),
            HttpMethod::Post => {
                let mut builder = self
                    .client
                    .post(self.url.clone())
                    .header("X-Requested-With", "XMLHttpRequest");
                if let Some(token) = &self.csrf_token {
                    builder = builder.header("X-CSRF-TOKEN", token);
                }
                match self.encoding {
                    BodyEncoding::Json => builder.json(&request.params()),
                    BodyEncoding::Form => builder.form(&request.pairs()),
                }
            }
        }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch(&self, request: PageRequest) -> Result<RemoteResponse> {
        log::debug!("fetching {} page {:?}", self.url, request.page);
        let response = self.build(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_response(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_params_overlay_data() {
        let mut data = Map::new();
        data.insert("status".into(), json!("active"));
        data.insert("page".into(), json!(99));

        let request = PageRequest {
            page: Some(2),
            limit: Some(10),
            sort: Some(("name".into(), SortDirection::Descending)),
            filter: Some("ada".into()),
            data,
        };
        let params = request.params();

        assert_eq!(params["page"], json!(2));
        assert_eq!(params["limit"], json!(10));
        assert_eq!(params["column"], json!("name"));
        assert_eq!(params["direction"], json!("DESC"));
        assert_eq!(params["filter"], json!("ada"));
        assert_eq!(params["status"], json!("active"));
    }

    #[test]
    fn test_params_omit_unset_fields() {
        let params = PageRequest::default().params();
        assert!(params.is_empty());
    }

    #[test]
    fn test_pairs_stringify_values() {
        let request = PageRequest {
            page: Some(3),
            ..PageRequest::default()
        };
        assert_eq!(request.pairs(), vec![("page".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_record_cells() {
        let record = json!({ "id": 7, "name": "Ada", "email": null, "admin": true });
        let columns: Vec<String> = ["id", "name", "email", "admin", "missing"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(record_cells(&record, &columns), vec!["7", "Ada", "", "true", ""]);
    }

    #[test]
    fn test_parse_paged_response() {
        let body = r#"{
            "success": true,
            "data": {
                "data": [{"id": 1}, {"id": 2}, {"id": 3}],
                "current_page": 2, "last_page": 5, "from": 11, "to": 13, "total": 50
            }
        }"#;
        let response = parse_response(200, "OK", body).unwrap();
        assert!(response.success);
        assert_eq!(response.records().len(), 3);

        let paged = response.data.as_ref().and_then(ResponseData::paged).unwrap();
        assert_eq!(paged.current_page, Some(2));
        assert_eq!(paged.last_page, Some(5));
        assert_eq!(paged.total, Some(50));
    }

    #[test]
    fn test_parse_flat_response() {
        let response = parse_response(200, "OK", r#"{"success": true, "data": [{"id": 1}]}"#).unwrap();
        assert_eq!(response.records().len(), 1);
        assert!(response.data.as_ref().unwrap().paged().is_none());
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_response(200, "OK", "<html>oops</html>").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_parse_error_status() {
        let err = parse_response(422, "Unprocessable Entity", r#"{"message": "bad page"}"#).unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "bad page");
        assert_eq!(err.status_text(), "Unprocessable Entity");

        let err = parse_response(500, "Internal Server Error", "crash").unwrap_err();
        assert_eq!(err.message(), "");
    }

    #[test]
    fn test_http_source_requires_url() {
        assert!(matches!(
            HttpSource::new(&AjaxConfig::default()),
            Err(Error::MissingUrl)
        ));
        assert!(matches!(
            HttpSource::new(&AjaxConfig::new("not a url")),
            Err(Error::InvalidUrl(_))
        ));
    }

    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}/users", addr), handle)
    }

    #[tokio::test]
    async fn test_http_source_get_sends_query() {
        let (url, server) = serve_once(r#"{"success": true, "data": []}"#).await;
        let source = HttpSource::new(&AjaxConfig::new(url)).unwrap();

        let response = source
            .fetch(PageRequest {
                page: Some(2),
                limit: Some(10),
                ..PageRequest::default()
            })
            .await
            .unwrap();
        assert!(response.success);

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap_or_default().to_string();
        assert!(request_line.starts_with("GET /users?"));
        assert!(request_line.contains("page=2"));
        assert!(request_line.contains("limit=10"));
    }
}
