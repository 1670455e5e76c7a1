//! HTTP record store speaking the hosted table REST dialect.
//!
//! # Responsibility
//! - Map select/insert/delete onto `GET`/`POST`/`DELETE /rest/v1/{table}`.
//! - Authenticate every request with the configured key.
//!
//! # Invariants
//! - Filters are sent as `{column}=eq.{value}` query pairs.
//! - Calls block until the response arrives or the transport times out.
//! - Logs carry table, filter count, row count and timing only.

use crate::config::StoreConfig;
use crate::store::{
    reject_unfiltered_delete, Filters, RecordStoreClient, Row, StoreError, StoreResult,
};
use log::{debug, error};
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Instant;

const REST_PATH: &str = "/rest/v1";

/// Blocking REST client for the hosted table store.
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRecordStore {
    /// Builds a client from validated configuration.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Returns the endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{REST_PATH}/{table}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn send(&self, op: &str, table: &str, request: RequestBuilder) -> StoreResult<Response> {
        let started_at = Instant::now();
        let result = request
            .send()
            .map_err(StoreError::from)
            .and_then(check_status);

        match &result {
            Ok(response) => debug!(
                "event=store_{op} module=store status=ok backend=rest table={table} http_status={} duration_ms={}",
                response.status().as_u16(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_{op} module=store status=error backend=rest table={table} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

impl RecordStoreClient for RestRecordStore {
    fn select(&self, table: &str, filters: &Filters) -> StoreResult<Vec<Row>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter_params(filters));

        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query);
        let response = self.send("select", table, request)?;
        let rows = response
            .json::<Vec<Row>>()
            .map_err(|err| StoreError::Decode(err.to_string()))?;

        debug!(
            "event=store_select module=store status=decoded backend=rest table={table} filters={} rows={}",
            filters.len(),
            rows.len()
        );
        Ok(rows)
    }

    fn insert(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let request = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(rows);
        self.send("insert", table, request)?;
        Ok(())
    }

    fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        reject_unfiltered_delete(table, filters)?;

        let request = self
            .authorized(self.client.delete(self.table_url(table)))
            .query(&filter_params(filters));
        self.send("delete", table, request)?;
        Ok(())
    }
}

fn filter_params(filters: &Filters) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(column, value)| (column.to_string(), format!("eq.{value}")))
        .collect()
}

fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(StoreError::status(status.as_u16(), &body))
}

#[cfg(test)]
mod tests {
    use super::{filter_params, RestRecordStore};
    use crate::config::StoreConfig;
    use crate::model::book::{NewBook, ReadStatus};
    use crate::store::{Filters, RecordStoreClient, StoreError};
    use serde_json::{json, Value};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Request as seen by the one-shot server.
    struct Captured {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Captured {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    /// Accepts one connection, records the request and answers with
    /// `status_line` and a JSON `body`.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(key, _)| key == "content-length")
                .map_or(0, |(_, value)| value.parse::<usize>().unwrap());
            let mut raw_body = vec![0; length];
            reader.read_exact(&mut raw_body).unwrap();

            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(raw_body).unwrap(),
            }
        });

        (format!("http://{addr}"), handle)
    }

    fn store(url: &str) -> RestRecordStore {
        let config = StoreConfig::new(url, "test-key").unwrap();
        RestRecordStore::new(&config).unwrap()
    }

    #[test]
    fn filters_become_eq_query_pairs() {
        let filters = Filters::new().eq("Title", "Dune").eq("Author", "Frank Herbert");
        assert_eq!(
            filter_params(&filters),
            vec![
                ("Title".to_string(), "eq.Dune".to_string()),
                ("Author".to_string(), "eq.Frank Herbert".to_string()),
            ]
        );
    }

    #[test]
    fn table_url_joins_rest_path() {
        let store = store("https://demo.supabase.co/");
        assert_eq!(
            store.table_url("library-management"),
            "https://demo.supabase.co/rest/v1/library-management"
        );
    }

    #[test]
    fn unfiltered_delete_is_rejected_before_any_request() {
        let store = store("http://127.0.0.1:9");
        let err = store
            .delete("library-management", &Filters::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn unreachable_endpoint_reports_http_error() {
        let store = store("http://127.0.0.1:9");
        let err = store
            .select("library-management", &Filters::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::Http(_)), "unexpected error: {err}");
    }

    #[test]
    fn select_sends_auth_headers_and_decodes_store_rows() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"id":1,"created_at":"2024-05-01T12:00:00+00:00","Title":"Dune","Author":"Herbert","Publication Year":1965,"Genre":"Sci-Fi","Read Status":"Yes"}]"#,
        );

        let rows = store(&url)
            .select("library-management", &Filters::new().eq("Title", "Dune"))
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(
            request.request_line,
            "GET /rest/v1/library-management?select=*&Title=eq.Dune HTTP/1.1"
        );
        assert_eq!(request.header("apikey"), Some("test-key"));
        assert_eq!(request.header("authorization"), Some("Bearer test-key"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[0]["Publication Year"], 1965);
    }

    #[test]
    fn insert_posts_json_array_with_minimal_return() {
        let (url, server) = serve_once("HTTP/1.1 201 Created", "");
        let row = NewBook::new("Dune", "Herbert", 1965, "Sci-Fi", ReadStatus::Unread)
            .validate()
            .unwrap()
            .to_row();

        store(&url).insert("library-management", &[row]).unwrap();
        let request = server.join().unwrap();

        assert_eq!(
            request.request_line,
            "POST /rest/v1/library-management HTTP/1.1"
        );
        assert_eq!(request.header("prefer"), Some("return=minimal"));
        assert_eq!(request.header("apikey"), Some("test-key"));
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            body,
            json!([{
                "Title": "Dune",
                "Author": "Herbert",
                "Publication Year": 1965,
                "Genre": "Sci-Fi",
                "Read Status": "No"
            }])
        );
    }

    #[test]
    fn delete_sends_eq_filters() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "");

        store(&url)
            .delete("library-management", &Filters::new().eq("Title", "Dune"))
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(
            request.request_line,
            "DELETE /rest/v1/library-management?Title=eq.Dune HTTP/1.1"
        );
        assert_eq!(request.header("authorization"), Some("Bearer test-key"));
    }

    #[test]
    fn client_error_status_maps_to_status_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"message":"Invalid API key"}"#,
        );

        let err = store(&url)
            .select("library-management", &Filters::new())
            .unwrap_err();
        server.join().unwrap();

        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"), "unexpected body: {body}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
