//! In-memory stand-in for a PostgREST and storage backend.
//!
//! [`MemoryBackend`] is a [`Transport`] that records every request it sees and
//! answers the subset of the protocol the client speaks: `eq` filters,
//! `order`, `limit`, singular responses, inserts with generated ids, PATCH
//! merges, DELETE, RPC handlers and bucket objects.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, VecDeque},
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::{json, Map, Value};
use ureq::http::Method;

use crate::{
    client::{Client, RestConfig},
    error::{ApiError, RestError, Result},
    http::{RestRequest, RestResponse, Transport, ACCEPT_OBJECT},
    query::decode_component,
};

type RpcHandler = Box<dyn Fn(&Value) -> std::result::Result<Value, ApiError> + Send>;

#[derive(Default)]
struct State {
    tables: BTreeMap<String, Vec<Value>>,
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    rpc: HashMap<String, RpcHandler>,
    requests: Vec<RestRequest>,
    canned: VecDeque<RestResponse>,
    failures: VecDeque<io::ErrorKind>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub const BASE_URL: &'static str = "http://localhost:54321";
    pub const API_KEY: &'static str = "memory-anon-key";

    pub fn new() -> Self {
        Self::default()
    }

    /// A configured client dispatching into this backend.
    pub fn client(self: &Arc<Self>) -> Client {
        let transport: Arc<dyn Transport> = self.clone();
        match Client::new(RestConfig::new(Self::BASE_URL, Self::API_KEY), transport) {
            Ok(client) => client,
            Err(_) => Client::unconfigured(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends rows to `table`, keeping their ids.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state();
        let max_id = rows.iter().filter_map(|r| r["id"].as_u64()).max();
        if let Some(max_id) = max_id {
            state.next_id = state.next_id.max(max_id);
        }
        state.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state().buckets.entry(bucket.to_string()).or_default();
    }

    pub fn objects(&self, bucket: &str) -> Vec<String> {
        self.state()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.state().buckets.get(bucket)?.get(path).cloned()
    }

    pub fn on_rpc<F>(&self, function: &str, handler: F)
    where
        F: Fn(&Value) -> std::result::Result<Value, ApiError> + Send + 'static,
    {
        self.state()
            .rpc
            .insert(function.to_string(), Box::new(handler));
    }

    /// Answers the next request with `response` instead of handling it.
    pub fn respond_next(&self, response: RestResponse) {
        self.state().canned.push_back(response);
    }

    /// Fails the next request as if the connection broke.
    pub fn fail_next(&self, kind: io::ErrorKind) {
        self.state().failures.push_back(kind);
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> Option<RestRequest> {
        self.state().requests.last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

impl Transport for MemoryBackend {
    fn send(&self, request: &RestRequest) -> Result<RestResponse> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some(kind) = state.failures.pop_front() {
            return Err(RestError::Io(io::Error::new(kind, "injected transport failure")));
        }
        if let Some(response) = state.canned.pop_front() {
            return Ok(response);
        }

        let path = request.path().to_string();
        let response = if let Some(function) = path.strip_prefix("/rest/v1/rpc/") {
            state.call(function, request)
        } else if let Some(table) = path.strip_prefix("/rest/v1/") {
            state.table_request(table, request)
        } else if let Some(object) = path.strip_prefix("/storage/v1/object/") {
            state.storage_request(object, request)
        } else {
            error_response(404, None, "not found")
        };
        Ok(response)
    }
}

fn error_response(status: u16, code: Option<&str>, message: &str) -> RestResponse {
    RestResponse::json(
        status,
        &json!({"code": code, "message": message, "details": null, "hint": null}),
    )
}

fn storage_error(status: &str, error: &str, message: &str) -> RestResponse {
    RestResponse::json(
        400,
        &json!({"statusCode": status, "error": error, "message": message}),
    )
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

/// Splits a select list on top-level commas, leaving embedded resources whole.
fn split_columns(select: &str) -> Vec<&str> {
    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in select.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                columns.push(&select[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    columns.push(&select[start..]);
    columns.into_iter().filter(|c| !c.is_empty()).collect()
}

/// Projects `row` onto plain columns. Embedded resources are not resolved.
fn project(row: &Value, select: Option<&str>) -> Value {
    let Some(select) = select else {
        return row.clone();
    };
    let columns = split_columns(select);
    if columns.contains(&"*") {
        return row.clone();
    }

    let mut projected = Map::new();
    for column in columns.into_iter().filter(|c| !c.contains('(')) {
        if let Some(value) = row.get(column) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    fn parse(request: &RestRequest) -> Self {
        let mut query = Query {
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        };
        for (key, value) in request.query_pairs() {
            let value = decode_component(value);
            match key {
                "select" => query.select = Some(value),
                "limit" => query.limit = value.parse().ok(),
                "order" => {
                    let (column, direction) = value.rsplit_once('.').unwrap_or((value.as_str(), "asc"));
                    query.order = Some((column.to_string(), direction != "desc"));
                }
                column => {
                    if let Some(expected) = value.strip_prefix("eq.") {
                        query.filters.push((column.to_string(), expected.to_string()));
                    }
                }
            }
        }
        query
    }

    fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column)
                .is_some_and(|value| !value.is_null() && cell_text(value) == *expected)
        })
    }
}

fn wants_object(request: &RestRequest) -> bool {
    request.header_value("accept") == Some(ACCEPT_OBJECT)
}

fn wants_representation(request: &RestRequest) -> bool {
    request
        .header_value("prefer")
        .is_some_and(|p| p.contains("return=representation"))
}

fn singular(rows: Vec<Value>) -> RestResponse {
    if rows.len() == 1 {
        return RestResponse::json(200, &rows[0]);
    }
    RestResponse::json(
        406,
        &json!({
            "code": "PGRST116",
            "details": format!("The result contains {} rows", rows.len()),
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned",
        }),
    )
}

fn parse_body(request: &RestRequest) -> std::result::Result<Value, RestResponse> {
    let body = request.body.as_deref().unwrap_or_default();
    serde_json::from_slice(body)
        .map_err(|e| error_response(400, Some("PGRST102"), &format!("Invalid body: {e}")))
}

impl State {
    fn call(&mut self, function: &str, request: &RestRequest) -> RestResponse {
        let Some(handler) = self.rpc.get(function) else {
            return error_response(
                404,
                Some("PGRST202"),
                &format!("Could not find the function public.{function}"),
            );
        };
        let params = match parse_body(request) {
            Ok(params) => params,
            Err(response) => return response,
        };
        match handler(&params) {
            Ok(value) => RestResponse::json(200, &value),
            Err(error) => {
                error_response(400, error.code.as_deref(), &error.message)
            }
        }
    }

    fn table_request(&mut self, table: &str, request: &RestRequest) -> RestResponse {
        let query = Query::parse(request);
        match request.method {
            Method::GET => {
                let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or_default();
                let mut selected: Vec<Value> =
                    rows.iter().filter(|row| query.matches(row)).cloned().collect();
                if let Some((column, ascending)) = &query.order {
                    selected.sort_by(|a, b| {
                        let ordering = compare(&a[column.as_str()], &b[column.as_str()]);
                        if *ascending {
                            ordering
                        } else {
                            ordering.reverse()
                        }
                    });
                }
                if let Some(limit) = query.limit {
                    selected.truncate(limit);
                }
                let selected: Vec<Value> = selected
                    .iter()
                    .map(|row| project(row, query.select.as_deref()))
                    .collect();

                if wants_object(request) {
                    singular(selected)
                } else {
                    RestResponse::json(200, &Value::Array(selected))
                }
            }
            Method::POST => {
                let body = match parse_body(request) {
                    Ok(body) => body,
                    Err(response) => return response,
                };
                let values = match body {
                    Value::Array(values) => values,
                    value @ Value::Object(_) => vec![value],
                    _ => return error_response(400, Some("PGRST102"), "Expected object or array"),
                };

                let mut inserted = Vec::with_capacity(values.len());
                for mut value in values {
                    if let Some(row) = value.as_object_mut() {
                        if !row.contains_key("id") {
                            self.next_id += 1;
                            row.insert("id".into(), json!(self.next_id));
                        }
                    }
                    inserted.push(value);
                }
                self.tables
                    .entry(table.to_string())
                    .or_default()
                    .extend(inserted.iter().cloned());

                if !wants_representation(request) {
                    return RestResponse::new(201, Vec::new());
                }
                let inserted: Vec<Value> = inserted
                    .iter()
                    .map(|row| project(row, query.select.as_deref()))
                    .collect();
                if wants_object(request) {
                    let mut response = singular(inserted);
                    if response.status == 200 {
                        response.status = 201;
                    }
                    response
                } else {
                    RestResponse::json(201, &Value::Array(inserted))
                }
            }
            Method::PATCH => {
                let changes = match parse_body(request) {
                    Ok(Value::Object(changes)) => changes,
                    Ok(_) => return error_response(400, Some("PGRST102"), "Expected object"),
                    Err(response) => return response,
                };
                for row in self.tables.entry(table.to_string()).or_default() {
                    if query.matches(row) {
                        if let Some(row) = row.as_object_mut() {
                            row.extend(changes.clone());
                        }
                    }
                }
                RestResponse::new(204, Vec::new())
            }
            Method::DELETE => {
                if let Some(rows) = self.tables.get_mut(table) {
                    rows.retain(|row| !query.matches(row));
                }
                RestResponse::new(204, Vec::new())
            }
            _ => error_response(405, None, "method not allowed"),
        }
    }

    fn storage_request(&mut self, object: &str, request: &RestRequest) -> RestResponse {
        let (bucket, path) = object.split_once('/').unwrap_or((object, ""));
        let path = decode_component(path);
        let path = path.as_str();
        let Some(objects) = self.buckets.get_mut(bucket) else {
            return storage_error("404", "Bucket not found", "Bucket not found");
        };

        match request.method {
            Method::POST if !path.is_empty() => {
                let upsert = request.header_value("x-upsert") == Some("true");
                if objects.contains_key(path) && !upsert {
                    return storage_error("409", "Duplicate", "The resource already exists");
                }
                objects.insert(
                    path.to_string(),
                    request.body.clone().unwrap_or_default(),
                );
                RestResponse::json(200, &json!({"Key": format!("{bucket}/{path}")}))
            }
            Method::DELETE if path.is_empty() => {
                let prefixes: Vec<String> = parse_body(request)
                    .ok()
                    .and_then(|body| serde_json::from_value(body["prefixes"].clone()).ok())
                    .unwrap_or_default();
                let removed: Vec<Value> = prefixes
                    .iter()
                    .filter(|prefix| objects.remove(prefix.as_str()).is_some())
                    .map(|prefix| json!({"name": prefix, "bucket_id": bucket}))
                    .collect();
                RestResponse::json(200, &Value::Array(removed))
            }
            _ => storage_error("400", "InvalidRequest", "Unsupported storage operation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> RestRequest {
        RestRequest::new(Method::GET, format!("{}{url}", MemoryBackend::BASE_URL))
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(
            split_columns("*,produto:produtos(id,nome),nome"),
            vec!["*", "produto:produtos(id,nome)", "nome"]
        );
        assert_eq!(split_columns("id"), vec!["id"]);
    }

    #[test]
    fn test_filters_are_decoded() {
        let backend = MemoryBackend::new();
        backend.seed("categorias", vec![json!({"id": 1, "nome": "Sala de estar"})]);

        let response = backend
            .send(&get("/rest/v1/categorias?select=*&nome=eq.Sala%20de%20estar"))
            .unwrap();
        let rows: Vec<Value> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_null_sorts_last() {
        let backend = MemoryBackend::new();
        backend.seed(
            "produtos",
            vec![
                json!({"id": 1, "preco": null}),
                json!({"id": 2, "preco": 5}),
                json!({"id": 3, "preco": 1}),
            ],
        );
        let response = backend
            .send(&get("/rest/v1/produtos?select=id&order=preco.asc"))
            .unwrap();
        let rows: Vec<Value> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(rows, vec![json!({"id": 3}), json!({"id": 2}), json!({"id": 1})]);
    }

    #[test]
    fn test_seed_advances_generated_ids() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed("produtos", vec![json!({"id": 41})]);
        let request = RestRequest::new(
            Method::POST,
            format!("{}/rest/v1/produtos", MemoryBackend::BASE_URL),
        )
        .header("Prefer", "return=representation")
        .body(br#"{"nome":"Mesa"}"#.to_vec());

        let response = backend.send(&request).unwrap();
        assert_eq!(response.status, 201);
        let rows: Vec<Value> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(rows[0]["id"], 42);
    }

    #[test]
    fn test_unknown_route() {
        let backend = MemoryBackend::new();
        let response = backend.send(&get("/auth/v1/user")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(backend.request_count(), 1);
    }
}
