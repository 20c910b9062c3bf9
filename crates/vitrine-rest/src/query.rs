//! Query accumulation and the read path.

use std::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;
use ureq::http::Method;
use vitrine_utils::string::strip_whitespace;

use crate::{
    client::{decode, Client},
    error::{RestError, Result},
    http::{RestRequest, ACCEPT_OBJECT},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Characters left intact by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Reverses [`encode_component`]; invalid UTF-8 is replaced.
pub fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn ascending(ascending: bool) -> Self {
        if ascending {
            Self::Asc
        } else {
            Self::Desc
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Everything a chain has accumulated for one request.
///
/// Each table/column name is forwarded verbatim; filter values and the select
/// list are percent-encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySpec {
    table: String,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn with_columns(mut self, columns: &str) -> Self {
        let columns = strip_whitespace(columns);
        self.columns = Some(if columns.is_empty() {
            "*".to_string()
        } else {
            columns
        });
        self
    }

    /// Adds `column=eq.<value>`, replacing an earlier filter on the same column.
    pub fn with_eq(mut self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        let column = column.into();
        let filter = format!("eq.{}", encode_component(&value.to_string()));
        match self.filters.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = filter,
            None => self.filters.push((column, filter)),
        }
        self
    }

    pub fn with_order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Query parameters in emission order: `select`, filters, `order`, `limit`.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        if let Some(columns) = &self.columns {
            params.push(("select".to_string(), encode_component(columns)));
        }
        params.extend(self.filters.iter().cloned());
        if let Some((column, direction)) = &self.order {
            params.push(("order".to_string(), format!("{column}.{direction}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// `rest/v1/<table>?<params>`, relative to the backend root.
    pub fn path(&self) -> String {
        let params = self.params();
        let mut path = format!("rest/v1/{}", self.table);
        if !params.is_empty() {
            let query: Vec<String> = params.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }

    pub(crate) fn request(&self, client: &Client, method: Method) -> Result<RestRequest> {
        let path = self.path();
        trace!(%method, %path, "built query");
        Ok(client.endpoint()?.request(method, &path))
    }
}

/// A read against one table; resolves to rows when awaited.
///
/// Chain methods consume the builder and return a new one, so a stored
/// intermediate builder is never affected by later calls on a clone.
#[derive(Clone, Debug)]
pub struct SelectBuilder {
    client: Client,
    spec: QuerySpec,
}

impl SelectBuilder {
    pub(crate) fn new(client: Client, spec: QuerySpec) -> Self {
        Self {
            client,
            spec,
        }
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn eq(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            spec: self.spec.with_eq(column, value),
            ..self
        }
    }

    /// Sorts by one column; a later call replaces the earlier sort.
    pub fn order(self, column: impl Into<String>, direction: Direction) -> Self {
        Self {
            spec: self.spec.with_order(column, direction),
            ..self
        }
    }

    pub fn limit(self, limit: usize) -> Self {
        Self {
            spec: self.spec.with_limit(limit),
            ..self
        }
    }

    /// Fetches every matching row.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let request = self.spec.request(&self.client, Method::GET)?;
        let response = self.client.dispatch(request).await?;
        decode(&response.body)
    }

    /// Fetches exactly one row; zero or several matches are a backend error.
    pub async fn single<T: DeserializeOwned>(self) -> Result<T> {
        let request = self
            .spec
            .request(&self.client, Method::GET)?
            .header("Accept", ACCEPT_OBJECT);
        let response = self.client.dispatch(request).await?;
        decode(&response.body)
    }

    /// Fetches the first matching row, or `None` when nothing matches.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let rows: Vec<Value> = self.execute().await?;
        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(RestError::Decode))
            .transpose()
    }
}

impl IntoFuture for SelectBuilder {
    type Output = Result<Vec<Value>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute::<Value>())
    }
}
