//! Request/response values and the transport seam that dispatches them.

use std::time::Duration;

use tracing::{debug, trace};
use ureq::{
    http::{HeaderMap, Method},
    Agent, Proxy, RequestBuilder,
};

use crate::error::{RestError, Result};

pub const ACCEPT_OBJECT: &str = "application/vnd.pgrst.object+json";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const PREFER_REPRESENTATION: &str = "return=representation";

/// A fully built request, ready for a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RestRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path component of the URL, without the query string.
    pub fn path(&self) -> &str {
        let without_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let path_and_query = without_scheme
            .find('/')
            .map_or("/", |idx| &without_scheme[idx..]);
        path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path)
    }

    /// Raw `key=value` pairs of the query string, still percent-encoded.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.url
            .split_once('?')
            .map(|(_, query)| {
                query
                    .split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the response, whatever its status.
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// obtain a response at all are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &RestRequest) -> Result<RestResponse>;
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("vitrine/", env!("CARGO_PKG_VERSION")).into()),
            proxy: None,
            headers: None,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` from this config.
    ///
    /// Status codes are never turned into errors by the agent; the caller
    /// decides what a 4xx/5xx means.
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

/// [`Transport`] backed by a blocking `ureq` agent.
#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: Agent,
    headers: Option<HeaderMap>,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: config.build(),
            headers: config.headers.clone(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

fn apply_headers<B>(
    mut req: RequestBuilder<B>,
    global: &Option<HeaderMap>,
    request: &RestRequest,
) -> RequestBuilder<B> {
    if let Some(headers) = global {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    for (key, value) in &request.headers {
        req = req.header(key.as_str(), value.as_str());
    }
    req
}

impl Transport for UreqTransport {
    fn send(&self, request: &RestRequest) -> Result<RestResponse> {
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();
        trace!(method = %request.method, url, bytes = body.len(), "dispatching request");

        let response = match request.method {
            Method::GET => apply_headers(self.agent.get(url), &self.headers, request).call()?,
            Method::POST => apply_headers(self.agent.post(url), &self.headers, request).send(body)?,
            Method::PATCH => {
                apply_headers(self.agent.patch(url), &self.headers, request).send(body)?
            }
            Method::PUT => apply_headers(self.agent.put(url), &self.headers, request).send(body)?,
            Method::DELETE => {
                let req = apply_headers(self.agent.delete(url), &self.headers, request);
                match &request.body {
                    Some(body) => req.force_send_body().send(body.as_slice())?,
                    None => req.call()?,
                }
            }
            ref other => return Err(RestError::Unsupported(other.to_string())),
        };

        let status = response.status().as_u16();
        let body = response.into_body().read_to_vec()?;
        debug!(method = %request.method, url, status, "request completed");

        Ok(RestResponse {
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.starts_with("vitrine/")));
        assert!(config.proxy.is_none());
        assert!(config.headers.is_none());
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_ureq_transport_builds() {
        let config = ClientConfig {
            user_agent: Some("test-agent".to_string()),
            proxy: None,
            headers: None,
            timeout: Some(Duration::from_secs(5)),
        };
        let _ = UreqTransport::new(&config);
        let _ = UreqTransport::default();
    }

    #[test]
    fn test_unsupported_method() {
        let transport = UreqTransport::default();
        let request = RestRequest::new(Method::OPTIONS, "http://127.0.0.1:9/rest/v1/x");
        assert!(matches!(
            transport.send(&request),
            Err(RestError::Unsupported(m)) if m == "OPTIONS"
        ));
    }

    #[test]
    fn test_request_helpers() {
        let request = RestRequest::new(
            Method::GET,
            "https://abc.example.co/rest/v1/produtos?select=*&id=eq.1&limit=",
        )
        .header("Accept", ACCEPT_OBJECT);

        assert_eq!(request.path(), "/rest/v1/produtos");
        assert_eq!(
            request.query_pairs(),
            vec![("select", "*"), ("id", "eq.1"), ("limit", "")]
        );
        assert_eq!(request.header_value("accept"), Some(ACCEPT_OBJECT));
        assert_eq!(request.header_value("prefer"), None);
    }

    #[test]
    fn test_response_status() {
        assert!(RestResponse::new(201, "").is_success());
        assert!(RestResponse::new(204, Vec::new()).is_success());
        assert!(!RestResponse::new(406, "{}").is_success());
    }
}
