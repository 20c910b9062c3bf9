use std::{fmt, sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};
use ureq::http::Method;
use url::Url;

use crate::{
    error::{ApiError, RestError, Result},
    http::{ClientConfig, RestRequest, RestResponse, Transport, UreqTransport},
    mutation::{DeleteBuilder, InsertBuilder, UpdateBuilder},
    query::{QuerySpec, SelectBuilder},
    rpc::RpcBuilder,
    storage::StorageClient,
};

/// Connection settings for [`Client`].
///
/// A missing or blank `base_url` or `api_key` puts the client in
/// unconfigured mode instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub(crate) struct Endpoint {
    base_url: String,
    api_key: String,
}

impl Endpoint {
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a request carrying the `apikey` and bearer headers.
    pub(crate) fn request(&self, method: Method, path: &str) -> RestRequest {
        RestRequest::new(method, format!("{}/{}", self.base_url, path))
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

struct ClientInner {
    endpoint: Option<Endpoint>,
    transport: Arc<dyn Transport>,
}

struct Offline;

impl Transport for Offline {
    fn send(&self, _request: &RestRequest) -> Result<RestResponse> {
        Err(RestError::NotConfigured)
    }
}

/// Entry point for table queries, mutations, RPC calls and storage.
///
/// Cheap to clone; all clones share the endpoint and transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field(
                "base_url",
                &self.inner.endpoint.as_ref().map(Endpoint::base_url),
            )
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Client {
    /// Creates a client dispatching through `transport`.
    ///
    /// Returns an unconfigured client when the URL or key is missing, and an
    /// error only when a URL is present but malformed.
    pub fn new(config: RestConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = non_blank(config.base_url.as_deref());
        let api_key = non_blank(config.api_key.as_deref());

        let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
            let missing: Vec<&str> = [("BASE_URL", base_url), ("API_KEY", api_key)]
                .into_iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| name)
                .collect();
            error!(
                "REST backend not configured: missing {}; requests will fail until it is set",
                missing.join(" and ")
            );
            return Ok(Self::offline());
        };

        Url::parse(base_url).map_err(|source| {
            RestError::InvalidUrl {
                url: base_url.to_string(),
                source,
            }
        })?;

        let base_url = base_url.trim_end_matches('/').to_string();
        debug!(%base_url, "REST client configured");

        Ok(Self {
            inner: Arc::new(ClientInner {
                endpoint: Some(Endpoint {
                    base_url,
                    api_key: api_key.to_string(),
                }),
                transport,
            }),
        })
    }

    /// Creates a client backed by a `ureq` agent honouring the timeout and user agent.
    pub fn from_config(config: RestConfig) -> Result<Self> {
        let defaults = ClientConfig::default();
        let transport = UreqTransport::new(&ClientConfig {
            user_agent: config.user_agent.clone().or(defaults.user_agent),
            timeout: config.timeout.or(defaults.timeout),
            ..defaults
        });
        Self::new(config, Arc::new(transport))
    }

    /// A client that never touches the network: every terminal operation
    /// resolves to [`RestError::NotConfigured`].
    pub fn unconfigured() -> Self {
        error!("REST backend not configured: requests will fail until BASE_URL and API_KEY are set");
        Self::offline()
    }

    fn offline() -> Self {
        Self {
            inner: Arc::new(ClientInner {
                endpoint: None,
                transport: Arc::new(Offline),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.endpoint.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.inner.endpoint.as_ref().map(Endpoint::base_url)
    }

    pub fn from(&self, table: impl Into<String>) -> TableHandle {
        TableHandle {
            client: self.clone(),
            table: table.into(),
        }
    }

    /// Calls a stored procedure at `/rest/v1/rpc/<function>`.
    pub fn rpc<P: Serialize>(&self, function: impl Into<String>, params: P) -> RpcBuilder<P> {
        RpcBuilder::new(self.clone(), function.into(), params)
    }

    pub fn storage(&self) -> StorageClient {
        StorageClient::new(self.clone())
    }

    pub(crate) fn endpoint(&self) -> Result<&Endpoint> {
        self.inner.endpoint.as_ref().ok_or(RestError::NotConfigured)
    }

    /// Sends `request` and turns non-2xx responses into [`RestError::Api`].
    pub(crate) async fn dispatch(&self, request: RestRequest) -> Result<RestResponse> {
        let response = self.inner.transport.send(&request)?;
        if response.is_success() {
            return Ok(response);
        }

        let error = ApiError::from_body(response.status, &response.body);
        if response.status >= 500 {
            warn!(status = response.status, url = %request.url, "backend error: {error}");
        } else {
            debug!(status = response.status, url = %request.url, "request rejected: {error}");
        }
        Err(RestError::Api {
            status: response.status,
            error,
        })
    }
}

/// Parses a JSON response body; an empty body reads as `null`.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(RestError::Decode)
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(RestError::Encode)
}

/// Operations on a single table. Nothing is sent until a builder is awaited.
#[derive(Clone, Debug)]
pub struct TableHandle {
    client: Client,
    table: String,
}

impl TableHandle {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Starts a read. Whitespace in `columns` is ignored; an empty list means `*`.
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(
            self.client.clone(),
            QuerySpec::new(&self.table).with_columns(columns),
        )
    }

    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.client.clone(), self.table.clone(), values)
    }

    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.client.clone(), self.table.clone(), values)
    }

    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.client.clone(), self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;
    use crate::{memory::MemoryBackend, Direction};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Produto {
        id: u64,
        nome: String,
        preco: f64,
        estoque: i64,
    }

    #[test]
    fn test_missing_settings_yield_unconfigured_client() {
        let transport: Arc<dyn Transport> = Arc::new(MemoryBackend::new());

        let client = Client::new(RestConfig::default(), transport.clone()).unwrap();
        assert!(!client.is_configured());

        let config = RestConfig {
            base_url: Some("https://abc.example.co".into()),
            api_key: Some("   ".into()),
            ..RestConfig::default()
        };
        let client = Client::new(config, transport).unwrap();
        assert!(!client.is_configured());
        assert!(client.base_url().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let transport: Arc<dyn Transport> = Arc::new(MemoryBackend::new());
        let result = Client::new(RestConfig::new("not a url", "key"), transport);
        assert!(matches!(result, Err(RestError::InvalidUrl { .. })));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport: Arc<dyn Transport> = Arc::new(MemoryBackend::new());
        let client =
            Client::new(RestConfig::new("https://abc.example.co///", "key"), transport).unwrap();
        assert_eq!(client.base_url(), Some("https://abc.example.co"));
        assert!(format!("{client:?}").contains("configured: true"));
    }

    #[test]
    fn test_from_config_builds_ureq_client() {
        let client = Client::from_config(RestConfig {
            timeout: Some(Duration::from_secs(2)),
            user_agent: Some("vitrine-test".into()),
            ..RestConfig::new("https://abc.example.co", "key")
        })
        .unwrap();
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_every_request_carries_credentials() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.client();

        client.from("produtos").select("*").await.unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.header_value("apikey"), Some(MemoryBackend::API_KEY));
        assert_eq!(
            request.header_value("authorization"),
            Some(format!("Bearer {}", MemoryBackend::API_KEY).as_str())
        );
        assert!(request.url.starts_with(MemoryBackend::BASE_URL));
    }

    #[tokio::test]
    async fn test_unconfigured_client_never_throws() {
        let client = Client::unconfigured();
        let table = client.from("produtos");

        let err = table.select("*").eq("id", 1).single::<Value>().await.unwrap_err();
        assert!(matches!(err, RestError::NotConfigured));
        assert!(!err.to_string().is_empty());

        assert!(matches!(
            table.select("*").eq("id", 1).maybe_single::<Value>().await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            table.select("*").order("nome", Direction::Asc).await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            table.insert(json!({"nome": "Mesa"})).select("*").single::<Value>().await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            table.insert(json!({"nome": "Mesa"})).await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            table.update(json!({"estoque": 1})).eq("id", 1).await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            table.delete().eq("id", 1).await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            client.rpc("contar", json!({})).await,
            Err(RestError::NotConfigured)
        ));

        let bucket = client.storage().from("produtos");
        assert!(matches!(
            bucket.upload("a.png", b"png".to_vec(), Default::default()).await,
            Err(RestError::NotConfigured)
        ));
        assert!(matches!(
            bucket.remove(&["a.png"]).await,
            Err(RestError::NotConfigured)
        ));
        assert_eq!(bucket.get_public_url("a.png"), "");
    }

    #[tokio::test]
    async fn test_end_to_end_insert_update_select() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.client();
        let produtos = client.from("produtos");

        let created: Produto = produtos
            .insert(json!({"nome": "Mesa", "preco": 100, "estoque": 5}))
            .select("*")
            .single()
            .await
            .unwrap();
        assert_eq!(created.nome, "Mesa");
        assert_eq!(created.estoque, 5);

        produtos
            .update(json!({"estoque": 4}))
            .eq("id", created.id)
            .await
            .unwrap();

        let reloaded: Produto = produtos
            .select("*")
            .eq("id", created.id)
            .single()
            .await
            .unwrap();
        assert_eq!(
            reloaded,
            Produto {
                estoque: 4,
                ..created
            }
        );
        assert_eq!(backend.request_count(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_is_normalised() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_next(std::io::ErrorKind::ConnectionRefused);
        let client = backend.client();

        let err = client.from("produtos").select("*").await.unwrap_err();
        assert!(err.is_transport());

        // Only the next request fails.
        assert!(client.from("produtos").select("*").await.is_ok());
    }
}
