//! Insert, update and delete builders.

use std::{fmt, future::IntoFuture};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use ureq::http::Method;

use crate::{
    client::{decode, encode, Client},
    error::{RestError, Result},
    http::{ACCEPT_OBJECT, CONTENT_TYPE_JSON, PREFER_REPRESENTATION},
    query::{BoxFuture, QuerySpec},
};

/// A POST of one row or an array of rows.
///
/// Awaiting it directly returns whatever representation the backend sends back.
#[derive(Clone, Debug)]
pub struct InsertBuilder<T> {
    client: Client,
    spec: QuerySpec,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(client: Client, table: String, values: T) -> Self {
        Self {
            client,
            spec: QuerySpec::new(table),
            values,
        }
    }

    /// Asks for the inserted row(s) restricted to `columns`.
    pub fn select(self, columns: &str) -> ReturningInsert<T> {
        ReturningInsert {
            client: self.client,
            spec: self.spec.with_columns(columns),
            values: self.values,
        }
    }

    pub async fn execute<R: DeserializeOwned>(self) -> Result<R> {
        let body = encode(&self.values)?;
        post(&self.client, &self.spec, body, false).await
    }
}

impl<T: Serialize + Send + 'static> IntoFuture for InsertBuilder<T> {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute::<Value>())
    }
}

/// An insert that carries a `select` list.
#[derive(Clone, Debug)]
pub struct ReturningInsert<T> {
    client: Client,
    spec: QuerySpec,
    values: T,
}

impl<T: Serialize> ReturningInsert<T> {
    /// Returns the inserted row as a single object.
    pub async fn single<R: DeserializeOwned>(self) -> Result<R> {
        let body = encode(&self.values)?;
        post(&self.client, &self.spec, body, true).await
    }

    pub async fn execute<R: DeserializeOwned>(self) -> Result<R> {
        let body = encode(&self.values)?;
        post(&self.client, &self.spec, body, false).await
    }
}

impl<T: Serialize + Send + 'static> IntoFuture for ReturningInsert<T> {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute::<Value>())
    }
}

async fn post<R: DeserializeOwned>(
    client: &Client,
    spec: &QuerySpec,
    body: Vec<u8>,
    single: bool,
) -> Result<R> {
    let mut request = spec
        .request(client, Method::POST)?
        .header("Content-Type", CONTENT_TYPE_JSON)
        .header("Prefer", PREFER_REPRESENTATION);
    if single {
        request = request.header("Accept", ACCEPT_OBJECT);
    }

    let response = client.dispatch(request.body(body)).await?;
    decode(&response.body)
}

/// A PATCH of every row matching the filters. Resolves to `()`; the updated
/// rows are not returned.
#[derive(Clone, Debug)]
pub struct UpdateBuilder<T> {
    client: Client,
    spec: QuerySpec,
    values: T,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(client: Client, table: String, values: T) -> Self {
        Self {
            client,
            spec: QuerySpec::new(table),
            values,
        }
    }

    pub fn eq(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            spec: self.spec.with_eq(column, value),
            ..self
        }
    }

    pub async fn execute(self) -> Result<()> {
        self.client.endpoint()?;
        require_filter(&self.spec, "PATCH")?;

        let body = encode(&self.values)?;
        let request = self
            .spec
            .request(&self.client, Method::PATCH)?
            .header("Content-Type", CONTENT_TYPE_JSON)
            .body(body);
        self.client.dispatch(request).await?;
        Ok(())
    }
}

impl<T: Serialize + Send + 'static> IntoFuture for UpdateBuilder<T> {
    type Output = Result<()>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// A DELETE of every row matching the filters.
#[derive(Clone, Debug)]
pub struct DeleteBuilder {
    client: Client,
    spec: QuerySpec,
}

impl DeleteBuilder {
    pub(crate) fn new(client: Client, table: String) -> Self {
        Self {
            client,
            spec: QuerySpec::new(table),
        }
    }

    pub fn eq(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            spec: self.spec.with_eq(column, value),
            ..self
        }
    }

    pub async fn execute(self) -> Result<()> {
        self.client.endpoint()?;
        require_filter(&self.spec, "DELETE")?;

        let request = self.spec.request(&self.client, Method::DELETE)?;
        self.client.dispatch(request).await?;
        Ok(())
    }
}

impl IntoFuture for DeleteBuilder {
    type Output = Result<()>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

fn require_filter(spec: &QuerySpec, method: &'static str) -> Result<()> {
    if spec.has_filters() {
        return Ok(());
    }
    Err(RestError::MissingFilter {
        method,
        table: spec.table().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Serialize;
    use serde_json::json;

    use super::*;
    use crate::{http::RestResponse, memory::MemoryBackend};

    #[derive(Clone, Serialize)]
    struct NovaCategoria<'a> {
        nome: &'a str,
        slug: &'a str,
    }

    #[tokio::test]
    async fn test_insert_select_single_headers() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.client();

        let row: Value = client
            .from("categorias")
            .insert(NovaCategoria {
                nome: "Salas",
                slug: "salas",
            })
            .select("id, nome")
            .single()
            .await
            .unwrap();
        assert!(row["id"].is_u64());
        assert_eq!(row["nome"], "Salas");
        assert!(row.get("slug").is_none());

        let request = backend.last_request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path(), "/rest/v1/categorias");
        assert_eq!(request.query_pairs(), vec![("select", "id%2Cnome")]);
        assert_eq!(request.header_value("prefer"), Some(PREFER_REPRESENTATION));
        assert_eq!(request.header_value("content-type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(request.header_value("accept"), Some(ACCEPT_OBJECT));
        assert_eq!(
            serde_json::from_slice::<Value>(request.body.as_deref().unwrap()).unwrap(),
            json!({"nome": "Salas", "slug": "salas"})
        );
    }

    #[tokio::test]
    async fn test_bare_insert_returns_representation() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.client();

        let rows = client
            .from("produto_imagens")
            .insert(vec![
                json!({"produto_id": 7, "url": "https://cdn/a.png", "ordem": 0}),
                json!({"produto_id": 7, "url": "https://cdn/b.png", "ordem": 1}),
            ])
            .await
            .unwrap();
        assert_eq!(rows.as_array().map(Vec::len), Some(2));

        let request = backend.last_request().unwrap();
        assert!(request.query_pairs().is_empty());
        assert_eq!(request.header_value("prefer"), Some(PREFER_REPRESENTATION));
        assert!(request.header_value("accept").is_none());
        assert_eq!(backend.rows("produto_imagens").len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_return_no_data() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed("produtos", vec![json!({"id": 1, "nome": "Mesa", "estoque": 5})]);
        let client = backend.client();

        // A backend that echoes rows on PATCH must not leak them.
        backend.respond_next(RestResponse::json(200, &json!([{"id": 1, "estoque": 4}])));
        let updated = client
            .from("produtos")
            .update(json!({"estoque": 4}))
            .eq("id", 1)
            .await;
        assert!(matches!(updated, Ok(())));

        backend.respond_next(RestResponse::json(200, &json!([{"id": 1}])));
        let deleted = client.from("produtos").delete().eq("id", 1).await;
        assert!(matches!(deleted, Ok(())));
    }

    #[tokio::test]
    async fn test_update_patches_matching_rows() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "contatos_simples",
            vec![
                json!({"id": 1, "nome": "Ana", "numero": null}),
                json!({"id": 2, "nome": "Bia", "numero": null}),
            ],
        );
        let client = backend.client();

        client
            .from("contatos_simples")
            .update(json!({"numero": "(11) 98765-4321"}))
            .eq("id", 2)
            .await
            .unwrap();

        let request = backend.last_request().unwrap();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.query_pairs(), vec![("id", "eq.2")]);

        let rows = backend.rows("contatos_simples");
        assert_eq!(rows[0]["numero"], Value::Null);
        assert_eq!(rows[1]["numero"], "(11) 98765-4321");
    }

    #[tokio::test]
    async fn test_delete_removes_matching_rows() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "produto_imagens",
            vec![
                json!({"id": 1, "produto_id": 7}),
                json!({"id": 2, "produto_id": 7}),
                json!({"id": 3, "produto_id": 8}),
            ],
        );
        let client = backend.client();

        client
            .from("produto_imagens")
            .delete()
            .eq("produto_id", 7)
            .await
            .unwrap();

        assert_eq!(backend.last_request().unwrap().method, Method::DELETE);
        assert_eq!(backend.rows("produto_imagens"), vec![json!({"id": 3, "produto_id": 8})]);
    }

    #[tokio::test]
    async fn test_unfiltered_update_and_delete_are_refused() {
        let backend = Arc::new(MemoryBackend::new());
        let client = backend.client();

        let err = client
            .from("produtos")
            .update(json!({"estoque": 0}))
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::MissingFilter { method: "PATCH", .. }));

        let err = client.from("produtos").delete().await.unwrap_err();
        assert!(matches!(err, RestError::MissingFilter { method: "DELETE", .. }));

        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_backend_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.respond_next(RestResponse::json(
            409,
            &json!({"code": "23505", "message": "duplicate key value violates unique constraint"}),
        ));
        let client = backend.client();

        let err = client
            .from("categorias")
            .update(json!({"slug": "salas"}))
            .eq("id", 2)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }
}
