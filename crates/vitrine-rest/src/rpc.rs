use std::future::IntoFuture;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use ureq::http::Method;

use crate::{
    client::{decode, encode, Client},
    error::Result,
    http::CONTENT_TYPE_JSON,
    query::BoxFuture,
};

/// A single-shot call to a stored procedure.
#[derive(Clone, Debug)]
pub struct RpcBuilder<P> {
    client: Client,
    function: String,
    params: P,
}

impl<P: Serialize> RpcBuilder<P> {
    pub(crate) fn new(client: Client, function: String, params: P) -> Self {
        Self {
            client,
            function,
            params,
        }
    }

    pub async fn execute<R: DeserializeOwned>(self) -> Result<R> {
        let endpoint = self.client.endpoint()?;
        let body = encode(&self.params)?;
        let request = endpoint
            .request(Method::POST, &format!("rest/v1/rpc/{}", self.function))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .body(body);

        let response = self.client.dispatch(request).await?;
        decode(&response.body)
    }
}

impl<P: Serialize + Send + 'static> IntoFuture for RpcBuilder<P> {
    type Output = Result<Value>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute::<Value>())
    }
}
