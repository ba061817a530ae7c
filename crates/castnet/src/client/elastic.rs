//! Production [`SearchClient`] backed by the official Elasticsearch
//! transport.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::request::JsonBody;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::{
    IndicesCloseParts, IndicesCreateParts, IndicesDeleteAliasParts, IndicesDeleteParts,
    IndicesExistsAliasParts, IndicesExistsParts, IndicesGetAliasParts, IndicesGetMappingParts,
    IndicesOpenParts, IndicesPutAliasParts, IndicesPutMappingParts, IndicesPutSettingsParts,
};
use elasticsearch::{BulkParts, CountParts, DeleteByQueryParts, Elasticsearch, SearchParts};
use serde_json::Value;

use crate::client::SearchClient;
use crate::config::{Auth, ConnectionConfig};
use crate::error::{ClientError, ClientResult, ConfigurationError, EngineError, EngineResult};

/// The production client.
pub struct ElasticClient {
    inner: Elasticsearch,
}

impl ElasticClient {
    /// Builds a client from connection configuration.
    ///
    /// Currently uses a single-node connection pool over the first
    /// configured node.
    pub fn new(config: &ConnectionConfig) -> EngineResult<Self> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url = url.parse().map_err(|e| {
            EngineError::Configuration(ConfigurationError::InvalidNodeUrl {
                url: url.clone(),
                message: format!("{}", e),
            })
        })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                Auth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                Auth::Bearer { token } => builder.auth(Credentials::Bearer(token.clone())),
            };
        }

        let transport = builder.build().map_err(|e| {
            EngineError::Configuration(ConfigurationError::TransportSetup {
                message: e.to_string(),
            })
        })?;

        Ok(Self {
            inner: Elasticsearch::new(transport),
        })
    }

    fn transport_error(operation: &str, err: elasticsearch::Error) -> ClientError {
        ClientError::Transport {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    /// Fails on a non-success status, capturing the response body.
    async fn check(operation: &str, response: Response) -> ClientResult<()> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// Parses a success response body, failing on a non-success status.
    async fn parse(operation: &str, response: Response) -> ClientResult<Value> {
        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response.json::<Value>().await.map_err(|e| ClientError::Decode {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }

    /// Existence checks answer 200 or 404; anything else is a failure.
    async fn existence(operation: &str, response: Response) -> ClientResult<bool> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SearchClient for ElasticClient {
    async fn index_exists(&self, index: &str) -> ClientResult<bool> {
        let response = self
            .inner
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("index_exists", e))?;
        Self::existence("index_exists", response).await
    }

    async fn create_index(&self, index: &str, body: Value) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("create_index", e))?;
        Self::check("create_index", response).await?;
        tracing::debug!(index = %index, "Created index");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("delete_index", e))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 404 is fine, the index is already gone
            if !body.contains("index_not_found_exception") {
                return Err(ClientError::UnexpectedStatus {
                    operation: "delete_index".to_string(),
                    status: status.as_u16(),
                    body,
                });
            }
        }
        tracing::debug!(index = %index, "Deleted index");
        Ok(())
    }

    async fn close_index(&self, index: &str) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .close(IndicesCloseParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("close_index", e))?;
        Self::check("close_index", response).await
    }

    async fn open_index(&self, index: &str) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .open(IndicesOpenParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("open_index", e))?;
        Self::check("open_index", response).await
    }

    async fn put_settings(&self, index: &str, body: Value) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("put_settings", e))?;
        Self::check("put_settings", response).await
    }

    async fn put_mapping(&self, index: &str, doc_type: &str, body: Value) -> ClientResult<()> {
        // The driver scopes mapping bodies by document type; the engine's
        // mapping endpoint is typeless, so unwrap the type envelope here.
        let body = body.get(doc_type).cloned().unwrap_or(body);

        let response = self
            .inner
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("put_mapping", e))?;
        Self::check("put_mapping", response).await
    }

    async fn get_mapping(&self, index: &str) -> ClientResult<Value> {
        let response = self
            .inner
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| Self::transport_error("get_mapping", e))?;
        Self::parse("get_mapping", response).await
    }

    async fn alias_exists(&self, name: &str) -> ClientResult<bool> {
        let response = self
            .inner
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[name]))
            .send()
            .await
            .map_err(|e| Self::transport_error("alias_exists", e))?;
        Self::existence("alias_exists", response).await
    }

    async fn get_alias(&self, name: &str) -> ClientResult<Value> {
        let response = self
            .inner
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[name]))
            .send()
            .await
            .map_err(|e| Self::transport_error("get_alias", e))?;
        Self::parse("get_alias", response).await
    }

    async fn put_alias(&self, index: &str, name: &str) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .put_alias(IndicesPutAliasParts::IndexName(&[index], name))
            .send()
            .await
            .map_err(|e| Self::transport_error("put_alias", e))?;
        Self::check("put_alias", response).await
    }

    async fn delete_alias(&self, index: &str, name: &str) -> ClientResult<()> {
        let response = self
            .inner
            .indices()
            .delete_alias(IndicesDeleteAliasParts::IndexName(&[index], &[name]))
            .send()
            .await
            .map_err(|e| Self::transport_error("delete_alias", e))?;
        Self::check("delete_alias", response).await
    }

    async fn search(&self, index: &str, body: Value) -> ClientResult<Value> {
        let response = self
            .inner
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("search", e))?;
        Self::parse("search", response).await
    }

    async fn count(&self, index: &str, body: Value) -> ClientResult<Value> {
        let response = self
            .inner
            .count(CountParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("count", e))?;
        Self::parse("count", response).await
    }

    async fn delete_by_query(&self, index: &str, body: Value) -> ClientResult<Value> {
        let response = self
            .inner
            .delete_by_query(DeleteByQueryParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("delete_by_query", e))?;
        Self::parse("delete_by_query", response).await
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> ClientResult<Value> {
        let body: Vec<JsonBody<Value>> = operations.into_iter().map(JsonBody::from).collect();

        let response = self
            .inner
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| Self::transport_error("bulk", e))?;
        Self::parse("bulk", response).await
    }
}
