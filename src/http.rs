use crate::client::{BackendError, CreateIndexResponse, ElasticClient, IndexRequest};
use crate::config::ElasticConfig;
use crate::context::CallContext;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

/// [`ElasticClient`] speaking the Elasticsearch REST API over HTTP.
#[derive(Clone)]
pub struct HttpElasticClient {
    client: Client,
    config: ElasticConfig,
}

impl HttpElasticClient {
    pub fn new(config: ElasticConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Reuse an existing `reqwest` client, e.g. one with custom TLS or
    /// proxy settings.
    pub fn with_client(client: Client, config: ElasticConfig) -> Self {
        HttpElasticClient { client, config }
    }

    fn url(&self, path: &[&str]) -> String {
        let mut url = self.config.url.trim_end_matches('/').to_string();
        for segment in path {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, ctx: &CallContext) -> Result<Response, BackendError> {
        let response = ctx.run(self.authorize(request).send()).await??;
        Ok(response)
    }
}

async fn failure(what: &str, index: &str, resp: Response) -> BackendError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
    format!("Elasticsearch {} for {} failed with status {}: {}", what, index, status, text).into()
}

#[async_trait]
impl ElasticClient for HttpElasticClient {
    async fn index_exists(&self, index: &str, ctx: &CallContext) -> Result<bool, BackendError> {
        let resp = self.send(self.client.head(self.url(&[index])), ctx).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(failure("index check", index, resp).await),
        }
    }

    async fn create_index(&self, index: &str, ctx: &CallContext) -> Result<CreateIndexResponse, BackendError> {
        let resp = self.send(self.client.put(self.url(&[index])), ctx).await?;
        if !resp.status().is_success() {
            return Err(failure("index creation", index, resp).await);
        }
        let created = ctx.run(resp.json::<CreateIndexResponse>()).await??;
        Ok(created)
    }

    async fn index_document(&self, request: IndexRequest, ctx: &CallContext) -> Result<(), BackendError> {
        let url = self.url(&[request.index.as_str(), request.doc_type]);
        let resp = self.send(self.client.post(url).json(&request.body), ctx).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(failure("document write", &request.index, resp).await)
        }
    }
}
