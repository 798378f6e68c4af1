use crate::client::{BackendError, CreateIndexResponse, ElasticClient, IndexRequest};
use crate::context::CallContext;
use async_trait::async_trait;

/// A client that reports every index as present and drops all documents.
///
/// Useful for measuring the overhead of the hook itself without any
/// external I/O.
#[derive(Clone, Default)]
pub struct NoopClient;

#[async_trait]
impl ElasticClient for NoopClient {
    async fn index_exists(&self, _index: &str, _ctx: &CallContext) -> Result<bool, BackendError> {
        Ok(true)
    }

    async fn create_index(&self, _index: &str, _ctx: &CallContext) -> Result<CreateIndexResponse, BackendError> {
        Ok(CreateIndexResponse { acknowledged: true })
    }

    async fn index_document(&self, _request: IndexRequest, _ctx: &CallContext) -> Result<(), BackendError> {
        Ok(())
    }
}
