use crate::context::CallContext;
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;

/// Error type produced by backend clients.
pub type BackendError = Box<dyn Error + Send + Sync>;

/// Document kind label attached to every write.
pub const LOG_DOC_TYPE: &str = "log";

/// Response body of a create-index call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    pub acknowledged: bool,
}

/// A single document write.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    pub index: String,
    pub doc_type: &'static str,
    pub body: serde_json::Value,
}

impl IndexRequest {
    pub fn log(index: impl Into<String>, body: serde_json::Value) -> Self {
        IndexRequest {
            index: index.into(),
            doc_type: LOG_DOC_TYPE,
            body,
        }
    }
}

/// Operations the hook needs from a search backend.
///
/// Every call receives the hook's [`CallContext`]; implementations are
/// expected to give up once it is cancelled, usually by wrapping their
/// I/O in [`CallContext::run`].
#[async_trait]
pub trait ElasticClient: Send + Sync {
    /// Whether `index` exists.
    async fn index_exists(&self, index: &str, ctx: &CallContext) -> Result<bool, BackendError>;

    /// Create `index`. The caller inspects `acknowledged`.
    async fn create_index(&self, index: &str, ctx: &CallContext) -> Result<CreateIndexResponse, BackendError>;

    /// Store one document.
    async fn index_document(&self, request: IndexRequest, ctx: &CallContext) -> Result<(), BackendError>;
}
