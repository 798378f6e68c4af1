use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};
use tracing_elastic_hook::{
    init::{init_tracing_with_config, InitConfig},
    BackendError, CallContext, CreateIndexResponse, ElasticClient, ElasticHook, IndexRequest, LogRecord, Severity,
};

/// Example of plugging in a different document store by implementing
/// `ElasticClient` directly. This one just prints what it would store.
struct PrintClient;

#[async_trait]
impl ElasticClient for PrintClient {
    async fn index_exists(&self, index: &str, _ctx: &CallContext) -> Result<bool, BackendError> {
        println!("[print-client] exists? {index}");
        Ok(false)
    }

    async fn create_index(&self, index: &str, _ctx: &CallContext) -> Result<CreateIndexResponse, BackendError> {
        println!("[print-client] create {index}");
        Ok(CreateIndexResponse { acknowledged: true })
    }

    async fn index_document(&self, request: IndexRequest, ctx: &CallContext) -> Result<(), BackendError> {
        if ctx.is_cancelled() {
            return Err("hook cancelled".into());
        }
        println!("[print-client] {}/{} {}", request.index, request.doc_type, request.body);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let hook = ElasticHook::new(Arc::new(PrintClient), "custom-host", Severity::Info, "custom")
        .await
        .expect("bootstrap");
    hook.set_message_creator(|record: &LogRecord, host: &str| {
        json!({ "who": host, "what": record.message, "fields": record.data() })
    });
    let hook = Arc::new(hook);

    init_tracing_with_config(Arc::clone(&hook), InitConfig { enable_stdout: false }).expect("set global subscriber");

    info!(user = "alice", "custom client example started");
    hook.cancel();
    error!("written after cancel, rejected by the client");
}
