use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_elastic_hook::{
    config::{ElasticConfig, HookConfig},
    env::{env_or, ELASTIC_HOOK_INDEX_ENV},
    http::HttpElasticClient,
    init::init_tracing,
    ElasticHook, IndexResolver,
};

#[tokio::main]
async fn main() {
    // ELASTIC_HOOK_URL defaults to http://localhost:9200
    let client = Arc::new(HttpElasticClient::new(ElasticConfig::from_env()));
    let config = HookConfig::from_env().expect("invalid ELASTIC_HOOK_* settings");
    let prefix = env_or(ELASTIC_HOOK_INDEX_ENV, "app-logs");

    let hook = ElasticHook::from_config(client, config, IndexResolver::daily(prefix))
        .await
        .expect("failed to bootstrap index");
    let hook = Arc::new(hook);

    init_tracing(Arc::clone(&hook)).expect("set global subscriber");

    info!("elasticsearch example started");
    warn!(queue = "billing", depth = 1200, "queue backing up");

    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "upstream refused");
    error!(error = &err as &(dyn std::error::Error + 'static), "call to upstream failed");

    // give async workers a moment before exiting
    sleep(Duration::from_millis(500)).await;
    hook.shutdown().await;
    println!("{:?}", hook.stats());
}
