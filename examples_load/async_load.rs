use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_elastic_hook::{
    config::HookConfig,
    init::{init_tracing_with_config, InitConfig},
    noop_client::NoopClient,
    DispatchMode, ElasticHook, OverflowPolicy, Severity,
};

#[tokio::main]
async fn main() {
    let config = HookConfig {
        mode: DispatchMode::Async,
        queue_capacity: 50_000,
        workers: 8,
        overflow: OverflowPolicy::DropOldest,
        ..HookConfig::new("load-test", Severity::Error)
    };
    let hook = ElasticHook::from_config(Arc::new(NoopClient), config, "load")
        .await
        .expect("bootstrap");
    let hook = Arc::new(hook);

    init_tracing_with_config(Arc::clone(&hook), InitConfig { enable_stdout: false })
        .expect("set global subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "async load test error");
    }

    let elapsed = start.elapsed();
    println!("async hook: fired {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    hook.shutdown().await;
    println!("{:?}", hook.stats());
}
