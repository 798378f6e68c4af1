use crate::hook::ElasticHook;
use crate::layer::ElasticLayer;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Subscriber setup options.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to the [`ElasticLayer`] so events are also printed to
///   the console.
#[derive(Clone, Debug)]
pub struct InitConfig {
    pub enable_stdout: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a [`Registry`] with an [`ElasticLayer`] for `hook` as the
/// global default subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already set.
pub fn init_tracing_with_config(
    hook: Arc<ElasticHook>,
    config: InitConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let layer = ElasticLayer::new(hook);

    // The two variants have different subscriber types.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`InitConfig::default`].
pub fn init_tracing(hook: Arc<ElasticHook>) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    init_tracing_with_config(hook, InitConfig::default())
}
