use crate::client::{ElasticClient, IndexRequest};
use crate::config::HookConfig;
use crate::context::CallContext;
use crate::dispatch::{DispatchMode, DispatchStats, Dispatcher, StatsSnapshot};
use crate::document::{DefaultMessageCreator, MessageCreator};
use crate::error::HookError;
use crate::index::{ensure_index, IndexResolver};
use crate::level::{enabled_levels, Severity};
use crate::record::LogRecord;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a constructed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Ready,
    Cancelled,
}

/// State shared between the hook and its async workers.
pub(crate) struct Shared {
    client: Arc<dyn ElasticClient>,
    host: String,
    index: IndexResolver,
    creator: RwLock<Arc<dyn MessageCreator>>,
    ctx: CallContext,
    pub(crate) stats: DispatchStats,
}

impl Shared {
    /// Normalize, compose, resolve the index, write. Returns the index
    /// the document went to.
    pub(crate) async fn write(&self, mut record: LogRecord) -> Result<String, HookError> {
        record.normalize_error_field();

        let creator = Arc::clone(&*self.creator.read());
        let body = creator.create(&record, &self.host);
        let index = self.index.resolve();

        match self
            .client
            .index_document(IndexRequest::log(index.clone(), body), &self.ctx)
            .await
        {
            Ok(()) => {
                self.stats.record_written();
                Ok(index)
            }
            Err(source) => {
                self.stats.record_failed();
                Err(HookError::Write { index, source })
            }
        }
    }
}

/// Ships log records into an Elasticsearch index.
///
/// Building a hook checks that the index exists and creates it if it does
/// not. In [`DispatchMode::Sync`] every [`fire`](Self::fire) waits for the
/// write and returns the backend's error; in [`DispatchMode::Async`] the
/// record is queued for a pool of workers and failures are only visible
/// through [`stats`](Self::stats) and this crate's own `tracing` events.
///
/// All backend calls share one cancellation token; [`cancel`](Self::cancel)
/// is permanent.
pub struct ElasticHook {
    shared: Arc<Shared>,
    levels: Vec<Severity>,
    mode: DispatchMode,
    token: CancellationToken,
    dispatcher: Option<Dispatcher>,
    runtime: Option<Handle>,
}

impl ElasticHook {
    /// Sync hook writing to a fixed index.
    pub async fn new(
        client: Arc<dyn ElasticClient>,
        host: impl Into<String>,
        level: Severity,
        index: impl Into<String>,
    ) -> Result<Self, HookError> {
        Self::with_resolver(client, host, level, IndexResolver::fixed(index)).await
    }

    /// Async hook writing to a fixed index.
    pub async fn new_async(
        client: Arc<dyn ElasticClient>,
        host: impl Into<String>,
        level: Severity,
        index: impl Into<String>,
    ) -> Result<Self, HookError> {
        Self::async_with_resolver(client, host, level, IndexResolver::fixed(index)).await
    }

    /// Sync hook whose index name is computed on every write.
    pub async fn with_resolver(
        client: Arc<dyn ElasticClient>,
        host: impl Into<String>,
        level: Severity,
        index: IndexResolver,
    ) -> Result<Self, HookError> {
        Self::from_config(client, HookConfig::new(host, level), index).await
    }

    /// Async hook whose index name is computed on every write.
    pub async fn async_with_resolver(
        client: Arc<dyn ElasticClient>,
        host: impl Into<String>,
        level: Severity,
        index: IndexResolver,
    ) -> Result<Self, HookError> {
        let config = HookConfig::new(host, level).with_mode(DispatchMode::Async);
        Self::from_config(client, config, index).await
    }

    /// Build a hook from a full [`HookConfig`].
    ///
    /// Fails without returning a hook when the index check or creation
    /// fails; the token allocated for the hook is cancelled in that case.
    pub async fn from_config(
        client: Arc<dyn ElasticClient>,
        config: HookConfig,
        index: impl Into<IndexResolver>,
    ) -> Result<Self, HookError> {
        let index = index.into();
        let levels = enabled_levels(config.level);
        let token = CancellationToken::new();

        let bootstrap = CallContext::new(token.clone());
        if let Err(err) = ensure_index(client.as_ref(), &index.resolve(), &bootstrap).await {
            token.cancel();
            return Err(err);
        }

        let creator: Arc<dyn MessageCreator> = Arc::new(DefaultMessageCreator);
        let shared = Arc::new(Shared {
            client,
            host: config.host,
            index,
            creator: RwLock::new(creator),
            ctx: CallContext::new(token.clone()).with_timeout(config.write_timeout),
            stats: DispatchStats::default(),
        });

        let dispatcher = match config.mode {
            DispatchMode::Sync => None,
            DispatchMode::Async => Some(Dispatcher::spawn(
                Arc::clone(&shared),
                config.queue_capacity,
                config.workers,
                config.overflow,
            )),
        };

        tracing::debug!(host = %shared.host, mode = ?config.mode, "elastic hook ready");

        Ok(ElasticHook {
            shared,
            levels,
            mode: config.mode,
            token,
            dispatcher,
            runtime: Handle::try_current().ok(),
        })
    }

    /// Handle one record.
    ///
    /// Sync mode returns the backend's error, async mode always returns
    /// `Ok(())` once the record has been handed to the queue.
    pub async fn fire(&self, record: LogRecord) -> Result<(), HookError> {
        self.shared.stats.record_submitted();
        match &self.dispatcher {
            Some(dispatcher) => {
                dispatcher.submit(record, &self.shared.stats);
                Ok(())
            }
            None => self.shared.write(record).await.map(|_| ()),
        }
    }

    /// [`fire`](Self::fire) for callers that cannot await, such as a
    /// `tracing` layer.
    ///
    /// Sync writes block the current thread: inside a multi-thread runtime
    /// through `block_in_place`, outside any runtime on the multi-thread
    /// runtime the hook was built on. Anything else, including a hook built
    /// on a current-thread runtime and fired from a plain thread, gets
    /// [`HookError::BlockingUnsupported`].
    pub fn fire_blocking(&self, record: LogRecord) -> Result<(), HookError> {
        self.shared.stats.record_submitted();
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.submit(record, &self.shared.stats);
            return Ok(());
        }

        let (handle, in_runtime) = match Handle::try_current() {
            Ok(handle) => (Some(handle), true),
            Err(_) => (self.runtime.clone(), false),
        };
        match handle {
            Some(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                let write = self.shared.write(record);
                if in_runtime {
                    tokio::task::block_in_place(|| handle.block_on(write)).map(|_| ())
                } else {
                    handle.block_on(write).map(|_| ())
                }
            }
            // a current-thread runtime cannot drive its drivers from here
            _ => {
                self.shared.stats.record_failed();
                Err(HookError::BlockingUnsupported)
            }
        }
    }

    /// Severities this hook handles, most severe first.
    pub fn levels(&self) -> &[Severity] {
        &self.levels
    }

    pub fn is_enabled(&self, level: Severity) -> bool {
        self.levels.contains(&level)
    }

    /// Cancel every backend call issued through this hook, now and later.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn state(&self) -> HookState {
        if self.token.is_cancelled() {
            HookState::Cancelled
        } else {
            HookState::Ready
        }
    }

    /// Replace the document composer. Writes that already took their
    /// snapshot keep the previous one.
    pub fn set_message_creator<C>(&self, creator: C)
    where
        C: MessageCreator + 'static,
    {
        let creator: Arc<dyn MessageCreator> = Arc::new(creator);
        *self.shared.creator.write() = creator;
    }

    pub fn host(&self) -> &str {
        &self.shared.host
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Stop the async workers after they have written everything already
    /// queued. Later records are dropped. No-op in sync mode.
    pub async fn shutdown(&self) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.shutdown().await;
        }
    }
}

impl Drop for ElasticHook {
    fn drop(&mut self) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.close();
        }
    }
}

impl std::fmt::Debug for ElasticHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticHook")
            .field("host", &self.shared.host)
            .field("levels", &self.levels)
            .field("mode", &self.mode)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
