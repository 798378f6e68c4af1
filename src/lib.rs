pub mod level;
pub mod record;
pub mod document;
pub mod context;
pub mod client;
pub mod error;
pub mod index;
pub mod dispatch;
pub mod hook;
pub mod layer;

#[cfg(feature = "elasticsearch")]
pub mod http;

pub mod config;
pub mod env;
pub mod init;
pub mod noop_client;

pub use client::{BackendError, CreateIndexResponse, ElasticClient, IndexRequest};
pub use config::HookConfig;
pub use context::CallContext;
pub use dispatch::{DispatchMode, OverflowPolicy, StatsSnapshot};
pub use document::{Document, MessageCreator};
pub use error::HookError;
pub use hook::{ElasticHook, HookState};
pub use index::IndexResolver;
pub use layer::ElasticLayer;
pub use level::Severity;
pub use record::{FieldValue, LogRecord};
