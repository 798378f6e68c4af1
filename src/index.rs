use crate::client::ElasticClient;
use crate::context::CallContext;
use crate::error::HookError;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Produces the name of the index to write to.
///
/// The function runs on every call to [`IndexResolver::resolve`]; nothing
/// is cached, so time-based names roll over on their own.
#[derive(Clone)]
pub struct IndexResolver {
    func: Arc<dyn Fn() -> String + Send + Sync>,
}

impl IndexResolver {
    /// Always resolve to `name`.
    pub fn fixed(name: impl Into<String>) -> Self {
        let name = name.into();
        IndexResolver::from_fn(move || name.clone())
    }

    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        IndexResolver { func: Arc::new(func) }
    }

    /// `<prefix>-YYYY.MM.DD` for the current UTC day.
    pub fn daily(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        IndexResolver::from_fn(move || format!("{}-{}", prefix, Utc::now().format("%Y.%m.%d")))
    }

    pub fn resolve(&self) -> String {
        (self.func)()
    }
}

impl fmt::Debug for IndexResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexResolver").finish_non_exhaustive()
    }
}

impl From<&str> for IndexResolver {
    fn from(name: &str) -> Self {
        IndexResolver::fixed(name)
    }
}

impl From<String> for IndexResolver {
    fn from(name: String) -> Self {
        IndexResolver::fixed(name)
    }
}

/// Make sure the index exists, creating it when the backend reports it
/// missing.
pub async fn ensure_index(client: &dyn ElasticClient, index: &str, ctx: &CallContext) -> Result<(), HookError> {
    let exists = client
        .index_exists(index, ctx)
        .await
        .map_err(|source| HookError::IndexExists {
            index: index.to_string(),
            source,
        })?;
    if exists {
        tracing::debug!(index, "index already present");
        return Ok(());
    }

    let created = client
        .create_index(index, ctx)
        .await
        .map_err(|source| HookError::CreateIndex {
            index: index.to_string(),
            source,
        })?;
    if !created.acknowledged {
        return Err(HookError::CannotCreateIndex { index: index.to_string() });
    }

    tracing::debug!(index, "index created");
    Ok(())
}
