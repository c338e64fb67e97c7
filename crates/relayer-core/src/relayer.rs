//! The relayer session: ledger, call builder, cache and configuration.

use std::sync::Arc;

use crate::builder::CallBuilder;
use crate::cache::ObjectCache;
use crate::config::RelayerConfig;
use crate::ledger::LedgerClient;

/// Drives discovery and execution for messages against one ledger.
///
/// Cheap to share behind an `Arc`; concurrent calls only contend on the
/// object cache and the builder's signature memo.
pub struct Relayer {
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) builder: CallBuilder,
    pub(crate) cache: Arc<ObjectCache>,
    pub(crate) config: RelayerConfig,
}

impl Relayer {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: RelayerConfig) -> Self {
        Self::with_cache(ledger, Arc::new(ObjectCache::new()), config)
    }

    /// Use an existing cache, e.g. one shared with another relayer.
    pub fn with_cache(
        ledger: Arc<dyn LedgerClient>,
        cache: Arc<ObjectCache>,
        config: RelayerConfig,
    ) -> Self {
        Self {
            builder: CallBuilder::new(ledger.clone(), cache.clone()),
            ledger,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<ObjectCache> {
        &self.cache
    }

    pub fn builder(&self) -> &CallBuilder {
        &self.builder
    }

    pub fn config(&self) -> &RelayerConfig {
        &self.config
    }
}
