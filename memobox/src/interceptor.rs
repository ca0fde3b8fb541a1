//! The call interceptor.

use std::fmt;
use std::sync::Arc;

use memobox_backend::{BackendResult, CacheBackend, CacheInfo};
use memobox_core::{CacheKey, FunctionIdentity, MemoizationPolicy, Value};
use tracing::field::Empty;

use crate::config::MemoizeConfig;
use crate::context::ExecutionContext;
use crate::hook::{CallHandler, CallSite, Dispatch, Next, Outcome, ReturnSite};
use crate::key_builder::build_key;
use crate::metrics;
use crate::resolver::resolve;
use crate::table::{FunctionId, FunctionTable};

/// Memoizing [`CallHandler`].
///
/// On a call to an eligible function it builds the key and consults the
/// cache; a hit fills the result slot and skips the body. On the matching
/// return it resolves eligibility again, rebuilds the same key, and either
/// stores the value or, when an error is pending, disables the function for
/// the rest of the execution context.
///
/// Nothing here can change whether a call succeeds: unserializable
/// arguments, store failures and corrupted entries all fall back to plain
/// execution.
///
/// Fetch, execute and store are not coordinated between threads. Two
/// concurrent misses on the same key both execute the body and both store;
/// the later write wins.
pub struct Memoizer<B> {
    config: MemoizeConfig,
    backend: B,
    table: Arc<FunctionTable>,
}

impl<B: CacheBackend> Memoizer<B> {
    /// Creates an interceptor for the program described by `table`.
    pub fn new(config: MemoizeConfig, backend: B, table: Arc<FunctionTable>) -> Self {
        Self {
            config,
            backend,
            table,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &MemoizeConfig {
        &self.config
    }

    /// Underlying cache store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Function metadata of the program being intercepted.
    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    /// Store statistics and, unless `limited`, the list of cached entries.
    pub fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        let mut info = self.backend.info(limited)?;
        info.enabled = self.config.enabled;
        info.default_ttl = self.config.fallback_ttl();
        Ok(info)
    }

    /// Drops every cached result.
    pub fn clear(&self) -> BackendResult<()> {
        self.backend.clear()
    }

    fn eligible(
        &self,
        ctx: &ExecutionContext,
        function: FunctionId,
    ) -> Option<(&FunctionIdentity, MemoizationPolicy)> {
        let entry = self.table.get(function)?;
        let policy = resolve(&self.table, function, ctx.disabled());
        policy.is_eligible().then(|| (entry.identity(), policy))
    }

    fn key(&self, identity: &FunctionIdentity, args: &[Value]) -> Option<CacheKey> {
        match build_key(self.backend.value_format(), identity, args) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::debug!(error = %err, "arguments not serializable, not memoizing");
                metrics::record_skip(identity.name());
                None
            }
        }
    }

    fn lookup(&self, ctx: &ExecutionContext, function: FunctionId, args: &[Value]) -> Option<Value> {
        let (identity, _) = self.eligible(ctx, function)?;
        let span = tracing::info_span!("memobox.call", function = %identity, outcome = Empty);
        let _entered = span.enter();

        let Some(key) = self.key(identity, args) else {
            span.record("outcome", "unkeyable");
            return None;
        };

        match self.backend.fetch(&key, ctx.now()) {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "served from cache");
                span.record("outcome", "hit");
                metrics::record_hit(identity.name());
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
                span.record("outcome", "miss");
                metrics::record_miss(identity.name());
                None
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "cache fetch failed, executing");
                span.record("outcome", "error");
                metrics::record_backend_error(identity.name());
                None
            }
        }
    }

    fn settle(&self, ctx: &mut ExecutionContext, site: &ReturnSite<'_>) {
        let Some((identity, policy)) = self.eligible(ctx, site.function) else {
            return;
        };
        let span = tracing::info_span!("memobox.return", function = %identity, outcome = Empty);
        let _entered = span.enter();

        let Some(key) = self.key(identity, site.args) else {
            span.record("outcome", "unkeyable");
            return;
        };

        let value = match site.outcome {
            Outcome::Returned(value) => value,
            Outcome::Raised(error) => {
                span.record("outcome", "raised");
                trip(ctx, identity, error);
                return;
            }
        };

        let ttl = policy.effective_ttl(self.config.fallback_ttl());
        match self.backend.store(&key, value, ttl, ctx.now()) {
            Ok(()) => {
                tracing::debug!(key = %key, ttl = ?ttl, "result stored");
                span.record("outcome", "stored");
                metrics::record_store(identity.name());
            }
            Err(err) if err.is_unserializable_value() => {
                span.record("outcome", "unserializable");
                trip(ctx, identity, &err.to_string());
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "cache store failed, result not memoized");
                span.record("outcome", "error");
                metrics::record_backend_error(identity.name());
            }
        }
    }
}

fn trip(ctx: &mut ExecutionContext, identity: &FunctionIdentity, reason: &str) {
    if ctx.disable(identity.clone()) {
        tracing::debug!(function = %identity, reason, "memoization disabled for this context");
        metrics::record_breaker_trip(identity.name());
    }
}

impl<B: CacheBackend> CallHandler for Memoizer<B> {
    fn on_call(&self, ctx: &mut ExecutionContext, site: &mut CallSite<'_>, next: Next<'_>) -> Dispatch {
        if self.config.enabled
            && let Some(value) = self.lookup(ctx, site.callee, site.args)
        {
            *site.result = Some(value);
            return Dispatch::Skip;
        }
        next.on_call(ctx, site)
    }

    fn on_return(&self, ctx: &mut ExecutionContext, site: &ReturnSite<'_>, next: Next<'_>) {
        if self.config.enabled {
            self.settle(ctx, site);
        }
        next.on_return(ctx, site)
    }
}

impl<B: fmt::Debug> fmt::Debug for Memoizer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .field("functions", &self.table.len())
            .finish()
    }
}
