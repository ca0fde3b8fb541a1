#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # memobox
//!
//! Transparent call-level memoization for an interpreted execution
//! environment.
//!
//! The host interpreter reports two events per call, before the body runs
//! and after it returns. memobox hooks into both through a
//! [`HandlerChain`]: functions whose documentation carries an `@memoize`
//! marker are served from a shared cache when the same arguments were seen
//! before, and their results are stored otherwise.
//!
//! ```
//! use std::sync::Arc;
//! use memobox::{
//!     CallSite, Dispatch, ExecutionContext, FunctionDecl, FunctionTable, HandlerChain,
//!     MemoizeConfig, Memoizer, Outcome, ReturnSite,
//! };
//! use memobox_core::{FunctionIdentity, Value};
//! use memobox_moka::MokaBackend;
//!
//! let table = Arc::new(FunctionTable::load([
//!     FunctionDecl::user(FunctionIdentity::function("slow_square")).doc("@memoize(60)"),
//! ])?);
//! let square = table.lookup(&FunctionIdentity::function("slow_square")).unwrap();
//!
//! let backend = MokaBackend::builder().max_bytes(1 << 20).build();
//! let mut chain = HandlerChain::new();
//! chain.install(Arc::new(Memoizer::new(MemoizeConfig::default(), backend, table)));
//!
//! let mut ctx = ExecutionContext::new();
//! let args = [Value::Int(12)];
//! for _ in 0..2 {
//!     let mut result = None;
//!     let mut site = CallSite { callee: square, args: &args, result: &mut result };
//!     if chain.dispatch_call(&mut ctx, &mut site) == Dispatch::Execute {
//!         let value = Value::Int(144);
//!         let done = ReturnSite { function: square, args: &args, outcome: Outcome::Returned(&value) };
//!         chain.dispatch_return(&mut ctx, &done);
//!         result = Some(value);
//!     }
//!     assert_eq!(result, Some(Value::Int(144)));
//! }
//! # Ok::<(), memobox::LoadError>(())
//! ```
//!
//! ## Modules
//!
//! - [`table`]: load-time function metadata and override chains
//! - [`resolver`]: per-call eligibility decisions
//! - [`key_builder`]: cache keys from identity and arguments
//! - [`breaker`]: per-context circuit breaker
//! - [`hook`]: the dispatch middleware chain
//! - [`interceptor`]: the memoizing handler
//! - [`config`]: runtime settings

pub mod breaker;
pub mod config;
pub mod context;
pub mod error;
pub mod hook;
pub mod interceptor;
pub mod key_builder;
pub mod metrics;
pub mod resolver;
pub mod table;

/// Cache store contract and value formats.
pub mod backend {
    pub use memobox_backend::{
        Backend, BackendError, BackendResult, BincodeFormat, BitcodeFormat, CacheBackend,
        CacheInfo, DeleteStatus, EntryInfo, Format, FormatError, JsonFormat,
    };
}

pub use breaker::DisabledSet;
pub use config::{MemoizeConfig, MemoizeConfigBuilder, SegmentCount};
pub use context::{Clock, ExecutionContext, ManualClock, SystemClock};
pub use error::{HookError, KeyError, LoadError};
pub use hook::{CallHandler, CallSite, Dispatch, HandlerChain, HookHandle, Next, Outcome, ReturnSite};
pub use interceptor::Memoizer;
pub use key_builder::build_key;
pub use memobox_core::{
    CacheKey, FunctionIdentity, MemoizationPolicy, MemoizeAttribute, Value,
};
pub use resolver::resolve;
pub use table::{FunctionDecl, FunctionEntry, FunctionId, FunctionKind, FunctionTable};
