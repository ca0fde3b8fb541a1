//! Call dispatch hooks.
//!
//! The host interpreter owns the dispatch loop; memobox only sees two
//! events per call:
//!
//! - **call**: the callee and its arguments are known, the body has not run.
//!   A handler may fill the result slot and answer [`Dispatch::Skip`].
//! - **return**: the body ran to completion or raised. Fires only for bodies
//!   that actually executed; a skipped call has no return event.
//!
//! Handlers form an ordered middleware chain. Each receives a [`Next`]
//! handle to whatever was installed before it and decides whether to call
//! through. The last installed handler runs first, and teardown must happen
//! in exactly the reverse order of installation, so every handler leaves the
//! chain as it found it.

use std::fmt;
use std::sync::Arc;

use memobox_core::Value;

use crate::context::ExecutionContext;
use crate::error::HookError;
use crate::table::FunctionId;

/// Pre-call view of an invocation.
#[derive(Debug)]
pub struct CallSite<'a> {
    /// Function being called.
    pub callee: FunctionId,
    /// Arguments in declaration order.
    pub args: &'a [Value],
    /// Result slot. A handler answering [`Dispatch::Skip`] must fill it.
    pub result: &'a mut Option<Value>,
}

/// How a function body finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    /// Normal return with a value.
    Returned(&'a Value),
    /// An error is pending and will keep propagating to the caller.
    Raised(&'a str),
}

/// Post-return view of an invocation.
#[derive(Debug, Clone, Copy)]
pub struct ReturnSite<'a> {
    /// Function that returned.
    pub function: FunctionId,
    /// Arguments the function was called with.
    pub args: &'a [Value],
    /// Return value or pending error.
    pub outcome: Outcome<'a>,
}

/// What the host should do with a call after the chain has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Run the body.
    Execute,
    /// Do not run the body; the result slot holds the value.
    Skip,
}

/// A link in the dispatch chain.
///
/// Both methods delegate to `next` by default, so a handler only overrides
/// the events it cares about.
pub trait CallHandler: Send + Sync {
    /// Runs before the callee's body.
    fn on_call(&self, ctx: &mut ExecutionContext, site: &mut CallSite<'_>, next: Next<'_>) -> Dispatch {
        next.on_call(ctx, site)
    }

    /// Runs after the callee's body.
    fn on_return(&self, ctx: &mut ExecutionContext, site: &ReturnSite<'_>, next: Next<'_>) {
        next.on_return(ctx, site)
    }
}

/// The rest of the chain, as seen from one handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Link],
}

impl<'a> Next<'a> {
    /// Passes the call event on. At the end of the chain the body executes.
    pub fn on_call(self, ctx: &mut ExecutionContext, site: &mut CallSite<'_>) -> Dispatch {
        match self.rest.split_first() {
            Some((link, rest)) => link.handler.on_call(ctx, site, Next { rest }),
            None => Dispatch::Execute,
        }
    }

    /// Passes the return event on.
    pub fn on_return(self, ctx: &mut ExecutionContext, site: &ReturnSite<'_>) {
        if let Some((link, rest)) = self.rest.split_first() {
            link.handler.on_return(ctx, site, Next { rest });
        }
    }
}

/// Token identifying one installed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(u64);

struct Link {
    handle: HookHandle,
    handler: Arc<dyn CallHandler>,
}

/// Ordered set of installed handlers.
#[derive(Default)]
pub struct HandlerChain {
    // Execution order: most recently installed first.
    links: Vec<Link>,
    issued: u64,
}

impl HandlerChain {
    /// An empty chain; every call executes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` in front of everything installed so far.
    pub fn install(&mut self, handler: Arc<dyn CallHandler>) -> HookHandle {
        self.issued += 1;
        let handle = HookHandle(self.issued);
        self.links.insert(0, Link { handle, handler });
        tracing::debug!(?handle, depth = self.links.len(), "call handler installed");
        handle
    }

    /// Removes the most recently installed handler, which must be `handle`.
    ///
    /// On success the chain is exactly what it was before that handler was
    /// installed.
    pub fn uninstall(&mut self, handle: HookHandle) -> Result<Arc<dyn CallHandler>, HookError> {
        match self.links.first() {
            Some(top) if top.handle == handle => {
                let link = self.links.remove(0);
                tracing::debug!(?handle, depth = self.links.len(), "call handler removed");
                Ok(link.handler)
            }
            Some(top) if self.links.iter().any(|link| link.handle == handle) => {
                Err(HookError::OutOfOrder {
                    handle,
                    top: top.handle,
                })
            }
            _ => Err(HookError::NotInstalled(handle)),
        }
    }

    /// Number of installed handlers.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// `true` when nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Handles in execution order.
    pub fn handles(&self) -> impl Iterator<Item = HookHandle> + '_ {
        self.links.iter().map(|link| link.handle)
    }

    /// Runs the call event through the chain.
    pub fn dispatch_call(&self, ctx: &mut ExecutionContext, site: &mut CallSite<'_>) -> Dispatch {
        Next { rest: &self.links }.on_call(ctx, site)
    }

    /// Runs the return event through the chain.
    pub fn dispatch_return(&self, ctx: &mut ExecutionContext, site: &ReturnSite<'_>) {
        Next { rest: &self.links }.on_return(ctx, site)
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handles()).finish()
    }
}
