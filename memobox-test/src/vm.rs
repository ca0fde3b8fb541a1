//! A toy interpreter.
//!
//! [`ToyVm`] stands in for a real host: it owns a loaded program, a
//! [`HandlerChain`], and a dispatch loop that reports call and return events
//! exactly the way a production interpreter would. Function bodies are Rust
//! closures that may call back into the VM, so nested and recursive calls
//! behave like interpreted ones.

use std::sync::Arc;

use dashmap::DashMap;
use memobox::{
    CallHandler, CallSite, Dispatch, ExecutionContext, FunctionDecl, FunctionId,
    FunctionIdentity, FunctionTable, HandlerChain, HookError, HookHandle, LoadError, Outcome,
    ReturnSite, Value,
};
use thiserror::Error;

/// Error raised by interpreted code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VmError {
    /// A body raised and nothing caught it.
    #[error("uncaught error: {0}")]
    Raised(String),

    /// The callee does not exist in the loaded program.
    #[error("call to undefined function {0}")]
    Undefined(String),

    /// A handler skipped the body without providing a result.
    #[error("call to {0} was skipped without a result")]
    MissingResult(String),
}

impl VmError {
    /// Convenience constructor for a raised error.
    pub fn raise(message: impl Into<String>) -> Self {
        VmError::Raised(message.into())
    }
}

/// Function body.
pub type Body =
    Arc<dyn Fn(&ToyVm, &mut ExecutionContext, &[Value]) -> Result<Value, VmError> + Send + Sync>;

/// Collects declarations and bodies for a [`Program`].
#[derive(Default)]
pub struct ProgramBuilder {
    decls: Vec<FunctionDecl>,
    bodies: Vec<Body>,
}

impl ProgramBuilder {
    /// Adds a function.
    pub fn function<F>(mut self, decl: FunctionDecl, body: F) -> Self
    where
        F: Fn(&ToyVm, &mut ExecutionContext, &[Value]) -> Result<Value, VmError>
            + Send
            + Sync
            + 'static,
    {
        self.decls.push(decl);
        self.bodies.push(Arc::new(body));
        self
    }

    /// Loads the program, extracting function metadata.
    pub fn build(self) -> Result<Program, LoadError> {
        let table = FunctionTable::load(self.decls)?;
        Ok(Program {
            table: Arc::new(table),
            bodies: self.bodies,
        })
    }
}

/// A loaded program.
pub struct Program {
    table: Arc<FunctionTable>,
    bodies: Vec<Body>,
}

impl Program {
    /// Starts collecting functions.
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    /// The program's function metadata.
    pub fn table(&self) -> Arc<FunctionTable> {
        self.table.clone()
    }
}

/// Interpreter with a pluggable dispatch chain.
pub struct ToyVm {
    program: Program,
    chain: HandlerChain,
    invocations: DashMap<FunctionIdentity, usize>,
}

impl ToyVm {
    /// A VM with no handlers installed.
    pub fn new(program: Program) -> Self {
        Self {
            program,
            chain: HandlerChain::new(),
            invocations: DashMap::new(),
        }
    }

    /// The loaded program's function metadata.
    pub fn table(&self) -> Arc<FunctionTable> {
        self.program.table()
    }

    /// Installs a dispatch handler in front of all others.
    pub fn install(&mut self, handler: Arc<dyn CallHandler>) -> HookHandle {
        self.chain.install(handler)
    }

    /// Removes the most recently installed handler.
    pub fn uninstall(&mut self, handle: HookHandle) -> Result<Arc<dyn CallHandler>, HookError> {
        self.chain.uninstall(handle)
    }

    /// The dispatch chain.
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Calls a free function by name.
    pub fn call(&self, ctx: &mut ExecutionContext, name: &str, args: &[Value]) -> Result<Value, VmError> {
        self.invoke(ctx, &FunctionIdentity::function(name), args)
    }

    /// Calls a method by scope and name.
    pub fn call_method(
        &self,
        ctx: &mut ExecutionContext,
        scope: &str,
        name: &str,
        args: &[Value],
    ) -> Result<Value, VmError> {
        self.invoke(ctx, &FunctionIdentity::method(scope, name), args)
    }

    /// Calls any function by identity.
    pub fn invoke(
        &self,
        ctx: &mut ExecutionContext,
        identity: &FunctionIdentity,
        args: &[Value],
    ) -> Result<Value, VmError> {
        let function = self
            .program
            .table
            .lookup(identity)
            .ok_or_else(|| VmError::Undefined(identity.to_string()))?;
        self.dispatch(ctx, function, identity, args)
    }

    fn dispatch(
        &self,
        ctx: &mut ExecutionContext,
        function: FunctionId,
        identity: &FunctionIdentity,
        args: &[Value],
    ) -> Result<Value, VmError> {
        let mut result = None;
        let mut site = CallSite {
            callee: function,
            args,
            result: &mut result,
        };
        if self.chain.dispatch_call(ctx, &mut site) == Dispatch::Skip {
            return result.ok_or_else(|| VmError::MissingResult(identity.to_string()));
        }

        *self.invocations.entry(identity.clone()).or_default() += 1;
        let body = self.program.bodies[function.index()].clone();
        let outcome = body(self, ctx, args);

        let message;
        let reported = match &outcome {
            Ok(value) => Outcome::Returned(value),
            Err(err) => {
                message = err.to_string();
                Outcome::Raised(&message)
            }
        };
        self.chain.dispatch_return(
            ctx,
            &ReturnSite {
                function,
                args,
                outcome: reported,
            },
        );
        outcome
    }

    /// How many times the body of `identity` actually ran.
    pub fn invocations_of(&self, identity: &FunctionIdentity) -> usize {
        self.invocations.get(identity).map_or(0, |count| *count)
    }

    /// How many times the body of free function `name` actually ran.
    pub fn invocations(&self, name: &str) -> usize {
        self.invocations_of(&FunctionIdentity::function(name))
    }

    /// Forgets all invocation counts.
    pub fn reset_invocations(&self) {
        self.invocations.clear();
    }
}
