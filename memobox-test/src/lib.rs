//! Test tooling for memobox.
//!
//! - [`vm`]: a toy interpreter implementing the host side of the dispatch hooks
//! - [`tracing`]: capture of `memobox.*` spans
//! - [`backend`]: failure injection around a real store

pub mod backend;
pub mod tracing;
pub mod vm;

use std::sync::Arc;

use memobox::{MemoizeConfig, Memoizer};
use memobox_backend::CacheBackend;
use memobox_moka::MokaBackend;

pub use vm::{Program, ProgramBuilder, ToyVm, VmError};

/// A 1 MiB single-segment store.
pub fn small_store() -> MokaBackend {
    MokaBackend::builder().max_bytes(1 << 20).build()
}

/// Loads `program` into a VM with a memoizer installed over `backend`.
pub fn memoizing_vm<B>(program: Program, config: MemoizeConfig, backend: B) -> (ToyVm, Arc<Memoizer<B>>)
where
    B: CacheBackend + 'static,
{
    let memoizer = Arc::new(Memoizer::new(config, backend, program.table()));
    let mut vm = ToyVm::new(program);
    vm.install(memoizer.clone());
    (vm, memoizer)
}
