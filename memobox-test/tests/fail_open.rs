//! Store failures never reach the intercepted program.

use memobox::{ExecutionContext, FunctionDecl, FunctionIdentity, MemoizeConfig, Value};
use memobox_backend::{Backend, CacheBackend};
use memobox_core::{CacheValue, Raw};
use memobox_test::backend::FlakyBackend;
use memobox_test::{Program, ToyVm, VmError, memoizing_vm, small_store};

fn program() -> Program {
    Program::builder()
        .function(
            FunctionDecl::user(FunctionIdentity::function("lookup")).doc("@memoize"),
            |_vm: &ToyVm, _ctx: &mut ExecutionContext, args: &[Value]| -> Result<Value, VmError> {
                Ok(Value::List(args.to_vec()))
            },
        )
        .build()
        .unwrap()
}

#[test]
fn unreachable_store_executes_every_call() {
    let (vm, memoizer) = memoizing_vm(
        program(),
        MemoizeConfig::default(),
        FlakyBackend::new(small_store()),
    );
    memoizer.backend().set_offline(true);
    let mut ctx = ExecutionContext::new();

    for _ in 0..3 {
        assert_eq!(
            vm.call(&mut ctx, "lookup", &[Value::Int(1)]),
            Ok(Value::List(vec![Value::Int(1)]))
        );
    }
    assert_eq!(vm.invocations("lookup"), 3);
    // One failed fetch and one failed store per call.
    assert_eq!(memoizer.backend().failures(), 6);
    assert!(ctx.disabled().is_empty());
    assert!(memoizer.info(true).is_err());
}

#[test]
fn store_recovers_once_reachable_again() {
    let (vm, memoizer) = memoizing_vm(
        program(),
        MemoizeConfig::default(),
        FlakyBackend::new(small_store()),
    );
    let mut ctx = ExecutionContext::new();

    memoizer.backend().set_offline(true);
    vm.call(&mut ctx, "lookup", &[]).unwrap();

    memoizer.backend().set_offline(false);
    vm.call(&mut ctx, "lookup", &[]).unwrap();
    vm.call(&mut ctx, "lookup", &[]).unwrap();

    assert_eq!(vm.invocations("lookup"), 2);
}

#[test]
fn corrupted_entry_is_dropped_and_recomputed() {
    let (vm, memoizer) = memoizing_vm(program(), MemoizeConfig::default(), small_store());
    let mut ctx = ExecutionContext::new();

    vm.call(&mut ctx, "lookup", &[Value::Int(9)]).unwrap();
    let key = memobox::build_key(
        memoizer.backend().value_format(),
        &FunctionIdentity::function("lookup"),
        &[Value::Int(9)],
    )
    .unwrap();
    memoizer
        .backend()
        .write(
            &key,
            CacheValue::new(Raw::from_static(b"\xff\xff\xff"), ctx.now(), None),
        )
        .unwrap();

    assert_eq!(
        vm.call(&mut ctx, "lookup", &[Value::Int(9)]),
        Ok(Value::List(vec![Value::Int(9)]))
    );
    assert_eq!(vm.invocations("lookup"), 2);
    assert!(ctx.disabled().is_empty());

    // The fresh result replaced the garbage.
    assert_eq!(
        memoizer.backend().fetch(&key, ctx.now()).unwrap(),
        Some(Value::List(vec![Value::Int(9)]))
    );
}
