//! Span outcomes recorded for each intercepted event.

use std::time::Duration;

use memobox::{ExecutionContext, FunctionDecl, FunctionIdentity, MemoizeConfig, Value};
use memobox_core::{ContinuationHandle, ResourceHandle, SmolStr};
use memobox_test::tracing::with_span_capture;
use memobox_test::{Program, ToyVm, VmError, memoizing_vm, small_store};
use pretty_assertions::assert_eq;

fn echo(_vm: &ToyVm, _ctx: &mut ExecutionContext, args: &[Value]) -> Result<Value, VmError> {
    match args {
        [Value::Str(s)] if s == "fail" => Err(VmError::raise("asked to fail")),
        [Value::Str(s)] if s == "handle" => Ok(Value::Continuation(ContinuationHandle { id: 1 })),
        [value] => Ok(value.clone()),
        _ => Ok(Value::Null),
    }
}

fn vm() -> ToyVm {
    let program = Program::builder()
        .function(FunctionDecl::user(FunctionIdentity::function("echo")).doc("@memoize"), echo)
        .function(FunctionDecl::user(FunctionIdentity::function("plain")), echo)
        .build()
        .unwrap();
    let config = MemoizeConfig::builder().default_ttl(Duration::from_secs(60)).build();
    memoizing_vm(program, config, small_store()).0
}

#[test]
fn miss_then_hit() {
    let vm = vm();
    let (_, spans) = with_span_capture(|| {
        let mut ctx = ExecutionContext::new();
        vm.call(&mut ctx, "echo", &[Value::Int(1)]).unwrap();
        vm.call(&mut ctx, "echo", &[Value::Int(1)]).unwrap();
    });

    assert_eq!(spans.outcomes("memobox.call"), ["miss", "hit"]);
    assert_eq!(spans.outcomes("memobox.return"), ["stored"]);
    assert!(
        spans
            .spans()
            .iter()
            .all(|span| span.field("function") == Some("echo"))
    );
}

#[test]
fn ineligible_calls_leave_no_spans() {
    let vm = vm();
    let (_, spans) = with_span_capture(|| {
        let mut ctx = ExecutionContext::new();
        vm.call(&mut ctx, "plain", &[Value::Int(1)]).unwrap();
    });

    assert!(spans.spans().is_empty());
}

#[test]
fn raise_then_disabled() {
    let vm = vm();
    let (_, spans) = with_span_capture(|| {
        let mut ctx = ExecutionContext::new();
        assert!(vm.call(&mut ctx, "echo", &[Value::str("fail")]).is_err());
        vm.call(&mut ctx, "echo", &[Value::Int(2)]).unwrap();
    });

    // After the trip the function is no longer eligible at all.
    assert_eq!(spans.outcomes("memobox.call"), ["miss"]);
    assert_eq!(spans.outcomes("memobox.return"), ["raised"]);
}

#[test]
fn live_objects_are_reported() {
    let vm = vm();
    let resource = Value::Resource(ResourceHandle {
        id: 4,
        kind: SmolStr::new("socket"),
    });
    let (_, spans) = with_span_capture(|| {
        let mut ctx = ExecutionContext::new();
        vm.call(&mut ctx, "echo", &[resource.clone()]).unwrap();
        vm.call(&mut ctx, "echo", &[Value::str("handle")]).unwrap();
    });

    assert_eq!(spans.outcomes("memobox.call"), ["unkeyable", "miss"]);
    assert_eq!(spans.outcomes("memobox.return"), ["unkeyable", "unserializable"]);
}
