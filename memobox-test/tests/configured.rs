//! A VM wired up from a YAML document.

use std::sync::Arc;

use memobox::{ExecutionContext, FunctionDecl, FunctionIdentity, Value};
use memobox_configuration::MemoboxConfig;
use memobox_test::{Program, ToyVm, VmError};

const CONFIG: &str = r#"
memoize:
  segments: 4
  size: 4 MiB
  default_ttl: 5m
backend:
  type: Moka
  label: toy
  value:
    format: Json
"#;

fn program() -> Program {
    Program::builder()
        .function(
            FunctionDecl::user(FunctionIdentity::method("Geo", "distance")).doc("@memoize"),
            |_vm: &ToyVm, _ctx: &mut ExecutionContext, args: &[Value]| -> Result<Value, VmError> {
                match args {
                    [Value::Float(a), Value::Float(b)] => Ok(Value::Float((a - b).abs())),
                    _ => Err(VmError::raise("distance expects two floats")),
                }
            },
        )
        .build()
        .unwrap()
}

#[test]
fn configured_memoizer_serves_hits_and_reports_entries() {
    let program = program();
    let memoizer = Arc::new(
        MemoboxConfig::from_yaml(CONFIG)
            .unwrap()
            .into_memoizer(program.table())
            .unwrap(),
    );
    let mut vm = ToyVm::new(program);
    vm.install(memoizer.clone());
    let mut ctx = ExecutionContext::new();
    let args = [Value::Float(1.5), Value::Float(-2.0)];

    for _ in 0..3 {
        assert_eq!(vm.call_method(&mut ctx, "Geo", "distance", &args), Ok(Value::Float(3.5)));
    }
    assert_eq!(vm.invocations_of(&FunctionIdentity::method("Geo", "distance")), 1);

    let info = memoizer.info(false).unwrap();
    assert_eq!(info.label, "toy");
    assert_eq!(info.segments, 4);
    assert_eq!((info.hits, info.misses, info.inserts), (2, 1, 1));
    let entries = info.entry_list.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].expire.is_some());
}
