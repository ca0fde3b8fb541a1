//! Eligibility resolution.

use memobox_core::MemoizationPolicy;

use crate::breaker::DisabledSet;
use crate::table::{FunctionId, FunctionKind, FunctionTable};

/// Decides whether a call to `function` is memoized, and with which TTL.
///
/// Walks the function's resolution list, most derived declaration first. A
/// disabled identity anywhere on the walk stops it with
/// [`MemoizationPolicy::Bypass`] before that step's marker is looked at. The
/// first marker found wins; a marker TTL of zero or none defers to the
/// default. Native functions and unknown ids are never eligible.
pub fn resolve(table: &FunctionTable, function: FunctionId, disabled: &DisabledSet) -> MemoizationPolicy {
    let Some(entry) = table.get(function) else {
        return MemoizationPolicy::Bypass;
    };
    if entry.kind() == FunctionKind::Native {
        return MemoizationPolicy::Bypass;
    }

    for step in entry.resolution() {
        let Some(step) = table.get(*step) else {
            break;
        };
        if disabled.is_disabled(step.identity()) {
            return MemoizationPolicy::Bypass;
        }
        if let Some(marker) = step.marker() {
            return MemoizationPolicy::Memoize { ttl: marker.ttl };
        }
    }
    MemoizationPolicy::Bypass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FunctionDecl;
    use memobox_core::FunctionIdentity;
    use std::time::Duration;

    fn method(scope: &str, name: &str) -> FunctionIdentity {
        FunctionIdentity::method(scope, name)
    }

    fn inheritance() -> FunctionTable {
        FunctionTable::load([
            FunctionDecl::user(method("Base", "load")).doc("@memoize(60)"),
            FunctionDecl::user(method("Child", "load")).overrides(method("Base", "load")),
            FunctionDecl::user(method("Marked", "load"))
                .doc("@memoize")
                .overrides(method("Base", "load")),
            FunctionDecl::user(method("Plain", "load")),
            FunctionDecl::native(FunctionIdentity::function("strlen")).doc("@memoize"),
        ])
        .unwrap()
    }

    fn policy_of(table: &FunctionTable, identity: FunctionIdentity, disabled: &DisabledSet) -> MemoizationPolicy {
        resolve(table, table.lookup(&identity).unwrap(), disabled)
    }

    #[test]
    fn marker_is_inherited_from_the_overridden_declaration() {
        let table = inheritance();
        let none = DisabledSet::new();
        assert_eq!(
            policy_of(&table, method("Child", "load"), &none),
            MemoizationPolicy::Memoize {
                ttl: Some(Duration::from_secs(60))
            }
        );
    }

    #[test]
    fn most_derived_marker_wins() {
        let table = inheritance();
        assert_eq!(
            policy_of(&table, method("Marked", "load"), &DisabledSet::new()),
            MemoizationPolicy::Memoize { ttl: None }
        );
    }

    #[test]
    fn unmarked_and_native_functions_bypass() {
        let table = inheritance();
        let none = DisabledSet::new();
        assert_eq!(policy_of(&table, method("Plain", "load"), &none), MemoizationPolicy::Bypass);
        assert_eq!(
            policy_of(&table, FunctionIdentity::function("strlen"), &none),
            MemoizationPolicy::Bypass
        );
    }

    #[test]
    fn disabled_step_stops_the_walk() {
        let table = inheritance();

        let mut disabled = DisabledSet::new();
        disabled.disable(method("Child", "load"));
        assert_eq!(policy_of(&table, method("Child", "load"), &disabled), MemoizationPolicy::Bypass);

        // Disabling the root declaration switches off everything inheriting from it.
        let mut disabled = DisabledSet::new();
        disabled.disable(method("Base", "load"));
        assert_eq!(policy_of(&table, method("Child", "load"), &disabled), MemoizationPolicy::Bypass);
        // A marker found before reaching the disabled step still applies.
        assert!(policy_of(&table, method("Marked", "load"), &disabled).is_eligible());
    }
}
