//! Load-time function metadata.
//!
//! The host hands every callable of a loaded program to
//! [`FunctionTable::load`] once. Marker extraction from documentation and
//! override-chain walking both happen here, so that per-call resolution is a
//! couple of slice lookups.

use std::collections::HashMap;

use memobox_core::{FunctionIdentity, MemoizeAttribute};

use crate::error::LoadError;

/// Dense index of a function inside a [`FunctionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u32);

impl FunctionId {
    /// Position of the function in load order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionKind {
    /// Defined in interpreted code.
    #[default]
    User,
    /// Built into the runtime. Never memoized.
    Native,
}

/// One callable as the loader sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Scope and name.
    pub identity: FunctionIdentity,
    /// User or native.
    pub kind: FunctionKind,
    /// Raw documentation text attached to the declaration.
    pub doc: Option<String>,
    /// The declaration this one overrides, if any.
    pub overrides: Option<FunctionIdentity>,
}

impl FunctionDecl {
    /// A user function without documentation.
    pub fn user(identity: FunctionIdentity) -> Self {
        Self {
            identity,
            kind: FunctionKind::User,
            doc: None,
            overrides: None,
        }
    }

    /// A built-in function.
    pub fn native(identity: FunctionIdentity) -> Self {
        Self {
            kind: FunctionKind::Native,
            ..Self::user(identity)
        }
    }

    /// Attaches documentation text.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Marks this declaration as overriding `parent`.
    pub fn overrides(mut self, parent: FunctionIdentity) -> Self {
        self.overrides = Some(parent);
        self
    }
}

/// Metadata of one loaded function.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    identity: FunctionIdentity,
    kind: FunctionKind,
    marker: Option<MemoizeAttribute>,
    resolution: Vec<FunctionId>,
}

impl FunctionEntry {
    /// Scope and name.
    pub fn identity(&self) -> &FunctionIdentity {
        &self.identity
    }

    /// User or native.
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Memoization marker found in this declaration's own documentation.
    pub fn marker(&self) -> Option<&MemoizeAttribute> {
        self.marker.as_ref()
    }

    /// This function followed by every declaration it overrides, most
    /// derived first.
    pub fn resolution(&self) -> &[FunctionId] {
        &self.resolution
    }
}

/// Immutable metadata table for one loaded program.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: Vec<FunctionEntry>,
    index: HashMap<FunctionIdentity, FunctionId>,
}

impl FunctionTable {
    /// Builds the table from every declaration of a program.
    ///
    /// Declarations may appear in any order; an override may name a
    /// declaration that comes later.
    pub fn load(decls: impl IntoIterator<Item = FunctionDecl>) -> Result<Self, LoadError> {
        let decls: Vec<FunctionDecl> = decls.into_iter().collect();

        let mut index = HashMap::with_capacity(decls.len());
        for (position, decl) in decls.iter().enumerate() {
            let id = FunctionId(position as u32);
            if index.insert(decl.identity.clone(), id).is_some() {
                return Err(LoadError::Duplicate(decl.identity.clone()));
            }
        }

        let mut parents = Vec::with_capacity(decls.len());
        for decl in &decls {
            let parent = match &decl.overrides {
                Some(target) => match index.get(target) {
                    Some(id) => Some(*id),
                    None => {
                        return Err(LoadError::UnknownOverride {
                            function: decl.identity.clone(),
                            target: target.clone(),
                        });
                    }
                },
                None => None,
            };
            parents.push(parent);
        }

        let mut entries = Vec::with_capacity(decls.len());
        for (position, decl) in decls.into_iter().enumerate() {
            let mut resolution = vec![FunctionId(position as u32)];
            let mut cursor = parents[position];
            while let Some(parent) = cursor {
                if resolution.contains(&parent) {
                    return Err(LoadError::OverrideCycle(decl.identity));
                }
                resolution.push(parent);
                cursor = parents[parent.index()];
            }

            let marker = decl.doc.as_deref().and_then(MemoizeAttribute::parse);
            entries.push(FunctionEntry {
                identity: decl.identity,
                kind: decl.kind,
                marker,
                resolution,
            });
        }

        tracing::debug!(
            functions = entries.len(),
            marked = entries.iter().filter(|entry| entry.marker.is_some()).count(),
            "function table loaded"
        );

        Ok(Self { entries, index })
    }

    /// Entry for `id`, if it belongs to this table.
    pub fn get(&self, id: FunctionId) -> Option<&FunctionEntry> {
        self.entries.get(id.index())
    }

    /// Id of the function with this identity.
    pub fn lookup(&self, identity: &FunctionIdentity) -> Option<FunctionId> {
        self.index.get(identity).copied()
    }

    /// Number of loaded functions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries with their ids, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionId, &FunctionEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (FunctionId(position as u32), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn method(scope: &str, name: &str) -> FunctionIdentity {
        FunctionIdentity::method(scope, name)
    }

    #[test]
    fn markers_are_extracted_once_at_load() {
        let table = FunctionTable::load([
            FunctionDecl::user(FunctionIdentity::function("plain")).doc("Adds numbers."),
            FunctionDecl::user(FunctionIdentity::function("cached")).doc("/** @memoize(30) */"),
        ])
        .unwrap();

        let plain = table.lookup(&FunctionIdentity::function("plain")).unwrap();
        let cached = table.lookup(&FunctionIdentity::function("cached")).unwrap();
        assert!(table.get(plain).unwrap().marker().is_none());
        assert_eq!(
            table.get(cached).unwrap().marker().unwrap().ttl,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn resolution_lists_walk_to_the_root_declaration() {
        let table = FunctionTable::load([
            FunctionDecl::user(method("Leaf", "run")).overrides(method("Middle", "run")),
            FunctionDecl::user(method("Base", "run")).doc("@memoize"),
            FunctionDecl::user(method("Middle", "run")).overrides(method("Base", "run")),
        ])
        .unwrap();

        let leaf = table.lookup(&method("Leaf", "run")).unwrap();
        let chain: Vec<_> = table
            .get(leaf)
            .unwrap()
            .resolution()
            .iter()
            .map(|id| table.get(*id).unwrap().identity().to_string())
            .collect();
        assert_eq!(chain, ["Leaf::run", "Middle::run", "Base::run"]);
    }

    #[test]
    fn duplicate_identities_are_rejected() {
        let err = FunctionTable::load([
            FunctionDecl::user(FunctionIdentity::function("f")),
            FunctionDecl::user(FunctionIdentity::function("f")),
        ])
        .unwrap_err();
        assert_eq!(err, LoadError::Duplicate(FunctionIdentity::function("f")));
    }

    #[test]
    fn dangling_overrides_are_rejected() {
        let err = FunctionTable::load([
            FunctionDecl::user(method("A", "f")).overrides(method("Missing", "f")),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::UnknownOverride { .. }));
    }

    #[test]
    fn override_cycles_are_rejected() {
        let err = FunctionTable::load([
            FunctionDecl::user(method("A", "f")).overrides(method("B", "f")),
            FunctionDecl::user(method("B", "f")).overrides(method("A", "f")),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::OverrideCycle(_)));
    }

    #[test]
    fn self_override_is_a_cycle() {
        let err =
            FunctionTable::load([FunctionDecl::user(method("A", "f")).overrides(method("A", "f"))])
                .unwrap_err();
        assert_eq!(err, LoadError::OverrideCycle(method("A", "f")));
    }
}
