//! Inlining of internal JSON references.
//!
//! A mapping whose `$ref` entry is a string beginning with `#` is replaced by
//! a copy of the node the pointer names, itself resolved recursively. Targets
//! are always looked up in the tree as it was before resolution started and
//! are resolved once each, so a reference used many times is expanded once
//! and then copied. References to other documents are left in place.
//!
//! Inlining a graph of shared references can still grow the tree
//! exponentially, so resolution stops once `MAX_COPIED_NODES` nodes have
//! been copied or references nest `MAX_REFERENCE_DEPTH` deep.

use std::collections::HashMap;

use tracing::warn;

use crate::error::DocumentError;
use crate::node::Node;

/// Tracing target for reference resolution.
const RESOLVE_TARGET: &str = "gnostic_document::resolve";

/// Key that marks a reference mapping.
const REFERENCE_KEY: &str = "$ref";

/// Most nodes one resolution may copy into the tree.
pub(crate) const MAX_COPIED_NODES: usize = 1_000_000;

/// Longest chain of references resolved inside one another.
pub(crate) const MAX_REFERENCE_DEPTH: usize = 256;

/// Resolves every internal reference under `root` in place.
///
/// Returns the number of references replaced. On failure `root` is restored
/// to its original state.
///
/// # Errors
///
/// Returns [`DocumentError::UnresolvedReference`] when a pointer names no
/// node, [`DocumentError::CircularReference`] when resolving a reference
/// requires resolving itself, and [`DocumentError::ResolutionLimit`] when
/// the expansion grows past its limits.
pub fn resolve_references(root: &mut Node) -> Result<usize, DocumentError> {
    let snapshot = root.clone();
    let mut resolver = Resolver {
        snapshot: &snapshot,
        active: Vec::new(),
        targets: HashMap::new(),
        copied: 0,
        resolved: 0,
    };
    match resolver.visit(root) {
        Ok(()) => Ok(resolver.resolved),
        Err(error) => {
            *root = snapshot.clone();
            Err(error)
        }
    }
}

/// A fully resolved target and the number of nodes it holds.
struct Target {
    node: Node,
    size: usize,
}

struct Resolver<'a> {
    snapshot: &'a Node,
    active: Vec<String>,
    targets: HashMap<String, Target>,
    copied: usize,
    resolved: usize,
}

impl Resolver<'_> {
    fn visit(&mut self, node: &mut Node) -> Result<(), DocumentError> {
        if let Some(reference) = internal_reference(node) {
            *node = self.copy_of(&reference)?;
            self.resolved += 1;
            return Ok(());
        }

        match node {
            Node::Sequence(items) => items.iter_mut().try_for_each(|item| self.visit(item)),
            Node::Mapping(entries) => entries
                .iter_mut()
                .try_for_each(|(_, value)| self.visit(value)),
            _ => Ok(()),
        }
    }

    /// Returns a copy of the resolved target, charging it to the budget.
    fn copy_of(&mut self, reference: &str) -> Result<Node, DocumentError> {
        self.resolve_target(reference)?;
        let target = self
            .targets
            .get(reference)
            .ok_or_else(|| unresolved(reference))?;
        self.copied = self.copied.saturating_add(target.size);
        if self.copied > MAX_COPIED_NODES {
            return Err(DocumentError::ResolutionLimit {
                reference: reference.to_owned(),
                limit: MAX_COPIED_NODES,
                unit: "copied nodes",
            });
        }
        Ok(target.node.clone())
    }

    /// Resolves `reference` into the target cache unless it is already there.
    fn resolve_target(&mut self, reference: &str) -> Result<(), DocumentError> {
        if self.targets.contains_key(reference) {
            return Ok(());
        }
        if self.active.iter().any(|active| active == reference) {
            return Err(DocumentError::CircularReference {
                reference: reference.to_owned(),
            });
        }
        if self.active.len() >= MAX_REFERENCE_DEPTH {
            return Err(DocumentError::ResolutionLimit {
                reference: reference.to_owned(),
                limit: MAX_REFERENCE_DEPTH,
                unit: "nested references",
            });
        }

        let mut node = self
            .snapshot
            .pointer(reference)
            .cloned()
            .ok_or_else(|| unresolved(reference))?;
        self.active.push(reference.to_owned());
        self.visit(&mut node)?;
        self.active.pop();

        let size = node_count(&node);
        self.targets
            .insert(reference.to_owned(), Target { node, size });
        Ok(())
    }
}

fn unresolved(reference: &str) -> DocumentError {
    DocumentError::UnresolvedReference {
        reference: reference.to_owned(),
    }
}

fn node_count(node: &Node) -> usize {
    match node {
        Node::Sequence(items) => items.iter().map(node_count).sum::<usize>() + 1,
        Node::Mapping(entries) => entries.iter().map(|(_, value)| node_count(value)).sum::<usize>() + 1,
        _ => 1,
    }
}

fn internal_reference(node: &Node) -> Option<String> {
    let reference = node.get(REFERENCE_KEY)?.as_str()?;
    if reference.starts_with('#') {
        return Some(reference.to_owned());
    }
    warn!(
        target: RESOLVE_TARGET,
        reference,
        "leaving external reference unresolved"
    );
    None
}
