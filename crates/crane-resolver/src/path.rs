//! The descent path of the depth-first graph build.

use std::collections::HashSet;

use crane_core::reference::Reference;

/// References currently being expanded, from the root downwards.
///
/// Revisiting a reference that is on the path is a cycle; revisiting one that
/// was expanded elsewhere is ordinary dedup and does not involve this type.
#[derive(Debug, Default)]
pub struct DescentPath {
    stack: Vec<Reference>,
    members: HashSet<Reference>,
}

impl DescentPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a reference. The caller checks [`DescentPath::contains`] first.
    pub fn enter(&mut self, reference: &Reference) {
        debug_assert!(!self.members.contains(reference), "{reference} is already on the path");
        self.members.insert(reference.clone());
        self.stack.push(reference.clone());
    }

    /// Pop the innermost reference.
    pub fn leave(&mut self) {
        if let Some(reference) = self.stack.pop() {
            self.members.remove(&reference);
        }
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.members.contains(reference)
    }

    /// Render the loop closed by `reference`: `A -> B -> A`.
    pub fn cycle_through(&self, reference: &Reference) -> String {
        let start = self
            .stack
            .iter()
            .position(|r| r == reference)
            .unwrap_or(0);
        self.stack[start..]
            .iter()
            .chain(std::iter::once(reference))
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
