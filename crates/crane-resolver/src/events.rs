//! Diagnostics stream of a resolution pass.

use std::fmt;

use crane_core::reference::Reference;

/// Whether a request created a node or hit an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    NewlyResolved,
    AlreadyInstalled,
}

/// One entry of the diagnostics stream, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEvent {
    pub reference: Reference,
    pub status: ResolutionStatus,
}

impl ResolutionEvent {
    pub fn new(reference: Reference, status: ResolutionStatus) -> Self {
        Self { reference, status }
    }
}

impl fmt::Display for ResolutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            ResolutionStatus::NewlyResolved => write!(f, "{}: Resolved", self.reference),
            ResolutionStatus::AlreadyInstalled => {
                write!(f, "{}: Already installed!", self.reference)
            }
        }
    }
}
