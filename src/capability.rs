//! The "workspaces supported" capability flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, one-way capability flag.
///
/// Starts out `true`.  Once workspace tracking is disabled (no manager
/// global, or the compositor finished the manager) it stays disabled for
/// the rest of the process.  Clones observe the same flag, so collaborators
/// that poll later can hold their own copy.
#[derive(Debug, Clone)]
pub struct WorkspaceCapability(Arc<AtomicBool>);

impl Default for WorkspaceCapability {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl WorkspaceCapability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether workspace data can be relied upon.
    pub fn has_workspaces(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn disable(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
