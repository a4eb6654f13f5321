//! Entities mirrored from the compositor and the handles that identify them.
//!
//! Handles are opaque: this crate never dereferences or owns the protocol
//! objects behind them, it only compares them for equality and uses them as
//! map keys.  Relations between entities ([`Monitor::workspace_group`],
//! [`WorkspaceGroup::last_active`], [`Workspace::parent`]) are stored as
//! handles and resolved through the [`Registry`](crate::registry::Registry).

use serde::Serialize;
use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "@{}"), self.0)
            }
        }
    };
}

handle!(
    /// Compositor-issued identity of a `wl_output`.
    OutputHandle,
    "output"
);
handle!(
    /// Compositor-issued identity of a workspace group.
    GroupHandle,
    "group"
);
handle!(
    /// Compositor-issued identity of a workspace.
    WorkspaceHandle,
    "workspace"
);

/// A monitor, keyed in the registry by a process-assigned id.
///
/// Ids are handed out densely from `0` in the order outputs report their
/// name.  Monitors are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    pub output: OutputHandle,
    /// The group currently shown on this monitor, if any.
    pub workspace_group: Option<GroupHandle>,
}

/// A workspace group and its member workspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceGroup {
    /// Members in announcement order.
    pub workspaces: Vec<WorkspaceHandle>,
    /// Workspace to highlight for this group's monitor.
    pub last_active: Option<WorkspaceHandle>,
}

/// A single workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub parent: GroupHandle,
    /// Numeric id parsed from the workspace name.  `None` until the
    /// compositor sends the name.
    pub id: Option<u32>,
    pub active: bool,
}

impl Workspace {
    /// A freshly announced workspace: no id yet, inactive.
    pub fn new(parent: GroupHandle) -> Self {
        Self {
            parent,
            id: None,
            active: false,
        }
    }
}
