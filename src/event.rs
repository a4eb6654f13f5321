//! Inbound protocol vocabulary.
//!
//! A channel backend decodes whatever arrives on the wire into
//! [`ProtocolEvent`]s; the [`Listener`](crate::listener::Listener) is the
//! only consumer.  Payloads this crate never looks at (output geometry and
//! mode, workspace coordinates) are kept as bare markers so they can still
//! be logged.

use crate::model::{GroupHandle, OutputHandle, WorkspaceHandle};

/// One event received from the compositor, tagged with the object it was
/// emitted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// The backend bound the workspace manager global.  Not a wire event:
    /// it records that the capability was obtained during bring-up.
    WorkspaceManagerBound,
    Output {
        output: OutputHandle,
        event: OutputEvent,
    },
    Manager(ManagerEvent),
    Group {
        group: GroupHandle,
        event: GroupEvent,
    },
    Workspace {
        workspace: WorkspaceHandle,
        event: WorkspaceEvent,
    },
}

/// Events emitted on a `wl_output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Geometry,
    Mode,
    Done,
    Scale(i32),
    Name(String),
    Description(String),
}

/// Events emitted on the workspace manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// A new group was announced.
    NewGroup(GroupHandle),
    Done,
    /// The compositor withdrew the manager.
    Finished,
}

/// Events emitted on a workspace group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    OutputEnter(OutputHandle),
    OutputLeave(OutputHandle),
    WorkspaceAdded(WorkspaceHandle),
    Removed,
}

/// Events emitted on a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Name(String),
    Geometry,
    /// Complete state set for this emission; not a delta.
    State(Vec<WorkspaceStateFlag>),
    Removed,
}

/// One entry of a workspace state array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceStateFlag {
    Active,
    Urgent,
    Hidden,
    Unknown(u32),
}

impl From<u32> for WorkspaceStateFlag {
    fn from(value: u32) -> Self {
        match value {
            0 => WorkspaceStateFlag::Active,
            1 => WorkspaceStateFlag::Urgent,
            2 => WorkspaceStateFlag::Hidden,
            other => WorkspaceStateFlag::Unknown(other),
        }
    }
}

impl WorkspaceStateFlag {
    /// Decode a raw protocol state array: a packed sequence of native-endian
    /// `u32` enum values.  A trailing partial entry is ignored.
    pub fn decode_array(raw: &[u8]) -> Vec<WorkspaceStateFlag> {
        raw.chunks_exact(4)
            .map(|c| WorkspaceStateFlag::from(u32::from_ne_bytes([c[0], c[1], c[2], c[3]])))
            .collect()
    }
}
