//! The entity registry: monitors, workspace groups and workspaces as last
//! confirmed by the compositor.
//!
//! Mutators are `pub(crate)`; only the [`Listener`](crate::listener::Listener)
//! writes here.  Everything outside the crate sees read-only views.

use crate::model::{GroupHandle, Monitor, OutputHandle, Workspace, WorkspaceGroup, WorkspaceHandle};
use std::collections::{BTreeMap, HashMap};

/// Owns every mirrored entity plus the monitor id generator.
#[derive(Debug, Default)]
pub struct Registry {
    monitors: BTreeMap<u32, Monitor>,
    groups: HashMap<GroupHandle, WorkspaceGroup>,
    workspaces: HashMap<WorkspaceHandle, Workspace>,
    next_monitor_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monitors by process-assigned id, in id order.
    pub fn monitors(&self) -> &BTreeMap<u32, Monitor> {
        &self.monitors
    }

    pub fn groups(&self) -> &HashMap<GroupHandle, WorkspaceGroup> {
        &self.groups
    }

    pub fn workspaces(&self) -> &HashMap<WorkspaceHandle, Workspace> {
        &self.workspaces
    }

    /// Find the monitor id whose output is `output`.
    pub fn monitor_for_output(&self, output: OutputHandle) -> Option<u32> {
        self.monitors
            .iter()
            .find(|(_, m)| m.output == output)
            .map(|(id, _)| *id)
    }

    //  Mutation (listener only)

    /// Hand out the next monitor id.  Ids start at `0` and never repeat.
    pub(crate) fn allocate_monitor_id(&mut self) -> u32 {
        let id = self.next_monitor_id;
        self.next_monitor_id += 1;
        id
    }

    /// Insert a monitor unless `id` is already taken.  The first write wins.
    pub(crate) fn upsert_monitor(&mut self, id: u32, name: String, output: OutputHandle) -> bool {
        if self.monitors.contains_key(&id) {
            return false;
        }
        self.monitors.insert(
            id,
            Monitor {
                name,
                output,
                workspace_group: None,
            },
        );
        true
    }

    pub(crate) fn monitor_mut(&mut self, id: u32) -> Option<&mut Monitor> {
        self.monitors.get_mut(&id)
    }

    /// Get the group for `handle`, creating an empty one on first touch.
    pub(crate) fn upsert_group(&mut self, handle: GroupHandle) -> &mut WorkspaceGroup {
        self.groups.entry(handle).or_default()
    }

    pub(crate) fn group_mut(&mut self, handle: GroupHandle) -> Option<&mut WorkspaceGroup> {
        self.groups.get_mut(&handle)
    }

    pub(crate) fn erase_group(&mut self, handle: GroupHandle) -> Option<WorkspaceGroup> {
        self.groups.remove(&handle)
    }

    /// (Re)initialise the entry for `handle`.  Handles may be reused by the
    /// compositor, so stale data is overwritten.
    pub(crate) fn upsert_workspace(&mut self, handle: WorkspaceHandle, parent: GroupHandle) {
        self.workspaces.insert(handle, Workspace::new(parent));
    }

    pub(crate) fn workspace_mut(&mut self, handle: WorkspaceHandle) -> Option<&mut Workspace> {
        self.workspaces.get_mut(&handle)
    }

    /// Remove a workspace and prune it from its parent's member list.
    pub(crate) fn erase_workspace(&mut self, handle: WorkspaceHandle) -> Option<Workspace> {
        let removed = self.workspaces.remove(&handle)?;
        if let Some(group) = self.groups.get_mut(&removed.parent) {
            if let Some(pos) = group.workspaces.iter().position(|w| *w == handle) {
                group.workspaces.remove(pos);
            }
        }
        Some(removed)
    }
}
