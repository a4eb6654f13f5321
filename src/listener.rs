//! Translation of inbound protocol events into registry mutations.
//!
//! [`Listener::apply`] is the single entry point: it matches on the object
//! kind an event was emitted on and updates the [`Registry`] accordingly.
//! Besides the registry it tracks the discovery [`Signals`] that the
//! dispatch loop waits on, and flips the [`WorkspaceCapability`] when the
//! compositor withdraws the workspace manager.
//!
//! Referential-integrity violations (an event for a workspace that was
//! never announced, a workspace whose group is gone, a group entering an
//! output that never reported a name) are returned as [`ProtocolError`].
//! The protocol orders parents before children, so any of these means the
//! client and compositor are out of sync; callers treat them as fatal.

use crate::capability::WorkspaceCapability;
use crate::event::{
    GroupEvent, ManagerEvent, OutputEvent, ProtocolEvent, WorkspaceEvent, WorkspaceStateFlag,
};
use crate::model::{GroupHandle, OutputHandle, WorkspaceHandle};
use crate::registry::Registry;
use log::{debug, info, warn};

/// Integrity violations detected while applying an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("event for unregistered {0}")]
    UnknownWorkspace(WorkspaceHandle),
    #[error("{workspace} refers to missing {group}")]
    MissingParentGroup {
        workspace: WorkspaceHandle,
        group: GroupHandle,
    },
    #[error("{group} reported {output}, which has no registered monitor")]
    UnknownOutput {
        group: GroupHandle,
        output: OutputHandle,
    },
    #[error("{workspace} has non-numeric name {name:?}")]
    InvalidWorkspaceName {
        workspace: WorkspaceHandle,
        name: String,
    },
}

/// Progress markers raised by callbacks and consumed by the dispatch loop.
///
/// Each flag is set when the corresponding kind of object is first seen and
/// cleared by whoever waited on it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// An output reported its name.
    pub monitors_registered: bool,
    /// The manager announced a new group.
    pub group_registered: bool,
    /// A group announced a new workspace.
    pub workspace_registered: bool,
    /// A workspace reported its name.
    pub workspace_info_registered: bool,
}

/// Applies protocol events to the registry.
#[derive(Debug, Default)]
pub struct Listener {
    registry: Registry,
    capability: WorkspaceCapability,
    signals: Signals,
    manager_bound: bool,
}

impl Listener {
    pub fn new(capability: WorkspaceCapability) -> Self {
        Self {
            registry: Registry::new(),
            capability,
            signals: Signals::default(),
            manager_bound: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub(crate) fn signals_mut(&mut self) -> &mut Signals {
        &mut self.signals
    }

    /// Whether the backend bound the workspace manager.
    pub fn manager_bound(&self) -> bool {
        self.manager_bound
    }

    pub fn capability(&self) -> &WorkspaceCapability {
        &self.capability
    }

    /// Apply a single event.
    pub fn apply(&mut self, event: ProtocolEvent) -> Result<(), ProtocolError> {
        match event {
            ProtocolEvent::WorkspaceManagerBound => {
                debug!("workspace manager bound");
                self.manager_bound = true;
                Ok(())
            }
            ProtocolEvent::Output { output, event } => {
                self.on_output(output, event);
                Ok(())
            }
            ProtocolEvent::Manager(event) => {
                self.on_manager(event);
                Ok(())
            }
            ProtocolEvent::Group { group, event } => self.on_group(group, event),
            ProtocolEvent::Workspace { workspace, event } => self.on_workspace(workspace, event),
        }
    }

    //  Output

    fn on_output(&mut self, output: OutputHandle, event: OutputEvent) {
        match event {
            OutputEvent::Name(name) => {
                let id = self.registry.allocate_monitor_id();
                info!("registering monitor {} at id {}", name, id);
                self.signals.monitors_registered = true;
                self.registry.upsert_monitor(id, name, output);
            }
            other => debug!("ignoring {:?} on {}", other, output),
        }
    }

    //  Workspace manager

    fn on_manager(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::NewGroup(group) => {
                debug!("new {}", group);
                self.signals.group_registered = true;
                self.registry.upsert_group(group);
            }
            ManagerEvent::Done => {}
            ManagerEvent::Finished => {
                warn!("workspace manager finished, disabling workspaces");
                self.capability.disable();
            }
        }
    }

    //  Workspace group

    fn on_group(&mut self, group: GroupHandle, event: GroupEvent) -> Result<(), ProtocolError> {
        match event {
            GroupEvent::OutputEnter(output) => {
                let id = self.monitor_for(group, output)?;
                info!("assigning {} to monitor {}", group, id);
                if let Some(monitor) = self.registry.monitor_mut(id) {
                    monitor.workspace_group = Some(group);
                }
            }
            GroupEvent::OutputLeave(output) => {
                let id = self.monitor_for(group, output)?;
                info!("{} left monitor {}", group, id);
                if let Some(monitor) = self.registry.monitor_mut(id) {
                    monitor.workspace_group = None;
                }
            }
            GroupEvent::WorkspaceAdded(workspace) => {
                info!("added {} to {}", workspace, group);
                self.registry.upsert_group(group).workspaces.push(workspace);
                self.registry.upsert_workspace(workspace, group);
                self.signals.workspace_registered = true;
            }
            GroupEvent::Removed => {
                // Member workspaces are left in place; they are removed by
                // their own events.
                info!("removed {}", group);
                self.registry.erase_group(group);
            }
        }
        Ok(())
    }

    fn monitor_for(&self, group: GroupHandle, output: OutputHandle) -> Result<u32, ProtocolError> {
        self.registry
            .monitor_for_output(output)
            .ok_or(ProtocolError::UnknownOutput { group, output })
    }

    //  Workspace

    fn on_workspace(
        &mut self,
        workspace: WorkspaceHandle,
        event: WorkspaceEvent,
    ) -> Result<(), ProtocolError> {
        match event {
            WorkspaceEvent::Name(name) => {
                let id = name
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ProtocolError::InvalidWorkspaceName {
                        workspace,
                        name: name.clone(),
                    })?;
                let ws = self
                    .registry
                    .workspace_mut(workspace)
                    .ok_or(ProtocolError::UnknownWorkspace(workspace))?;
                ws.id = Some(id);
                debug!("{} has id {}", workspace, id);
                self.signals.workspace_info_registered = true;
            }
            WorkspaceEvent::Geometry => {}
            WorkspaceEvent::State(flags) => {
                let parent = self.parent_of(workspace)?;
                let active = flags.contains(&WorkspaceStateFlag::Active);

                let ws = self
                    .registry
                    .workspace_mut(workspace)
                    .ok_or(ProtocolError::UnknownWorkspace(workspace))?;
                ws.active = active;
                let id = ws.id;

                if active {
                    info!("activate workspace {:?}", id);
                    if let Some(group) = self.registry.group_mut(parent) {
                        group.last_active = Some(workspace);
                    }
                } else {
                    info!("deactivate workspace {:?}", id);
                }
            }
            WorkspaceEvent::Removed => {
                self.parent_of(workspace)?;
                self.registry.erase_workspace(workspace);
                info!("removed {}", workspace);
            }
        }
        Ok(())
    }

    /// Resolve the parent group of `workspace`, which must be live.
    fn parent_of(&self, workspace: WorkspaceHandle) -> Result<GroupHandle, ProtocolError> {
        let ws = self
            .registry
            .workspaces()
            .get(&workspace)
            .ok_or(ProtocolError::UnknownWorkspace(workspace))?;
        if !self.registry.groups().contains_key(&ws.parent) {
            return Err(ProtocolError::MissingParentGroup {
                workspace,
                group: ws.parent,
            });
        }
        Ok(ws.parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUT: OutputHandle = OutputHandle(10);
    const GROUP: GroupHandle = GroupHandle(20);

    fn output_name(output: OutputHandle, name: &str) -> ProtocolEvent {
        ProtocolEvent::Output {
            output,
            event: OutputEvent::Name(name.into()),
        }
    }

    fn group(event: GroupEvent) -> ProtocolEvent {
        ProtocolEvent::Group { group: GROUP, event }
    }

    fn ws(id: u32, event: WorkspaceEvent) -> ProtocolEvent {
        ProtocolEvent::Workspace {
            workspace: WorkspaceHandle(id),
            event,
        }
    }

    fn apply_all(listener: &mut Listener, events: Vec<ProtocolEvent>) {
        for e in events {
            listener.apply(e).unwrap();
        }
    }

    /// A listener with one monitor, one group on it, and workspaces
    /// `handles` added to that group.
    fn populated(handles: &[u32]) -> Listener {
        let mut l = Listener::default();
        let mut events = vec![
            output_name(OUT, "DP-1"),
            ProtocolEvent::Manager(ManagerEvent::NewGroup(GROUP)),
            group(GroupEvent::OutputEnter(OUT)),
        ];
        for h in handles {
            events.push(group(GroupEvent::WorkspaceAdded(WorkspaceHandle(*h))));
        }
        apply_all(&mut l, events);
        l
    }

    #[test]
    fn single_monitor_scenario() {
        let mut l = populated(&[30]);
        apply_all(
            &mut l,
            vec![
                ws(30, WorkspaceEvent::Name("1".into())),
                ws(30, WorkspaceEvent::State(vec![WorkspaceStateFlag::Active])),
            ],
        );

        let reg = l.registry();
        assert_eq!(reg.monitors()[&0].workspace_group, Some(GROUP));
        assert_eq!(reg.groups()[&GROUP].last_active, Some(WorkspaceHandle(30)));
        let w = &reg.workspaces()[&WorkspaceHandle(30)];
        assert_eq!(w.id, Some(1));
        assert!(w.active);
    }

    #[test]
    fn monitor_ids_ignore_interleaved_events() {
        let mut l = Listener::default();
        apply_all(
            &mut l,
            vec![
                ProtocolEvent::Output {
                    output: OutputHandle(1),
                    event: OutputEvent::Geometry,
                },
                output_name(OutputHandle(1), "DP-1"),
                ProtocolEvent::Manager(ManagerEvent::NewGroup(GROUP)),
                ProtocolEvent::Output {
                    output: OutputHandle(2),
                    event: OutputEvent::Scale(2),
                },
                output_name(OutputHandle(2), "DP-2"),
                ProtocolEvent::Output {
                    output: OutputHandle(2),
                    event: OutputEvent::Done,
                },
                output_name(OutputHandle(3), "HDMI-A-1"),
            ],
        );
        let ids: Vec<u32> = l.registry().monitors().keys().copied().collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(l.registry().monitors()[&2].name, "HDMI-A-1");
        assert!(l.signals().monitors_registered);
    }

    #[test]
    fn state_event_is_a_full_reset() {
        let mut l = populated(&[30]);
        apply_all(
            &mut l,
            vec![
                ws(30, WorkspaceEvent::State(vec![WorkspaceStateFlag::Active])),
                ws(30, WorkspaceEvent::State(vec![])),
            ],
        );
        assert!(!l.registry().workspaces()[&WorkspaceHandle(30)].active);
    }

    #[test]
    fn non_active_flags_do_not_activate() {
        let mut l = populated(&[30]);
        l.apply(ws(
            30,
            WorkspaceEvent::State(vec![WorkspaceStateFlag::Urgent, WorkspaceStateFlag::Hidden]),
        ))
        .unwrap();
        assert!(!l.registry().workspaces()[&WorkspaceHandle(30)].active);
        assert_eq!(l.registry().groups()[&GROUP].last_active, None);
    }

    #[test]
    fn last_active_is_last_writer() {
        let mut l = populated(&[30, 31]);
        apply_all(
            &mut l,
            vec![
                ws(30, WorkspaceEvent::State(vec![WorkspaceStateFlag::Active])),
                ws(31, WorkspaceEvent::State(vec![WorkspaceStateFlag::Active])),
            ],
        );
        assert_eq!(l.registry().groups()[&GROUP].last_active, Some(WorkspaceHandle(31)));
    }

    #[test]
    fn workspace_removal_prunes_everywhere() {
        let mut l = populated(&[30, 31, 32]);
        l.apply(ws(31, WorkspaceEvent::Removed)).unwrap();

        let reg = l.registry();
        assert!(!reg.workspaces().contains_key(&WorkspaceHandle(31)));
        assert_eq!(
            reg.groups()[&GROUP].workspaces,
            vec![WorkspaceHandle(30), WorkspaceHandle(32)]
        );
    }

    #[test]
    fn group_removal_does_not_cascade() {
        let mut l = populated(&[30]);
        l.apply(group(GroupEvent::Removed)).unwrap();
        assert!(l.registry().groups().is_empty());
        assert!(l.registry().workspaces().contains_key(&WorkspaceHandle(30)));

        // Later events on the orphan are integrity violations.
        let err = l
            .apply(ws(30, WorkspaceEvent::State(vec![])))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MissingParentGroup {
                workspace: WorkspaceHandle(30),
                group: GROUP,
            }
        );
    }

    #[test]
    fn output_leave_clears_group() {
        let mut l = populated(&[]);
        l.apply(group(GroupEvent::OutputLeave(OUT))).unwrap();
        assert_eq!(l.registry().monitors()[&0].workspace_group, None);
    }

    #[test]
    fn output_enter_for_unknown_output_fails() {
        let mut l = Listener::default();
        let err = l
            .apply(group(GroupEvent::OutputEnter(OutputHandle(99))))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnknownOutput {
                group: GROUP,
                output: OutputHandle(99),
            }
        );
    }

    #[test]
    fn non_numeric_name_fails() {
        let mut l = populated(&[30]);
        let err = l.apply(ws(30, WorkspaceEvent::Name("web".into()))).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidWorkspaceName { .. }));
        assert_eq!(l.registry().workspaces()[&WorkspaceHandle(30)].id, None);
    }

    #[test]
    fn events_for_unknown_workspace_fail() {
        let mut l = Listener::default();
        assert_eq!(
            l.apply(ws(77, WorkspaceEvent::Name("3".into()))).unwrap_err(),
            ProtocolError::UnknownWorkspace(WorkspaceHandle(77))
        );
        assert_eq!(
            l.apply(ws(77, WorkspaceEvent::Removed)).unwrap_err(),
            ProtocolError::UnknownWorkspace(WorkspaceHandle(77))
        );
    }

    #[test]
    fn manager_finished_disables_capability() {
        let cap = WorkspaceCapability::new();
        let mut l = Listener::new(cap.clone());
        l.apply(ProtocolEvent::Manager(ManagerEvent::Finished)).unwrap();
        assert!(!cap.has_workspaces());
    }

    #[test]
    fn discovery_signals_are_raised() {
        let mut l = populated(&[30]);
        assert!(l.signals().group_registered);
        assert!(l.signals().workspace_registered);
        assert!(!l.signals().workspace_info_registered);
        l.apply(ws(30, WorkspaceEvent::Name("4".into()))).unwrap();
        assert!(l.signals().workspace_info_registered);
    }
}
