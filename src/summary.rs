//! Per-monitor view of the registry, shaped for a workspace indicator.

use crate::registry::Registry;
use serde::Serialize;

/// Workspaces shown on one monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorSummary {
    pub id: u32,
    pub name: String,
    pub workspaces: Vec<WorkspaceSummary>,
}

/// Indicator state of one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceSummary {
    /// Numeric id, `None` while the name has not arrived.
    pub id: Option<u32>,
    pub active: bool,
    /// The group's last active workspace, i.e. the one on screen.
    pub visible: bool,
}

/// Build one entry per monitor, in monitor id order.
///
/// Workspaces come from the monitor's current group and are sorted by
/// numeric id; unnamed ones go last.  A monitor without a group (or whose
/// group is gone) has no workspaces.
pub fn summarize(registry: &Registry) -> Vec<MonitorSummary> {
    registry
        .monitors()
        .iter()
        .map(|(id, monitor)| {
            let group = monitor
                .workspace_group
                .and_then(|g| registry.groups().get(&g));

            let mut workspaces: Vec<WorkspaceSummary> = group
                .map(|group| {
                    group
                        .workspaces
                        .iter()
                        .filter_map(|handle| {
                            registry.workspaces().get(handle).map(|ws| WorkspaceSummary {
                                id: ws.id,
                                active: ws.active,
                                visible: group.last_active == Some(*handle),
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            workspaces.sort_by_key(|w| (w.id.is_none(), w.id));

            MonitorSummary {
                id: *id,
                name: monitor.name.clone(),
                workspaces,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupHandle, OutputHandle, WorkspaceHandle};

    fn registry_with_group() -> Registry {
        let mut reg = Registry::new();
        let id = reg.allocate_monitor_id();
        reg.upsert_monitor(id, "DP-1".into(), OutputHandle(1));
        let id = reg.allocate_monitor_id();
        reg.upsert_monitor(id, "DP-2".into(), OutputHandle(2));

        let g = GroupHandle(20);
        reg.monitor_mut(0).unwrap().workspace_group = Some(g);
        for (handle, num) in [(30, Some(3)), (31, None), (32, Some(1))] {
            reg.upsert_group(g).workspaces.push(WorkspaceHandle(handle));
            reg.upsert_workspace(WorkspaceHandle(handle), g);
            reg.workspace_mut(WorkspaceHandle(handle)).unwrap().id = num;
        }
        reg.workspace_mut(WorkspaceHandle(32)).unwrap().active = true;
        reg.group_mut(g).unwrap().last_active = Some(WorkspaceHandle(32));
        reg
    }

    #[test]
    fn workspaces_sorted_by_id_with_unnamed_last() {
        let summary = summarize(&registry_with_group());
        let ids: Vec<Option<u32>> = summary[0].workspaces.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![Some(1), Some(3), None]);
    }

    #[test]
    fn visible_follows_last_active() {
        let summary = summarize(&registry_with_group());
        let first = &summary[0].workspaces[0];
        assert!(first.active);
        assert!(first.visible);
        assert!(summary[0].workspaces[1..].iter().all(|w| !w.visible));
    }

    #[test]
    fn monitor_without_group_is_empty() {
        let summary = summarize(&registry_with_group());
        assert_eq!(summary[1].name, "DP-2");
        assert!(summary[1].workspaces.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let summary = summarize(&registry_with_group());
        let json = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(json["name"], "DP-1");
        assert_eq!(json["workspaces"][0]["id"], 1);
        assert_eq!(json["workspaces"][2]["id"], serde_json::Value::Null);
    }
}
