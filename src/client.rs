//! The workspace client: owns the channel and the listener, drives event
//! dispatch, and runs the bring-up sequence.
//!
//! [`WorkspaceClient`] is generic over any [`EventChannel`], so the same
//! bring-up and polling logic runs against a live compositor or a scripted
//! channel in tests.
//!
//! # Typical usage
//!
//! ```ignore
//! let channel = WaylandChannel::connect(!config.use_hyprland_ipc)?;
//! let mut client = WorkspaceClient::new(channel, config.use_hyprland_ipc);
//! client.init()?;
//! loop {
//!     client.poll_events()?;
//!     render(client.summary());
//! }
//! ```

use crate::capability::WorkspaceCapability;
use crate::event::ProtocolEvent;
use crate::listener::{Listener, ProtocolError};
use crate::model::{GroupHandle, Monitor, Workspace, WorkspaceGroup, WorkspaceHandle};
use crate::registry::Registry;
use crate::summary::{summarize, MonitorSummary};
use crate::traits::EventChannel;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

/// Errors surfaced by the client.  Both kinds are fatal to the mirror.
#[derive(Debug, thiserror::Error)]
pub enum ClientError<E: std::error::Error + 'static> {
    /// The channel failed or the connection was lost.
    #[error("channel error: {0}")]
    Channel(#[source] E),
    /// The compositor sent events that contradict the mirrored state.
    #[error("protocol desync: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Mirror of the compositor's monitors, workspace groups and workspaces.
pub struct WorkspaceClient<C: EventChannel> {
    channel: C,
    listener: Listener,
    use_hyprland_ipc: bool,
}

impl<C: EventChannel> WorkspaceClient<C> {
    /// Wrap an open channel.
    ///
    /// `use_hyprland_ipc` selects the alternative IPC mode in which the
    /// workspace manager is deliberately not bound; its absence is then
    /// not treated as missing support.
    pub fn new(channel: C, use_hyprland_ipc: bool) -> Self {
        Self {
            channel,
            listener: Listener::new(WorkspaceCapability::new()),
            use_hyprland_ipc,
        }
    }

    //  Read surface

    pub fn monitors(&self) -> &BTreeMap<u32, Monitor> {
        self.listener.registry().monitors()
    }

    pub fn workspace_groups(&self) -> &HashMap<GroupHandle, WorkspaceGroup> {
        self.listener.registry().groups()
    }

    pub fn workspaces(&self) -> &HashMap<WorkspaceHandle, Workspace> {
        self.listener.registry().workspaces()
    }

    pub fn registry(&self) -> &Registry {
        self.listener.registry()
    }

    /// A handle to the capability flag that stays valid after the client
    /// is gone.
    pub fn capability(&self) -> WorkspaceCapability {
        self.listener.capability().clone()
    }

    pub fn has_workspaces(&self) -> bool {
        self.listener.capability().has_workspaces()
    }

    /// Per-monitor view of the current state.
    pub fn summary(&self) -> Vec<MonitorSummary> {
        summarize(self.listener.registry())
    }

    //  Dispatch

    /// Process everything currently queued, waiting for the compositor to
    /// acknowledge.
    pub fn drain(&mut self) -> Result<(), ClientError<C::Error>> {
        let events = self.channel.roundtrip().map_err(ClientError::Channel)?;
        self.apply(events)
    }

    /// Dispatch events until `done` holds.
    ///
    /// There is no timeout: a compositor that never produces the awaited
    /// event blocks this call until the connection fails.
    pub fn wait_for<P>(&mut self, done: P) -> Result<(), ClientError<C::Error>>
    where
        P: Fn(&Listener) -> bool,
    {
        while !done(&self.listener) {
            let events = self.channel.dispatch().map_err(ClientError::Channel)?;
            self.apply(events)?;
        }
        Ok(())
    }

    fn apply(&mut self, events: Vec<ProtocolEvent>) -> Result<(), ClientError<C::Error>> {
        for event in events {
            self.listener.apply(event)?;
        }
        Ok(())
    }

    //  Lifecycle

    /// Bring the mirror up: receive the advertised globals, wait for at
    /// least one monitor, then pick initial active workspaces.
    ///
    /// If the workspace manager was not bound in protocol mode, workspace
    /// tracking is disabled and the remaining steps are skipped.
    pub fn init(&mut self) -> Result<(), ClientError<C::Error>> {
        self.drain()?;

        self.wait_for(|l| l.signals().monitors_registered)?;
        self.listener.signals_mut().monitors_registered = false;

        if !self.listener.manager_bound() && !self.use_hyprland_ipc {
            warn!("compositor doesn't implement zext_workspace_manager_v1, disabling workspaces");
            warn!("note: Hyprland v0.30.0 removed zext_workspace_manager_v1, enable use_hyprland_ipc instead");
            self.listener.capability().disable();
            return Ok(());
        }

        self.activate_initial_workspaces();
        Ok(())
    }

    /// Some compositors send no initial state, so the workspace numbered
    /// `monitor id + 1` is made the visible one of each monitor's group,
    /// and workspace 1 is marked active.
    fn activate_initial_workspaces(&mut self) {
        let registry = self.listener.registry_mut();

        let targets: Vec<(Option<GroupHandle>, WorkspaceHandle, u32)> = registry
            .monitors()
            .iter()
            .filter_map(|(monitor_id, monitor)| {
                let expected = monitor_id + 1;
                registry
                    .workspaces()
                    .iter()
                    .find(|(_, ws)| ws.id == Some(expected))
                    .map(|(handle, _)| (monitor.workspace_group, *handle, expected))
            })
            .collect();

        for (group, handle, id) in targets {
            info!("forcefully activate workspace {}", id);
            if id == 1 {
                if let Some(ws) = registry.workspace_mut(handle) {
                    ws.active = true;
                }
            }
            match group.and_then(|g| registry.group_mut(g)) {
                Some(group) => group.last_active = Some(handle),
                None => debug!("no group to make workspace {} visible in", id),
            }
        }
    }

    /// One steady-state tick: drain, then let freshly announced groups and
    /// workspaces finish describing themselves.
    pub fn poll_events(&mut self) -> Result<(), ClientError<C::Error>> {
        self.drain()?;

        if self.listener.signals().group_registered {
            self.wait_for(|l| l.signals().workspace_registered)?;
        }
        if self.listener.signals().workspace_registered {
            self.wait_for(|l| l.signals().workspace_info_registered)?;
        }

        let signals = self.listener.signals_mut();
        signals.group_registered = false;
        signals.workspace_registered = false;
        signals.workspace_info_registered = false;
        Ok(())
    }

    /// Release the connection.
    pub fn shutdown(mut self) -> Result<(), C::Error> {
        info!("shutting down workspace client");
        self.channel.shutdown()
    }
}
