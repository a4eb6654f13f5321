//! [`EventChannel`] implementation backed by a Wayland connection.
//!
//! Globals are bound from the registry as they are advertised: every
//! `wl_output` at version 4, and `zext_workspace_manager_v1` unless the
//! alternative Hyprland IPC mode was selected.  Groups and workspaces are
//! announced through `new_id` events and subscribed automatically.  Every
//! wire event is translated into a [`ProtocolEvent`] and buffered until the
//! current pump call returns.

use super::protocol::zext_workspace_group_handle_v1::{self, ZextWorkspaceGroupHandleV1};
use super::protocol::zext_workspace_handle_v1::{self, ZextWorkspaceHandleV1};
use super::protocol::zext_workspace_manager_v1::{self, ZextWorkspaceManagerV1};
use crate::event::{
    GroupEvent, ManagerEvent, OutputEvent, ProtocolEvent, WorkspaceEvent, WorkspaceStateFlag,
};
use crate::model::{GroupHandle, OutputHandle, WorkspaceHandle};
use crate::traits::EventChannel;
use log::{debug, info};
use wayland_client::protocol::{wl_output, wl_registry};
use wayland_client::{
    event_created_child, ConnectError, Connection, Dispatch, DispatchError, EventQueue, Proxy,
    QueueHandle,
};

/// `wl_output` version bound; the first one carrying the `name` event.
const OUTPUT_VERSION: u32 = 4;
/// Highest `zext_workspace_manager_v1` version this client understands.
const WORKSPACE_MANAGER_VERSION: u32 = 1;

const WORKSPACE_MANAGER_INTERFACE: &str = "zext_workspace_manager_v1";

/// Errors that can occur when talking to the compositor.
#[derive(Debug, thiserror::Error)]
pub enum WaylandError {
    #[error("cannot connect to wayland compositor: {0}")]
    Connect(#[from] ConnectError),
    #[error("wayland dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("wayland flush failed: {0}")]
    Flush(String),
}

/// Dispatch target for the event queue.
struct WaylandState {
    bind_workspace_manager: bool,
    pending: Vec<ProtocolEvent>,
}

impl WaylandState {
    fn push(&mut self, event: ProtocolEvent) {
        self.pending.push(event);
    }
}

/// A live connection to the compositor.
pub struct WaylandChannel {
    connection: Connection,
    queue: EventQueue<WaylandState>,
    state: WaylandState,
    _registry: wl_registry::WlRegistry,
}

impl WaylandChannel {
    /// Connect to `$WAYLAND_DISPLAY` and subscribe to the registry.
    ///
    /// The advertised globals arrive with the first
    /// [`roundtrip`](EventChannel::roundtrip).  `bind_workspace_manager`
    /// is `false` when workspaces are tracked through another IPC.
    pub fn connect(bind_workspace_manager: bool) -> Result<Self, WaylandError> {
        let connection = Connection::connect_to_env()?;
        let queue = connection.new_event_queue::<WaylandState>();
        let qh = queue.handle();
        let registry = connection.display().get_registry(&qh, ());
        info!("connected to wayland compositor");

        Ok(Self {
            connection,
            queue,
            state: WaylandState {
                bind_workspace_manager,
                pending: Vec::new(),
            },
            _registry: registry,
        })
    }

    fn take_pending(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.state.pending)
    }
}

impl EventChannel for WaylandChannel {
    type Error = WaylandError;

    fn roundtrip(&mut self) -> Result<Vec<ProtocolEvent>, WaylandError> {
        self.queue.roundtrip(&mut self.state)?;
        Ok(self.take_pending())
    }

    fn dispatch(&mut self) -> Result<Vec<ProtocolEvent>, WaylandError> {
        self.queue.blocking_dispatch(&mut self.state)?;
        Ok(self.take_pending())
    }

    fn shutdown(&mut self) -> Result<(), WaylandError> {
        self.connection
            .flush()
            .map_err(|e| WaylandError::Flush(e.to_string()))
    }
}

fn protocol_id<P: Proxy>(proxy: &P) -> u32 {
    proxy.id().protocol_id()
}

//  Registry

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        else {
            return;
        };

        if interface == wl_output::WlOutput::interface().name {
            debug!("binding wl_output (global {})", name);
            let _ = registry.bind::<wl_output::WlOutput, _, _>(name, OUTPUT_VERSION, qh, ());
        } else if interface == WORKSPACE_MANAGER_INTERFACE && state.bind_workspace_manager {
            let version = version.min(WORKSPACE_MANAGER_VERSION);
            debug!("binding {} v{} (global {})", interface, version, name);
            let _ = registry.bind::<ZextWorkspaceManagerV1, _, _>(name, version, qh, ());
            state.push(ProtocolEvent::WorkspaceManagerBound);
        }
    }
}

//  Output

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        output: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let event = match event {
            wl_output::Event::Geometry { .. } => OutputEvent::Geometry,
            wl_output::Event::Mode { .. } => OutputEvent::Mode,
            wl_output::Event::Done => OutputEvent::Done,
            wl_output::Event::Scale { factor } => OutputEvent::Scale(factor),
            wl_output::Event::Name { name } => OutputEvent::Name(name),
            wl_output::Event::Description { description } => OutputEvent::Description(description),
            _ => return,
        };
        state.push(ProtocolEvent::Output {
            output: OutputHandle(protocol_id(output)),
            event,
        });
    }
}

//  Workspace manager

impl Dispatch<ZextWorkspaceManagerV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &ZextWorkspaceManagerV1,
        event: zext_workspace_manager_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let event = match event {
            zext_workspace_manager_v1::Event::WorkspaceGroup { workspace_group } => {
                ManagerEvent::NewGroup(GroupHandle(protocol_id(&workspace_group)))
            }
            zext_workspace_manager_v1::Event::Done => ManagerEvent::Done,
            zext_workspace_manager_v1::Event::Finished => ManagerEvent::Finished,
        };
        state.push(ProtocolEvent::Manager(event));
    }

    event_created_child!(WaylandState, ZextWorkspaceManagerV1, [
        zext_workspace_manager_v1::EVT_WORKSPACE_GROUP_OPCODE => (ZextWorkspaceGroupHandleV1, ()),
    ]);
}

//  Workspace group

impl Dispatch<ZextWorkspaceGroupHandleV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        group: &ZextWorkspaceGroupHandleV1,
        event: zext_workspace_group_handle_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let event = match event {
            zext_workspace_group_handle_v1::Event::OutputEnter { output } => {
                GroupEvent::OutputEnter(OutputHandle(protocol_id(&output)))
            }
            zext_workspace_group_handle_v1::Event::OutputLeave { output } => {
                GroupEvent::OutputLeave(OutputHandle(protocol_id(&output)))
            }
            zext_workspace_group_handle_v1::Event::Workspace { workspace } => {
                GroupEvent::WorkspaceAdded(WorkspaceHandle(protocol_id(&workspace)))
            }
            zext_workspace_group_handle_v1::Event::Remove => GroupEvent::Removed,
        };
        state.push(ProtocolEvent::Group {
            group: GroupHandle(protocol_id(group)),
            event,
        });
    }

    event_created_child!(WaylandState, ZextWorkspaceGroupHandleV1, [
        zext_workspace_group_handle_v1::EVT_WORKSPACE_OPCODE => (ZextWorkspaceHandleV1, ()),
    ]);
}

//  Workspace

impl Dispatch<ZextWorkspaceHandleV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        workspace: &ZextWorkspaceHandleV1,
        event: zext_workspace_handle_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let event = match event {
            zext_workspace_handle_v1::Event::Name { name } => WorkspaceEvent::Name(name),
            zext_workspace_handle_v1::Event::Coordinates { .. } => WorkspaceEvent::Geometry,
            zext_workspace_handle_v1::Event::State { state: flags } => {
                WorkspaceEvent::State(WorkspaceStateFlag::decode_array(&flags))
            }
            zext_workspace_handle_v1::Event::Remove => WorkspaceEvent::Removed,
        };
        state.push(ProtocolEvent::Workspace {
            workspace: WorkspaceHandle(protocol_id(workspace)),
            event,
        });
    }
}
