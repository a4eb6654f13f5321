//! **extws** — a mirror of a Wayland compositor's workspace state.
//!
//! The compositor announces outputs, workspace groups and workspaces over
//! `zext_workspace_manager_v1` as an unordered stream of add, remove and
//! state-change events.  This crate rebuilds from that stream a consistent
//! model of which workspaces exist, which group and monitor they belong to,
//! and which one is active, so a status bar can draw workspace indicators.
//!
//! # Architecture
//!
//! * [`traits::EventChannel`] abstracts the connection so the mirror is not
//!   coupled to a live compositor.
//! * [`listener::Listener`] turns each [`event::ProtocolEvent`] into a
//!   mutation of the [`registry::Registry`].
//! * [`client::WorkspaceClient`] owns both, pumps events, and runs the
//!   bring-up sequence.
//!
//! The concrete channel lives in [`wayland`] (behind the `wayland` feature).

pub mod capability;
pub mod client;
pub mod config;
pub mod event;
pub mod listener;
pub mod model;
pub mod registry;
pub mod summary;
pub mod traits;
#[cfg(feature = "wayland")]
pub mod wayland;
