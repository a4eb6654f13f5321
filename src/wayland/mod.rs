//! Wayland-specific implementations.
//!
//! [`channel::WaylandChannel`] implements
//! [`EventChannel`](crate::traits::EventChannel) over the compositor socket
//! named by `$WAYLAND_DISPLAY`.  [`protocol`] holds the generated bindings
//! for `zext_workspace_manager_v1`.
//!
//! Nothing outside this module should reference `wayland-client` directly.

pub mod channel;
pub mod protocol;
