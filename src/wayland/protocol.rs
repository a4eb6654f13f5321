//! Client bindings for `ext-workspace-unstable-v1`, generated from
//! `protocols/ext-workspace-unstable-v1.xml`.

#![allow(missing_docs, unused_imports, clippy::all)]

use wayland_client;
use wayland_client::protocol::*;

pub mod __interfaces {
    use wayland_client::backend as wayland_backend;
    use wayland_client::protocol::__interfaces::*;
    wayland_scanner::generate_interfaces!("protocols/ext-workspace-unstable-v1.xml");
}
use self::__interfaces::*;

wayland_scanner::generate_client_code!("protocols/ext-workspace-unstable-v1.xml");
