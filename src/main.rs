//! Entry point for the **extws** daemon.
//!
//! Connects to the compositor, brings the workspace mirror up, then polls
//! once per tick and prints a JSON line with the per-monitor workspace
//! state whenever it changes.  Any connection or protocol error is fatal.

use extws::client::WorkspaceClient;
use extws::config::Config;
use extws::summary::MonitorSummary;
use extws::wayland::channel::WaylandChannel;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Resolve the config directory (`$XDG_CONFIG_HOME/extws`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("extws")
}

/// Load `config.json` from the config directory.  A missing file means
/// defaults; an unreadable or invalid one is reported and also falls back.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if e.is_missing() => {
            info!("no config file at {}, using defaults", path.display());
            Config::default()
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();

    let channel = match WaylandChannel::connect(!config.use_hyprland_ipc) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut client = WorkspaceClient::new(channel, config.use_hyprland_ipc);
    if let Err(e) = client.init() {
        error!("bring-up failed: {}", e);
        std::process::exit(1);
    }
    info!(
        "found {} monitor(s), workspaces {}",
        client.monitors().len(),
        if client.has_workspaces() { "enabled" } else { "disabled" }
    );

    run(&mut client, Duration::from_millis(config.poll_interval_ms));

    if let Err(e) = client.shutdown() {
        error!("shutdown: {}", e);
    }
}

/// Poll until the connection fails or workspaces become unavailable.
fn run(client: &mut WorkspaceClient<WaylandChannel>, interval: Duration) {
    let mut last: Option<Vec<MonitorSummary>> = None;

    while client.has_workspaces() {
        if let Err(e) = client.poll_events() {
            error!("{}", e);
            std::process::exit(1);
        }

        let summary = client.summary();
        if last.as_ref() != Some(&summary) {
            match serde_json::to_string(&summary) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("failed to encode summary: {}", e),
            }
            last = Some(summary);
        }

        std::thread::sleep(interval);
    }
    info!("workspaces unavailable, exiting");
}
