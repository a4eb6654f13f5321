//! Application configuration.
//!
//! The binary loads the configuration from
//! `$XDG_CONFIG_HOME/extws/config.json`.  Every key is optional; a missing
//! file or an empty `{}` object yields the compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "use_hyprland_ipc": false,
//!   "poll_interval_ms": 100
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspaces are read through Hyprland's own IPC instead of
    /// `zext_workspace_manager_v1`.  When set, the manager global is never
    /// bound.
    pub use_hyprland_ipc: bool,
    /// Interval between two polls of the compositor (ms).
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_hyprland_ipc: false,
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// The file does not exist, as opposed to being unreadable or invalid.
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{ "use_hyprland_ipc": true, "poll_interval_ms": 250 }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(cfg.use_hyprland_ipc);
        assert_eq!(cfg.poll_interval_ms, 250);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let d = Config::default();
        assert_eq!(cfg.use_hyprland_ipc, d.use_hyprland_ipc);
        assert_eq!(cfg.poll_interval_ms, d.poll_interval_ms);
        assert!(!cfg.use_hyprland_ipc);
    }

    #[test]
    fn unknown_keys_ignored() {
        let json = r#"{ "poll_interval_ms": 50, "widgets_left": ["Workspaces"] }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.poll_interval_ms, 50);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let json = r#"{ "use_hyprland_ipc": "yes" }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("extws-config-{}.json", std::process::id()));
        {
            let mut f = std::fs::File::create(&path).unwrap();
            writeln!(f, r#"{{ "use_hyprland_ipc": true }}"#).unwrap();
        }
        let cfg = Config::load(&path).unwrap();
        assert!(cfg.use_hyprland_ipc);
        assert_eq!(cfg.poll_interval_ms, Config::default().poll_interval_ms);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_errors() {
        let path = std::env::temp_dir().join("extws-does-not-exist.json");
        let err = Config::load(&path).unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn load_invalid_json_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "extws-config-invalid-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(!err.is_missing());
        let _ = std::fs::remove_file(&path);
    }
}
