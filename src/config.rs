//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use crate::hierarchy::HierarchyPolicy;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP port (from BACKLOG_PORT)
    pub port: u16,
    /// Database file (from BACKLOG_DB_PATH). `None` uses the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Apply containment rules to moves too (from BACKLOG_VALIDATE_MOVES)
    pub validate_containment_on_move: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("BACKLOG_PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let db_path = lookup("BACKLOG_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let validate_containment_on_move = lookup("BACKLOG_VALIDATE_MOVES")
            .map(|s| parse_flag(&s))
            .unwrap_or(false);

        Self {
            port,
            db_path,
            validate_containment_on_move,
        }
    }

    pub fn policy(&self) -> HierarchyPolicy {
        HierarchyPolicy {
            validate_containment_on_move: self.validate_containment_on_move,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            validate_containment_on_move: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
