//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files. The main knob
//! is the board workflow, which fixes the status set both views group by.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Priority;
use crate::status::Workflow;

pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Board configuration
    #[serde(default)]
    pub board: BoardConfig,

    /// User identity defaults
    #[serde(default)]
    pub user: UserConfig,
}

/// Board-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Status workflow: `four_stage` or `three_stage`
    #[serde(default)]
    pub workflow: Workflow,

    /// Priority assigned when none is given
    #[serde(default = "default_priority")]
    pub default_priority: Priority,

    /// Project whose tasks the CLI operates on
    #[serde(default = "default_project")]
    pub project: String,
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_project() -> String {
    "default".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::default(),
            default_priority: default_priority(),
            project: default_project(),
        }
    }
}

/// User identity defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Default user id when none is specified
    #[serde(default)]
    pub id: Option<String>,

    /// Display name for the default user
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    /// Load configuration from `<dir>/.taskboard.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
