// BlueStack Configuration
// Limits for the VM plus console settings, read from bluestack.json

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{VmError, VmResult};

pub const CONFIG_FILE: &str = "bluestack.json";

pub const MAX_STACKS: usize = 10;
pub const STACK_CAPACITY: usize = 256;
pub const MAX_PROGRAM_SIZE: usize = 1000;
pub const MAX_LABELS: usize = 100;
pub const MAX_STACK_NAME: usize = 20;

/// Hard ceilings enforced by the stack manager and the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_stacks: usize,
    pub stack_capacity: usize,
    pub max_program_size: usize,
    pub max_labels: usize,
    pub max_stack_name: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_stacks: MAX_STACKS,
            stack_capacity: STACK_CAPACITY,
            max_program_size: MAX_PROGRAM_SIZE,
            max_labels: MAX_LABELS,
            max_stack_name: MAX_STACK_NAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    /// Entries kept in the REPL history file
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            history_size: 1000,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> VmResult<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| VmError::io(format!("Invalid {}: {}", CONFIG_FILE, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> VmResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| VmError::io(format!("Error reading '{}': {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Load bluestack.json from `start` or the nearest parent that has one
    pub fn discover(start: &Path) -> VmResult<Option<Self>> {
        match find_config_file(start) {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }

    fn validate(&self) -> VmResult<()> {
        let limits = &self.limits;
        if limits.max_stacks == 0 {
            return Err(VmError::io("limits.max_stacks must be at least 1"));
        }
        if limits.max_stack_name == 0 {
            return Err(VmError::io("limits.max_stack_name must be at least 1"));
        }
        Ok(())
    }
}

fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
