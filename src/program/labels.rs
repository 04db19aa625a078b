// Label name -> token index

use rustc_hash::FxHashMap;

use crate::config::MAX_LABELS;
use crate::error::{VmError, VmResult};

#[derive(Debug, Clone)]
pub struct LabelTable {
    addresses: FxHashMap<String, usize>,
    max_labels: usize,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::with_limit(MAX_LABELS)
    }

    pub fn with_limit(max_labels: usize) -> Self {
        Self {
            addresses: FxHashMap::default(),
            max_labels,
        }
    }

    /// Bind `name` to the token index that follows its declaration
    pub fn declare(&mut self, name: &str, address: usize) -> VmResult<()> {
        if self.addresses.contains_key(name) {
            return Err(VmError::duplicate_label(name));
        }
        if self.addresses.len() >= self.max_labels {
            return Err(VmError::capacity_exceeded(format!(
                "Maximum number of labels reached ({})",
                self.max_labels
            )));
        }
        self.addresses.insert(name.to_string(), address);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.addresses.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Labels bound to `address`, sorted by name
    pub fn names_at(&self, address: usize) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .addresses
            .iter()
            .filter(|(_, &addr)| addr == address)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}
