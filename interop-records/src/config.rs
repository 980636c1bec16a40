//! Layout comparison configuration
//!
//! Controls how strictly a peer declaration is held to our layout. The
//! defaults implement the structural contract: kinds, offsets and size must
//! agree, names may differ.

use serde::{Deserialize, Serialize};

/// Configuration for [`compare_layouts`](crate::compare_layouts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Report positional fields whose names differ (default: false)
    #[serde(default)]
    pub match_field_names: bool,

    /// Report a differing total record size (default: true)
    #[serde(default = "default_true")]
    pub check_record_size: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            match_field_names: false,
            check_record_size: true,
        }
    }
}

impl CompareConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: require field names to match by position
    pub fn with_field_names(mut self, enabled: bool) -> Self {
        self.match_field_names = enabled;
        self
    }

    /// Builder method: enable or disable the record size check
    pub fn with_record_size(mut self, enabled: bool) -> Self {
        self.check_record_size = enabled;
        self
    }
}
