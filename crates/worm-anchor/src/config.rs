//! Anchoring configuration

use serde::{Deserialize, Serialize};

/// Limits applied while encoding positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorConfig {
    /// Max chars kept from the selected text
    pub max_quote_chars: usize,
    /// Max chars of prefix and of suffix context
    pub max_context_chars: usize,
    /// Max chars per captured attribute value
    pub max_attr_chars: usize,
    /// Max chars kept from a `data:` image source
    pub max_data_src_chars: usize,
    /// Visible text a block ancestor needs to serve as coarse anchor
    pub coarse_min_text_chars: usize,
    /// How many levels to climb looking for that ancestor
    pub coarse_max_climb: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            max_quote_chars: 1024,
            max_context_chars: 64,
            max_attr_chars: 200,
            max_data_src_chars: 256,
            coarse_min_text_chars: 64,
            coarse_max_climb: 4,
        }
    }
}
