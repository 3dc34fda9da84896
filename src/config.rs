use serde::{Deserialize, Serialize};

use crate::elias::EliasFamily;

/// Codec settings, loadable from the embedding application's own config.
///
/// Missing fields fall back to the defaults: gamma codes with signed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub family: EliasFamily,
    pub negative_allowed: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            family: EliasFamily::Gamma,
            negative_allowed: true,
        }
    }
}
