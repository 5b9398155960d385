use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_enabled")]
    pub bandcamp: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            bandcamp: default_enabled(),
        }
    }
}
