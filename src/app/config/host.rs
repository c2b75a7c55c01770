use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HostConfig {
    /// Frames rendered by the headless loop
    #[serde(default = "HostConfig::default_frames")]
    pub frames: u32,
    /// Advance the selection every N frames (0 keeps it still)
    #[serde(default = "HostConfig::default_select_every")]
    pub select_every: u32,
}

impl HostConfig {
    fn default_frames() -> u32 {
        600
    }

    fn default_select_every() -> u32 {
        30
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frames: Self::default_frames(),
            select_every: Self::default_select_every(),
        }
    }
}
