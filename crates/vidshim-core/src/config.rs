//! Shim configuration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables of the HTML5 backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// A pause older than this forces a source reload on resume (ms)
    pub stale_pause_ms: f64,
    /// Android releases below this skip native HLS
    pub native_hls_min_android: f64,
    /// Query parameter carrying the live start offset
    pub start_offset_param: String,
    /// Reject seeks on MP3 sources
    pub block_mp3_seek: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            stale_pause_ms: 5000.0,
            native_hls_min_android: 7.0,
            start_offset_param: "startunix".to_string(),
            block_mp3_seek: true,
        }
    }
}

impl ShimConfig {
    /// Parse a JSON config, missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.stale_pause_ms.is_finite() || self.stale_pause_ms < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "stale_pause_ms must be a non-negative number, got {}",
                self.stale_pause_ms
            )));
        }
        if self.start_offset_param.is_empty() {
            return Err(Error::InvalidConfig("start_offset_param is empty".to_string()));
        }
        Ok(())
    }
}
