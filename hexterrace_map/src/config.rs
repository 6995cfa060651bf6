// Map configuration.
//
// Geometry is compile-time (see `metrics.rs`); configuration covers only
// what legitimately varies between maps: the chunk allocation, the color
// cells start with, and the noise parameters behind perturbation. Configs
// are plain serde values so hosts can ship them as JSON.

use crate::types::Color;
use hexterrace_noise::NoiseConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to build a `HexGrid`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Chunks along X. The cell count is the chunk count times the fixed
    /// chunk size, so maps always come in whole chunks.
    pub chunk_count_x: u32,
    /// Chunks along Z.
    pub chunk_count_z: u32,
    /// Color every cell starts with.
    pub default_color: Color,
    pub noise: NoiseConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            chunk_count_x: 4,
            chunk_count_z: 3,
            default_color: Color::WHITE,
            noise: NoiseConfig::default(),
        }
    }
}

impl MapConfig {
    /// Smallest buildable map. Mostly useful in tests and benchmarks.
    pub fn single_chunk() -> Self {
        Self {
            chunk_count_x: 1,
            chunk_count_z: 1,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = MapConfig::from_json_str(r#"{ "chunk_count_x": 2 }"#).unwrap();
        assert_eq!(config.chunk_count_x, 2);
        assert_eq!(config.chunk_count_z, 3);
        assert_eq!(config.default_color, Color::WHITE);
        assert_eq!(config.noise.seed, NoiseConfig::default().seed);
    }

    #[test]
    fn full_config_roundtrips() {
        let config = MapConfig {
            chunk_count_x: 2,
            chunk_count_z: 5,
            default_color: Color::GREEN,
            noise: NoiseConfig {
                seed: 99,
                ..NoiseConfig::default()
            },
        };
        let text = serde_json::to_string(&config).unwrap();
        let back = MapConfig::from_json_str(&text).unwrap();
        assert_eq!(back.chunk_count_x, 2);
        assert_eq!(back.chunk_count_z, 5);
        assert_eq!(back.default_color, Color::GREEN);
        assert_eq!(back.noise.seed, 99);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MapConfig::from_json_str("{ not json").is_err());
    }
}
