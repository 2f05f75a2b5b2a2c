use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer::{Color, Point};
use crate::error::Result;

/// Blob counting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    /// Components with this many pixels or fewer are treated as noise
    pub min_blob_size: usize,
    /// Label anchor = centroid - offset
    pub label_offset: (i32, i32),
    pub label_prefix: String,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            min_blob_size: 60,
            label_offset: (10, 10),
            label_prefix: "Coin".to_string(),
        }
    }
}

/// Background subtraction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtractConfig {
    /// A pixel is replaced when all three color channels are strictly above this
    pub white_threshold: u8,
}

impl Default for SubtractConfig {
    fn default() -> Self {
        Self { white_threshold: 240 }
    }
}

/// Parameters for the standard coin counting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub contrast: f32,
    pub threshold: u8,
    /// Flood fill seed, expected to lie on the background
    pub seed: Point,
    pub target: Color,
    pub fill: Color,
    /// Replace the counted mask with its boundary pixels for display
    pub outline: bool,
    pub subtract: SubtractConfig,
    pub count: CountConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            contrast: 1.5,
            threshold: 200,
            seed: Point::new(0, 0),
            target: Color::BLACK,
            fill: Color::WHITE,
            outline: false,
            subtract: SubtractConfig::default(),
            count: CountConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
