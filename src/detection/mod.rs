pub mod blobs;
pub mod compositor;
pub mod contours;
pub mod fill;
pub mod filters;
pub mod morphology;
pub mod steps;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::buffer::PixelBuffer;
use crate::config::PipelineConfig;
use crate::pipeline::{Pipeline, PipelineData};
use steps::*;

/// Build the mask-producing part of the standard pipeline:
/// grayscale, contrast, threshold, snapshot, invert, flood fill, subtract,
/// dilate, erode, erode, dilate
pub fn build_mask_pipeline(config: &PipelineConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(ContrastStep { factor: config.contrast }))
        .add_step(Arc::new(ThresholdStep { threshold: config.threshold }))
        .add_step(Arc::new(SnapshotStep))
        .add_step(Arc::new(InvertStep))
        .add_step(Arc::new(FloodFillStep {
            seed: config.seed,
            target: config.target,
            fill: config.fill,
        }))
        .add_step(Arc::new(SubtractStep { config: config.subtract }))
        // Closing
        .add_step(Arc::new(DilateStep))
        .add_step(Arc::new(ErodeStep))
        // Opening
        .add_step(Arc::new(ErodeStep))
        .add_step(Arc::new(DilateStep))
}

/// Build the standard coin counting pipeline.
/// With `config.outline` the counted mask is replaced by its boundary for display.
pub fn build_standard_pipeline(config: &PipelineConfig) -> Pipeline {
    let pipeline = build_mask_pipeline(config).add_step(Arc::new(CountBlobsStep {
        config: config.count.clone(),
    }));

    if config.outline {
        pipeline.add_step(Arc::new(ContourStep))
    } else {
        pipeline
    }
}

/// Convenience wrapper running the standard pipeline
pub struct CoinCounter {
    pub config: PipelineConfig,
}

impl CoinCounter {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline on a copy of `input`
    pub fn count(&self, input: &PixelBuffer) -> Result<PipelineData> {
        build_standard_pipeline(&self.config).run(input.clone())
    }

    /// Produce the cleaned binary mask without counting
    pub fn mask(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        Ok(build_mask_pipeline(&self.config).run(input.clone())?.image)
    }

    /// Count at each threshold, always starting from the untouched input
    pub fn sweep(
        &self,
        input: &PixelBuffer,
        thresholds: impl IntoIterator<Item = u8>,
    ) -> Result<Vec<(u8, usize)>> {
        let mut counts = Vec::new();
        for threshold in thresholds {
            let config = PipelineConfig {
                threshold,
                outline: false,
                ..self.config.clone()
            };
            let data = build_standard_pipeline(&config).run(input.clone())?;
            let count = data.blob_count().unwrap_or(0);
            info!(threshold, count, "sweep");
            counts.push((threshold, count));
        }
        Ok(counts)
    }
}

impl Default for CoinCounter {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
