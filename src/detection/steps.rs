use std::sync::Arc;

use anyhow::{Context, Result};

use crate::annotate::LabelCollector;
use crate::buffer::{Color, Point};
use crate::config::{CountConfig, SubtractConfig};
use crate::detection::{blobs, compositor, contours, fill, filters, morphology};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        filters::grayscale(&mut data.image);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Stretch contrast around mid-gray
pub struct ContrastStep {
    pub factor: f32,
}

impl PipelineStep for ContrastStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        filters::contrast(&mut data.image, self.factor)?;
        Ok(data.with_metadata("contrast", MetadataValue::Float(self.factor)))
    }

    fn name(&self) -> &str {
        "Contrast"
    }
}

/// Binarize against a luminance threshold
pub struct ThresholdStep {
    pub threshold: u8,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        filters::threshold(&mut data.image, self.threshold);
        Ok(data.with_metadata("threshold", MetadataValue::Int(self.threshold as i64)))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Retain a copy of the current buffer for a later subtraction
pub struct SnapshotStep;

impl PipelineStep for SnapshotStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.snapshot = Some(Arc::new(data.image.clone()));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Snapshot"
    }
}

pub struct InvertStep;

impl PipelineStep for InvertStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        filters::invert(&mut data.image);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Invert"
    }
}

/// Flood the background region reachable from `seed`
pub struct FloodFillStep {
    pub seed: Point,
    pub target: Color,
    pub fill: Color,
}

impl PipelineStep for FloodFillStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        fill::flood_fill(&mut data.image, self.seed, self.target, self.fill)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Flood Fill"
    }
}

/// Restore the snapshot wherever the working buffer is near white
pub struct SubtractStep {
    pub config: SubtractConfig,
}

impl PipelineStep for SubtractStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let snapshot = data
            .snapshot
            .take()
            .context("Subtraction needs a snapshot; add a SnapshotStep before it")?;
        compositor::subtract(&mut data.image, &snapshot, &self.config)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Subtract"
    }
}

pub struct DilateStep;

impl PipelineStep for DilateStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        morphology::dilate(&mut data.image);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Dilate"
    }
}

pub struct ErodeStep;

impl PipelineStep for ErodeStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        morphology::erode(&mut data.image);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Erode"
    }
}

/// Replace the mask with its boundary pixels
pub struct ContourStep;

impl PipelineStep for ContourStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.image = contours::contour(&data.image)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Contour"
    }
}

/// Count the black blobs and record their labels
pub struct CountBlobsStep {
    pub config: CountConfig,
}

impl PipelineStep for CountBlobsStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mut collector = LabelCollector::new();
        let counted = blobs::count_blobs(&data.image, &self.config, &mut collector);

        data.blobs = counted.blobs;
        data.labels = collector.into_labels();
        Ok(data
            .with_metadata("blob_count", MetadataValue::Int(counted.count as i64))
            .with_metadata("rejected_blobs", MetadataValue::Int(counted.rejected as i64)))
    }

    fn name(&self) -> &str {
        "Count Blobs"
    }
}
