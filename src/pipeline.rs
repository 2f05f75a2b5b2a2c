use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::models::{Blob, Label};

/// Data that flows through the pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// The working buffer, mutated by each step
    pub image: PixelBuffer,

    /// The decoded input, untouched
    pub original: Arc<PixelBuffer>,

    /// Copy retained by a snapshot step for later subtraction
    pub snapshot: Option<Arc<PixelBuffer>>,

    /// Accepted blobs, filled in by the counting step
    pub blobs: Vec<Blob>,

    /// One label per accepted blob
    pub labels: Vec<Label>,

    /// Metadata for tracking properties (e.g., "contrast", "blob_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f32),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: PixelBuffer) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            snapshot: None,
            blobs: Vec::new(),
            labels: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Number of coins found, if a counting step has run
    pub fn blob_count(&self) -> Option<usize> {
        self.get_int("blob_count").map(|n| n as usize)
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one PNG per step
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform the data in place and hand it on
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order on the input buffer
    pub fn run(&self, input: PixelBuffer) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting intermediate masks)
    pub fn run_partial(&self, input: PixelBuffer, num_steps: usize) -> Result<PipelineData> {
        if let Some(debug_config) = &self.context.debug {
            save_debug_image(&debug_config.output_dir, "00_input.png", &input)?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let step_name = step.name();
            let started = Instant::now();
            data = step
                .process(data, &self.context)
                .with_context(|| format!("step {} ({}) failed", step_idx + 1, step_name))?;
            debug!(
                step = step_name,
                elapsed_us = started.elapsed().as_micros() as u64,
                "step finished"
            );

            if let Some(debug_config) = &self.context.debug {
                let filename = format!(
                    "{:02}_{}.png",
                    step_idx + 1,
                    step_name.to_lowercase().replace(' ', "_")
                );
                save_debug_image(&debug_config.output_dir, &filename, &data.image)?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn save_debug_image(dir: &Path, filename: &str, buffer: &PixelBuffer) -> Result<()> {
    let output_path = dir.join(filename);
    buffer
        .to_dynamic_image()
        .save(&output_path)
        .with_context(|| format!("Failed to save debug image {}", output_path.display()))?;
    debug!(path = %output_path.display(), "saved debug image");
    Ok(())
}
