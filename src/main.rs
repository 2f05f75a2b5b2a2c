use clap::Parser;
use image::ImageReader;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use coinslips::{
    Blob, CoinCounter, Label, MarkerOverlay, PipelineConfig, PixelBuffer, build_standard_pipeline,
};

/// Machine-readable result for `--json`
#[derive(Serialize)]
struct Summary<'a> {
    count: usize,
    blobs: &'a [Blob],
    labels: &'a [Label],
}

/// Inclusive threshold range for `--sweep`
#[derive(Debug, Clone, Copy)]
struct SweepRange {
    start: u8,
    end: u8,
    step: u8,
}

impl SweepRange {
    fn thresholds(self) -> impl Iterator<Item = u8> {
        (self.start..=self.end).step_by(self.step as usize)
    }
}

fn parse_sweep(s: &str) -> Result<SweepRange, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [start, end, step] = parts.as_slice() else {
        return Err(format!("expected START:END:STEP, got '{}'", s));
    };
    let parse = |v: &str| v.parse::<u8>().map_err(|e| format!("'{}': {}", v, e));
    let range = SweepRange {
        start: parse(start)?,
        end: parse(end)?,
        step: parse(step)?,
    };
    if range.step == 0 || range.start > range.end {
        return Err(format!("empty sweep range '{}'", s));
    }
    Ok(range)
}

#[derive(Parser)]
#[command(name = "coinslips")]
#[command(about = "Count coins on a plain background")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with pipeline parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Binarization threshold (0-255)
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Contrast factor applied before thresholding
    #[arg(long)]
    contrast: Option<f32>,

    /// Blobs with this many pixels or fewer are ignored
    #[arg(long)]
    min_blob_size: Option<usize>,

    /// Brightness above which subtraction restores the snapshot
    #[arg(long)]
    white_threshold: Option<u8>,

    /// Write the boundary image instead of the filled mask
    #[arg(long)]
    outline: bool,

    /// Write the processed mask, with label markers, to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save every intermediate stage to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Count at every threshold in START:END:STEP and print a table
    #[arg(long, value_name = "START:END:STEP", value_parser = parse_sweep)]
    sweep: Option<SweepRange>,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        if let Some(min_blob_size) = self.min_blob_size {
            config.count.min_blob_size = min_blob_size;
        }
        if let Some(white_threshold) = self.white_threshold {
            config.subtract.white_threshold = white_threshold;
        }
        config.outline |= self.outline;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.pipeline_config()?;

    tracing::info!(path = ?args.image_path, "loading image");
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    let input = PixelBuffer::from_dynamic(&img)?;
    tracing::info!(width = input.width(), height = input.height(), "image loaded");

    if let Some(range) = args.sweep {
        let counter = CoinCounter::new(config);
        println!("threshold\tcoins");
        for (threshold, count) in counter.sweep(&input, range.thresholds())? {
            println!("{}\t{}", threshold, count);
        }
        return Ok(());
    }

    let mut pipeline = build_standard_pipeline(&config);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let result = pipeline.run(input)?;
    let count = result.blob_count().unwrap_or(0);

    if args.json {
        let summary = Summary {
            count,
            blobs: &result.blobs,
            labels: &result.labels,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== Coin Count ===");
        println!("Total coins detected: {}", count);
        if args.verbose {
            for (label, blob) in result.labels.iter().zip(&result.blobs) {
                println!(
                    "  {} at ({}, {}) - {} pixels, fill {:.2}, aspect {:.2}",
                    label.text,
                    blob.centroid_x,
                    blob.centroid_y,
                    blob.pixel_count,
                    blob.fill_ratio(),
                    blob.aspect_ratio()
                );
            }
        }
    }

    if let Some(output) = args.output {
        let mut canvas = result.image.to_rgb_image();
        MarkerOverlay::from_labels(&result.labels).render(&mut canvas);
        canvas
            .save(&output)
            .map_err(|e| anyhow::anyhow!("Failed to save output image: {}", e))?;
        if !args.json {
            println!("Saved annotated mask to {}", output.display());
        }
    }

    Ok(())
}
