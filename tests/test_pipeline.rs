//! Integration tests for the composed coin counting pipeline.
//!
//! Tests cover:
//! - End-to-end counting on synthetic coins
//! - Highlight filling, noise removal, channel layouts and padded strides
//! - Partial runs and debug stage dumps
//! - Configuration files and threshold sweeps

mod common;

use std::sync::Arc;

use coinslips::detection::steps::SubtractStep;
use coinslips::{MarkerOverlay, Pipeline, build_mask_pipeline, build_standard_pipeline};
use common::*;
use image::Rgb;

#[test]
fn test_two_disks_count_two() -> anyhow::Result<()> {
    let result = build_standard_pipeline(&PipelineConfig::default()).run(two_disks())?;

    assert_eq!(result.blob_count(), Some(2));
    assert_eq!(result.labels.len(), 2);
    assert_eq!(result.labels[0].text, "Coin 1");
    assert_eq!(result.labels[1].text, "Coin 2");

    // Each coin is found near its center
    let (x0, y0) = result.blobs[0].centroid();
    let (x1, y1) = result.blobs[1].centroid();
    assert!((x0 - 25).abs() <= 1 && (y0 - 30).abs() <= 1);
    assert!((x1 - 75).abs() <= 1 && (y1 - 30).abs() <= 1);
    Ok(())
}

#[test]
fn test_coin_highlights_are_filled() -> anyhow::Result<()> {
    let mut input = white_canvas(60, 60);
    draw_disk(&mut input, 30, 30, 14, Color::rgb(90, 60, 20));
    draw_disk(&mut input, 30, 30, 3, Color::WHITE);

    let mask = CoinCounter::default().mask(&input)?;

    assert!(mask.color_at(30, 30).is_black(), "highlight inside a coin should become foreground");
    assert!(mask.color_at(2, 2).is_white());

    let result = CoinCounter::default().count(&input)?;
    assert_eq!(result.blob_count(), Some(1));
    Ok(())
}

#[test]
fn test_small_specks_are_ignored() -> anyhow::Result<()> {
    let mut input = two_disks();
    draw_square(&mut input, 50, 5, 5, Color::BLACK);
    draw_square(&mut input, 5, 50, 3, Color::BLACK);

    let result = CoinCounter::default().count(&input)?;
    assert_eq!(result.blob_count(), Some(2));
    Ok(())
}

#[test]
fn test_rgba_and_padded_inputs() -> anyhow::Result<()> {
    let rgb = two_disks();

    let mut rgba = PixelBuffer::filled(100, 60, ChannelOrder::Bgra, Color::WHITE)?;
    for y in 0..60 {
        for x in 0..100 {
            rgba.set_color(x, y, rgb.color_at(x, y));
        }
    }
    let padded = rgb.with_stride(100 * 3 + 7)?;

    let counter = CoinCounter::default();
    assert_eq!(counter.count(&rgba)?.blob_count(), Some(2));
    assert_eq!(counter.count(&padded)?.blob_count(), Some(2));
    Ok(())
}

#[test]
fn test_counter_does_not_mutate_input() -> anyhow::Result<()> {
    let input = two_disks();
    let original = input.clone();
    CoinCounter::default().count(&input)?;
    assert_eq!(input, original);
    Ok(())
}

#[test]
fn test_outline_replaces_image_but_keeps_count() -> anyhow::Result<()> {
    let config = PipelineConfig {
        outline: true,
        ..PipelineConfig::default()
    };
    let result = build_standard_pipeline(&config).run(two_disks())?;

    assert_eq!(result.blob_count(), Some(2));
    assert_eq!(result.image.color_at(0, 0), Color::BLACK);
    let (cx, cy) = result.blobs[0].centroid();
    assert_eq!(result.image.color_at(cx as u32, cy as u32), Color::BLACK);
    assert!(white_pixels(&result.image).is_empty());
    Ok(())
}

#[test]
fn test_subtract_without_snapshot_fails() {
    let pipeline = Pipeline::new().add_step(Arc::new(SubtractStep {
        config: SubtractConfig::default(),
    }));

    let err = pipeline.run(two_disks()).err().expect("subtract needs a snapshot");
    let message = format!("{:#}", err);
    assert!(message.contains("snapshot"), "got: {}", message);
    assert!(message.contains("Subtract"), "got: {}", message);
}

#[test]
fn test_invalid_seed_fails_the_pipeline() {
    let config = PipelineConfig {
        seed: Point::new(500, 0),
        ..PipelineConfig::default()
    };
    let err = build_standard_pipeline(&config).run(two_disks()).err().expect("seed is outside");
    assert!(format!("{:#}", err).contains("outside"));
}

#[test]
fn test_run_partial_stops_early() -> anyhow::Result<()> {
    let pipeline = build_standard_pipeline(&PipelineConfig::default());
    let data = pipeline.run_partial(two_disks(), 3)?;

    assert_eq!(data.get_float("contrast"), Some(1.5));
    assert_eq!(data.get_int("threshold"), Some(200));
    assert_eq!(data.get_float("threshold"), None);
    assert_eq!(data.blob_count(), None);
    assert!(data.snapshot.is_none());
    Ok(())
}

#[test]
fn test_standard_pipeline_sequence() {
    let names = build_standard_pipeline(&PipelineConfig::default())
        .step_names()
        .join(", ");
    assert_eq!(
        names,
        "Grayscale Conversion, Contrast, Threshold, Snapshot, Invert, Flood Fill, Subtract, \
         Dilate, Erode, Erode, Dilate, Count Blobs"
    );
    assert_eq!(build_mask_pipeline(&PipelineConfig::default()).len(), 11);
}

#[test]
fn test_debug_mode_saves_each_stage() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("stages");

    let pipeline =
        build_standard_pipeline(&PipelineConfig::default()).with_debug(debug_dir.clone())?;
    pipeline.run(two_disks())?;

    let mut files: Vec<String> = std::fs::read_dir(&debug_dir)?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    files.sort();

    assert_eq!(files.len(), 13);
    assert_eq!(files[0], "00_input.png");
    assert_eq!(files[1], "01_grayscale_conversion.png");
    assert_eq!(files[12], "12_count_blobs.png");
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    let result = Pipeline::new().with_debug(dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_config_from_partial_json() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("coins.json");
    std::fs::write(
        &path,
        r#"{ "threshold": 120, "count": { "min_blob_size": 10 }, "subtract": { "white_threshold": 250 } }"#,
    )?;

    let config = PipelineConfig::from_json_file(&path)?;

    assert_eq!(config.threshold, 120);
    assert_eq!(config.contrast, 1.5);
    assert_eq!(config.count.min_blob_size, 10);
    assert_eq!(config.count.label_prefix, "Coin");
    assert_eq!(config.subtract.white_threshold, 250);
    assert_eq!(config.target, Color::BLACK);
    Ok(())
}

#[test]
fn test_config_rejects_malformed_json() {
    let result = PipelineConfig::from_json_str("{ threshold: }");
    assert!(matches!(result, Err(CoinError::Config(_))));
}

#[test]
fn test_threshold_sweep() -> anyhow::Result<()> {
    let counts = CoinCounter::default().sweep(&two_disks(), [0u8, 128, 200])?;
    assert_eq!(counts, vec![(0, 0), (128, 2), (200, 2)]);
    Ok(())
}

#[test]
fn test_marker_overlay_draws_and_clips() -> anyhow::Result<()> {
    let result = CoinCounter::default().count(&two_disks())?;
    let mut canvas = result.image.to_rgb_image();
    let mut overlay = MarkerOverlay::from_labels(&result.labels);
    // Anchors off the canvas must be clipped, not panic
    coinslips::Annotator::place(&mut overlay, "Coin 3", -50, -50);

    overlay.render(&mut canvas);

    let anchor = &result.labels[0];
    assert_eq!(canvas.get_pixel(anchor.x as u32, anchor.y as u32), &Rgb([255, 0, 0]));
    assert_eq!(overlay.labels().len(), 3);
    Ok(())
}
