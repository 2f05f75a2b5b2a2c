//! Per-pixel transforms applied in place.
//!
//! Only the three color channels are touched; alpha, when present, passes
//! through unchanged. Rows are processed in parallel since no pixel depends on
//! another.

use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::error::{CoinError, Result};

const RED_WEIGHT: f32 = 0.3;
const GREEN_WEIGHT: f32 = 0.59;
const BLUE_WEIGHT: f32 = 0.11;

/// Weighted luminance of one pixel, rounded to the nearest byte.
pub fn luma(pixel: &[u8], order: ChannelOrder) -> u8 {
    let value = RED_WEIGHT * pixel[order.red()] as f32
        + GREEN_WEIGHT * pixel[order.green()] as f32
        + BLUE_WEIGHT * pixel[order.blue()] as f32;
    value.round().clamp(0.0, 255.0) as u8
}

fn set_color_channels(pixel: &mut [u8], order: ChannelOrder, value: u8) {
    pixel[order.red()] = value;
    pixel[order.green()] = value;
    pixel[order.blue()] = value;
}

/// Apply `f` to every pixel of the buffer, one row per task.
fn for_each_pixel<F>(buffer: &mut PixelBuffer, f: F)
where
    F: Fn(&mut [u8], ChannelOrder) + Sync,
{
    let order = buffer.order();
    let bpp = buffer.bytes_per_pixel();
    buffer.par_rows_mut().for_each(|row| {
        for pixel in row.chunks_exact_mut(bpp) {
            f(pixel, order);
        }
    });
}

/// Replace the color channels with their weighted luminance
pub fn grayscale(buffer: &mut PixelBuffer) {
    debug!(width = buffer.width(), height = buffer.height(), "grayscale");
    for_each_pixel(buffer, |pixel, order| {
        let gray = luma(pixel, order);
        set_color_channels(pixel, order, gray);
    });
}

/// Stretch every color channel around mid-gray: `factor * (v - 128) + 128`, saturating.
///
/// `factor` must be a finite positive number; values below 1 flatten the
/// image, values above 1 push it towards black and white.
pub fn contrast(buffer: &mut PixelBuffer, factor: f32) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(CoinError::InvalidParameter {
            operation: "contrast",
            reason: format!("factor must be finite and positive, got {}", factor),
        });
    }

    debug!(factor, "contrast");
    for_each_pixel(buffer, |pixel, order| {
        for channel in [order.red(), order.green(), order.blue()] {
            let stretched = factor * (pixel[channel] as f32 - 128.0) + 128.0;
            pixel[channel] = stretched.clamp(0.0, 255.0) as u8;
        }
    });
    Ok(())
}

/// Binarize: white where luminance >= `threshold`, black elsewhere
pub fn threshold(buffer: &mut PixelBuffer, threshold: u8) {
    debug!(threshold, "threshold");
    for_each_pixel(buffer, |pixel, order| {
        let value = if luma(pixel, order) >= threshold { 255 } else { 0 };
        set_color_channels(pixel, order, value);
    });
}

/// `255 - v` on every color channel
pub fn invert(buffer: &mut PixelBuffer) {
    debug!(width = buffer.width(), height = buffer.height(), "invert");
    for_each_pixel(buffer, |pixel, order| {
        for channel in [order.red(), order.green(), order.blue()] {
            pixel[channel] = 255 - pixel[channel];
        }
    });
}
