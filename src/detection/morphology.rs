//! 3x3 binary morphology seeded only from black pixels.
//!
//! Each pass reads neighborhoods from an immutable snapshot and writes into the
//! live buffer, so a pass never sees its own output. Only interior pixels that
//! are currently pure black are rewritten; white pixels are never touched,
//! even next to black ones. As a consequence `dilate` (channel max) grows
//! white regions into black ones, while `erode` (channel min) always finds
//! the candidate pixel's own zero and leaves binary buffers unchanged.
//! Border rows and columns are never modified.

use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::error::{CoinError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    Dilate,
    Erode,
}

fn is_black(pixel: &[u8], order: ChannelOrder) -> bool {
    pixel[order.red()] == 0 && pixel[order.green()] == 0 && pixel[order.blue()] == 0
}

/// Run one pass reading from `source` and writing to `target`.
///
/// `source` and `target` must have the same dimensions and channel order,
/// checked before any write; `target`'s own pixels decide which positions
/// are candidates.
pub fn apply(source: &PixelBuffer, target: &mut PixelBuffer, op: MorphOp) -> Result<()> {
    if !source.same_dimensions(target) {
        return Err(CoinError::DimensionMismatch {
            operation: "morphology",
            expected: target.dimensions(),
            actual: source.dimensions(),
        });
    }
    if source.order() != target.order() {
        return Err(CoinError::InvalidGeometry {
            operation: "morphology",
            reason: format!(
                "snapshot channel order {:?} does not match target {:?}",
                source.order(),
                target.order()
            ),
        });
    }
    pass(source, target, op);
    Ok(())
}

fn pass(source: &PixelBuffer, target: &mut PixelBuffer, op: MorphOp) {
    let (width, height) = target.dimensions();
    if width < 3 || height < 3 {
        return;
    }

    let order = target.order();
    let bpp = target.bytes_per_pixel();
    let channels = [order.red(), order.green(), order.blue()];

    target
        .par_rows_mut()
        .enumerate()
        .filter(|(y, _)| *y > 0 && *y + 1 < height as usize)
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in 1..width - 1 {
                let pixel = &mut row[x as usize * bpp..(x as usize + 1) * bpp];
                if !is_black(pixel, order) {
                    continue;
                }

                let mut acc = match op {
                    MorphOp::Dilate => [0u8; 3],
                    MorphOp::Erode => [255u8; 3],
                };
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        let neighbor = source.at(nx, ny);
                        for (slot, &c) in acc.iter_mut().zip(&channels) {
                            *slot = match op {
                                MorphOp::Dilate => (*slot).max(neighbor[c]),
                                MorphOp::Erode => (*slot).min(neighbor[c]),
                            };
                        }
                    }
                }

                for (value, &c) in acc.iter().zip(&channels) {
                    pixel[c] = *value;
                }
            }
        });
}

/// Snapshot the buffer and run one pass in place
fn apply_in_place(buffer: &mut PixelBuffer, op: MorphOp) {
    let snapshot = buffer.clone();
    pass(&snapshot, buffer, op);
    debug!(?op, width = buffer.width(), height = buffer.height(), "morphology pass");
}

/// Per-channel 3x3 maximum over black interior pixels
pub fn dilate(buffer: &mut PixelBuffer) {
    apply_in_place(buffer, MorphOp::Dilate);
}

/// Per-channel 3x3 minimum over black interior pixels
pub fn erode(buffer: &mut PixelBuffer) {
    apply_in_place(buffer, MorphOp::Erode);
}

/// Dilate then erode
pub fn close(buffer: &mut PixelBuffer) {
    dilate(buffer);
    erode(buffer);
}

/// Erode then dilate
pub fn open(buffer: &mut PixelBuffer) {
    erode(buffer);
    dilate(buffer);
}
