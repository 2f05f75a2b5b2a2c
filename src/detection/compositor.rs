use rayon::prelude::*;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::config::SubtractConfig;
use crate::error::{CoinError, Result};

/// Background subtraction.
///
/// Every pixel of `foreground` whose three color channels are all above
/// `config.white_threshold` is overwritten with the matching pixel of
/// `background`. Both buffers must share dimensions and channel order; the
/// check happens before any pixel is written.
pub fn subtract(
    foreground: &mut PixelBuffer,
    background: &PixelBuffer,
    config: &SubtractConfig,
) -> Result<()> {
    if !foreground.same_dimensions(background) {
        return Err(CoinError::DimensionMismatch {
            operation: "subtract",
            expected: foreground.dimensions(),
            actual: background.dimensions(),
        });
    }
    if foreground.order() != background.order() {
        return Err(CoinError::InvalidGeometry {
            operation: "subtract",
            reason: format!(
                "channel order {:?} does not match background {:?}",
                foreground.order(),
                background.order()
            ),
        });
    }

    let order = foreground.order();
    let bpp = foreground.bytes_per_pixel();
    let limit = config.white_threshold;
    let channels = [order.red(), order.green(), order.blue()];

    foreground
        .par_rows_mut()
        .zip(background.par_rows())
        .for_each(|(row, reference)| {
            for (pixel, source) in row.chunks_exact_mut(bpp).zip(reference.chunks_exact(bpp)) {
                if channels.iter().all(|&c| pixel[c] > limit) {
                    for &c in &channels {
                        pixel[c] = source[c];
                    }
                }
            }
        });

    debug!(white_threshold = limit, "subtract");
    Ok(())
}
