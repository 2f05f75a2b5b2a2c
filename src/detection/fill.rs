use tracing::{debug, trace};

use crate::buffer::{Color, PixelBuffer, Point};
use crate::error::{CoinError, Result};

/// Colors that would be stored identically in a buffer of this layout
fn indistinguishable(a: Color, b: Color, has_alpha: bool) -> bool {
    a.r == b.r && a.g == b.g && a.b == b.b && (!has_alpha || a.a == b.a)
}

/// 4-connected flood fill replacing `target` with `fill`, starting at `seed`.
///
/// A seed outside the buffer is rejected before anything is written. When
/// `target` and `fill` are the same color in this buffer's layout, or the seed
/// does not hold `target`, the buffer is left as is.
///
/// Uses an explicit stack. A pixel is recolored as it is pushed, so each pixel
/// of the region enters the stack exactly once.
pub fn flood_fill(buffer: &mut PixelBuffer, seed: Point, target: Color, fill: Color) -> Result<()> {
    let (width, height) = buffer.dimensions();
    if !buffer.contains(seed.x as i64, seed.y as i64) {
        return Err(CoinError::SeedOutOfBounds {
            operation: "flood_fill",
            x: seed.x as i64,
            y: seed.y as i64,
            width,
            height,
        });
    }

    let order = buffer.order();
    if indistinguishable(target, fill, order.has_alpha()) {
        trace!("flood fill target equals fill color, nothing to do");
        return Ok(());
    }

    let (sx, sy) = (seed.x as u32, seed.y as u32);
    if !target.matches(buffer.at(sx, sy), order) {
        trace!(x = sx, y = sy, "seed does not hold the target color");
        return Ok(());
    }

    let mut filled = 0usize;
    let mut stack = vec![(sx, sy)];
    buffer.set_color(sx, sy, fill);

    while let Some((x, y)) = stack.pop() {
        filled += 1;

        let mut visit = |nx: u32, ny: u32, stack: &mut Vec<(u32, u32)>| {
            if target.matches(buffer.at(nx, ny), order) {
                buffer.set_color(nx, ny, fill);
                stack.push((nx, ny));
            }
        };

        if x > 0 {
            visit(x - 1, y, &mut stack);
        }
        if x + 1 < width {
            visit(x + 1, y, &mut stack);
        }
        if y > 0 {
            visit(x, y - 1, &mut stack);
        }
        if y + 1 < height {
            visit(x, y + 1, &mut stack);
        }
    }

    debug!(seed_x = sx, seed_y = sy, filled, "flood fill");
    Ok(())
}
