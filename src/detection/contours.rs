use tracing::debug;

use crate::buffer::{Color, PixelBuffer};
use crate::error::Result;

/// Color written for boundary pixels
pub const HIGHLIGHT: Color = Color::RED;

/// Extract the boundary of the black regions.
///
/// Returns a new buffer of the same size and layout, all black except for
/// [`HIGHLIGHT`] at every interior black pixel that has at least one pure white
/// pixel among its 8 neighbors. The source is not modified and its border
/// pixels are never classified.
pub fn contour(source: &PixelBuffer) -> Result<PixelBuffer> {
    let (width, height) = source.dimensions();
    let order = source.order();
    let mut output = PixelBuffer::filled(width, height, order, Color::BLACK)?;

    let mut boundary = 0usize;
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if !source.color_at(x, y).is_black() {
                continue;
            }
            if touches_white(source, x, y) {
                output.set_color(x, y, HIGHLIGHT);
                boundary += 1;
            }
        }
    }

    debug!(boundary, "contour");
    Ok(output)
}

fn touches_white(source: &PixelBuffer, x: u32, y: u32) -> bool {
    (y - 1..=y + 1).any(|ny| {
        (x - 1..=x + 1).any(|nx| (nx, ny) != (x, y) && source.color_at(nx, ny).is_white())
    })
}
