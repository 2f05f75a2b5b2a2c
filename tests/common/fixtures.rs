use coinslips::{ChannelOrder, Color, PixelBuffer};

/// Solid white RGB buffer
pub fn white_canvas(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::filled(width, height, ChannelOrder::Rgb, Color::WHITE)
        .expect("Failed to allocate test buffer")
}

/// Paint a `side` x `side` square with its top-left corner at (x0, y0)
pub fn draw_square(buffer: &mut PixelBuffer, x0: u32, y0: u32, side: u32, color: Color) {
    draw_rect(buffer, x0, y0, side, side, color);
}

pub fn draw_rect(buffer: &mut PixelBuffer, x0: u32, y0: u32, w: u32, h: u32, color: Color) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            buffer.set_color(x, y, color);
        }
    }
}

/// Paint every pixel within `radius` of (cx, cy)
pub fn draw_disk(buffer: &mut PixelBuffer, cx: i32, cy: i32, radius: i32, color: Color) {
    for y in 0..buffer.height() as i32 {
        for x in 0..buffer.width() as i32 {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius {
                buffer.set_color(x as u32, y as u32, color);
            }
        }
    }
}

/// 100x60 white buffer with two black disks of radius 10
pub fn two_disks() -> PixelBuffer {
    let mut buffer = white_canvas(100, 60);
    draw_disk(&mut buffer, 25, 30, 10, Color::BLACK);
    draw_disk(&mut buffer, 75, 30, 10, Color::BLACK);
    buffer
}

/// Deterministic buffer exercising every channel value
pub fn pattern(width: u32, height: u32, order: ChannelOrder) -> PixelBuffer {
    let mut buffer =
        PixelBuffer::new(width, height, order).expect("Failed to allocate test buffer");
    for y in 0..height {
        for x in 0..width {
            let pixel = buffer.at_mut(x, y);
            for (c, value) in pixel.iter_mut().enumerate() {
                *value = ((x * 37 + y * 11 + c as u32 * 101) % 256) as u8;
            }
        }
    }
    buffer
}

/// Coordinates of every pixel whose color channels are all zero
pub fn black_pixels(buffer: &PixelBuffer) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if buffer.color_at(x, y).is_black() {
                out.push((x, y));
            }
        }
    }
    out
}

pub fn white_pixels(buffer: &PixelBuffer) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if buffer.color_at(x, y).is_white() {
                out.push((x, y));
            }
        }
    }
    out
}
