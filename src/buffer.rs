//! Stride-aware pixel storage.
//!
//! Every byte offset in the crate is computed here, as
//! `y * stride + x * bytes_per_pixel`. The other modules address pixels
//! through [`PixelBuffer`] and never index the raw bytes themselves.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CoinError, Result};

/// Byte order of the channels inside one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl ChannelOrder {
    /// Bytes per pixel (3 or 4).
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Bgra)
    }

    pub const fn red(self) -> usize {
        match self {
            Self::Rgb | Self::Rgba => 0,
            Self::Bgr | Self::Bgra => 2,
        }
    }

    pub const fn green(self) -> usize {
        1
    }

    pub const fn blue(self) -> usize {
        match self {
            Self::Rgb | Self::Rgba => 2,
            Self::Bgr | Self::Bgra => 0,
        }
    }

    pub const fn alpha(self) -> Option<usize> {
        match self {
            Self::Rgba | Self::Bgra => Some(3),
            Self::Rgb | Self::Bgr => None,
        }
    }
}

/// An 8-bit color, independent of any buffer's channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Read a color out of a single pixel slice.
    /// Pixels without an alpha channel read as opaque.
    pub fn read(pixel: &[u8], order: ChannelOrder) -> Self {
        Self {
            r: pixel[order.red()],
            g: pixel[order.green()],
            b: pixel[order.blue()],
            a: order.alpha().map_or(255, |i| pixel[i]),
        }
    }

    /// Write this color into a single pixel slice.
    /// Alpha is dropped on 3-channel layouts.
    pub fn write(self, pixel: &mut [u8], order: ChannelOrder) {
        pixel[order.red()] = self.r;
        pixel[order.green()] = self.g;
        pixel[order.blue()] = self.b;
        if let Some(i) = order.alpha() {
            pixel[i] = self.a;
        }
    }

    /// All three color channels are 0. Alpha is ignored.
    pub fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// All three color channels are 255. Alpha is ignored.
    pub fn is_white(self) -> bool {
        self.r == 255 && self.g == 255 && self.b == 255
    }

    /// Compare against a pixel. Alpha only participates when the layout has it.
    pub fn matches(self, pixel: &[u8], order: ChannelOrder) -> bool {
        pixel[order.red()] == self.r
            && pixel[order.green()] == self.g
            && pixel[order.blue()] == self.b
            && order.alpha().is_none_or(|i| pixel[i] == self.a)
    }
}

/// Integer pixel coordinate. Signed so callers can express out-of-bounds seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Total byte length of `height` rows of `stride` bytes.
fn byte_len(operation: &'static str, stride: usize, height: u32) -> Result<usize> {
    stride
        .checked_mul(height as usize)
        .ok_or_else(|| CoinError::InvalidGeometry {
            operation,
            reason: format!("{} rows at stride {} overflow the address space", height, stride),
        })
}

/// A rectangular, row-padded, 8-bit pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a tightly packed buffer with every byte zeroed.
    pub fn new(width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        let stride = width as usize * order.channels();
        let len = byte_len("PixelBuffer::new", stride, height)?;
        Self::from_raw(width, height, stride, order, vec![0; len])
    }

    /// Allocate a packed buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, color: Color) -> Result<Self> {
        let mut buffer = Self::new(width, height, order)?;
        buffer.fill(color);
        Ok(buffer)
    }

    /// Wrap an existing byte region. `stride` may include row padding.
    /// Bytes past `height * stride` are discarded.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        order: ChannelOrder,
        mut data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoinError::InvalidGeometry {
                operation: "PixelBuffer::from_raw",
                reason: format!("empty buffer {}x{}", width, height),
            });
        }

        let row_len = width as usize * order.channels();
        if stride < row_len {
            return Err(CoinError::InvalidGeometry {
                operation: "PixelBuffer::from_raw",
                reason: format!("stride {} is shorter than a {}-byte row", stride, row_len),
            });
        }

        let required = byte_len("PixelBuffer::from_raw", stride, height)?;
        if data.len() < required {
            return Err(CoinError::InvalidGeometry {
                operation: "PixelBuffer::from_raw",
                reason: format!(
                    "{} bytes supplied, {}x{} at stride {} needs {}",
                    data.len(),
                    width,
                    height,
                    stride,
                    required
                ),
            });
        }
        data.truncate(required);

        Ok(Self {
            width,
            height,
            stride,
            order,
            data,
        })
    }

    /// Copy into a new buffer with a different (padded) stride.
    pub fn with_stride(&self, stride: usize) -> Result<Self> {
        let mut data = vec![0; byte_len("PixelBuffer::with_stride", stride, self.height)?];
        let row_len = self.row_len();
        if stride >= row_len {
            for (y, dst) in data.chunks_exact_mut(stride).enumerate() {
                dst[..row_len].copy_from_slice(self.row_at(y as u32));
            }
        }
        Self::from_raw(self.width, self.height, stride, self.order, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.order.channels()
    }

    /// Length of the pixel portion of a row, excluding padding.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// True if `(x, y)` addresses a pixel of this buffer.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * self.bytes_per_pixel()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x < self.width && y < self.height {
            Some(self.at(x, y))
        } else {
            None
        }
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x < self.width && y < self.height {
            Some(self.at_mut(x, y))
        } else {
            None
        }
    }

    /// Unchecked pixel access for hot loops whose bounds are already known.
    /// Out-of-range coordinates panic; they can never reach outside the owned bytes.
    pub fn at(&self, x: u32, y: u32) -> &[u8] {
        debug_assert!(x < self.width && y < self.height);
        let start = self.offset(x, y);
        &self.data[start..start + self.bytes_per_pixel()]
    }

    pub fn at_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        debug_assert!(x < self.width && y < self.height);
        let start = self.offset(x, y);
        let end = start + self.bytes_per_pixel();
        &mut self.data[start..end]
    }

    pub fn row(&self, y: u32) -> Option<&[u8]> {
        (y < self.height).then(|| self.row_at(y))
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y < self.height {
            let start = y as usize * self.stride;
            let end = start + self.row_len();
            Some(&mut self.data[start..end])
        } else {
            None
        }
    }

    fn row_at(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_len()]
    }

    pub fn color_at(&self, x: u32, y: u32) -> Color {
        Color::read(self.at(x, y), self.order)
    }

    pub fn set_color(&mut self, x: u32, y: u32, color: Color) {
        let order = self.order;
        color.write(self.at_mut(x, y), order);
    }

    pub fn fill(&mut self, color: Color) {
        let order = self.order;
        let bpp = self.bytes_per_pixel();
        self.par_rows_mut().for_each(|row| {
            for pixel in row.chunks_exact_mut(bpp) {
                color.write(pixel, order);
            }
        });
    }

    /// Iterate the pixel portion of every row in parallel. Padding is never exposed.
    pub fn par_rows(&self) -> impl IndexedParallelIterator<Item = &[u8]> {
        let row_len = self.row_len();
        self.data
            .par_chunks_exact(self.stride)
            .map(move |row| &row[..row_len])
    }

    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [u8]> {
        let row_len = self.row_len();
        self.data
            .par_chunks_exact_mut(self.stride)
            .map(move |row| &mut row[..row_len])
    }

    pub fn from_rgb_image(image: &RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let stride = width as usize * 3;
        Self::from_raw(width, height, stride, ChannelOrder::Rgb, image.as_raw().clone())
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let stride = width as usize * 4;
        Self::from_raw(width, height, stride, ChannelOrder::Rgba, image.as_raw().clone())
    }

    /// Take ownership of a decoded image. RGBA stays RGBA, everything else
    /// is converted to 8-bit RGB.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageRgba8(rgba) => Self::from_rgba_image(rgba),
            other => Self::from_rgb_image(&other.to_rgb8()),
        }
    }

    /// Unpack to an `RgbImage`, dropping padding and alpha.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color_at(x, y);
            Rgb([c.r, c.g, c.b])
        })
    }

    pub fn to_dynamic_image(&self) -> DynamicImage {
        if self.order.has_alpha() {
            DynamicImage::ImageRgba8(RgbaImage::from_fn(self.width, self.height, |x, y| {
                let c = self.color_at(x, y);
                Rgba([c.r, c.g, c.b, c.a])
            }))
        } else {
            DynamicImage::ImageRgb8(self.to_rgb_image())
        }
    }
}

impl TryFrom<&RgbImage> for PixelBuffer {
    type Error = CoinError;

    fn try_from(image: &RgbImage) -> Result<Self> {
        Self::from_rgb_image(image)
    }
}

impl TryFrom<&RgbaImage> for PixelBuffer {
    type Error = CoinError;

    fn try_from(image: &RgbaImage) -> Result<Self> {
        Self::from_rgba_image(image)
    }
}
