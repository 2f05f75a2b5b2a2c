use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::models::Label;

/// Receives one label per accepted blob, in discovery order.
///
/// Implementations own rendering and must not fail back into the counter.
pub trait Annotator {
    fn place(&mut self, text: &str, x: i32, y: i32);
}

impl<F> Annotator for F
where
    F: FnMut(&str, i32, i32),
{
    fn place(&mut self, text: &str, x: i32, y: i32) {
        self(text, x, y)
    }
}

/// Discards every label
pub struct NoAnnotation;

impl Annotator for NoAnnotation {
    fn place(&mut self, _text: &str, _x: i32, _y: i32) {}
}

/// Records labels for later use
#[derive(Debug, Default, Clone)]
pub struct LabelCollector {
    pub labels: Vec<Label>,
}

impl LabelCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_labels(self) -> Vec<Label> {
        self.labels
    }
}

impl Annotator for LabelCollector {
    fn place(&mut self, text: &str, x: i32, y: i32) {
        self.labels.push(Label {
            text: text.to_string(),
            x,
            y,
        });
    }
}

/// Marks label anchors on an RGB image.
///
/// Draws a cross at each anchor and a box of `box_size` pixels starting at it,
/// which frames the centroid for the default label offset. Glyphs are not
/// rendered; the label text is kept for the caller to print.
#[derive(Debug, Clone)]
pub struct MarkerOverlay {
    pub color: Rgb<u8>,
    pub box_size: u32,
    labels: Vec<Label>,
}

impl MarkerOverlay {
    pub fn new() -> Self {
        Self {
            color: Rgb([255, 0, 0]),
            box_size: 21,
            labels: Vec::new(),
        }
    }

    pub fn from_labels(labels: &[Label]) -> Self {
        Self {
            labels: labels.to_vec(),
            ..Self::new()
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn render(&self, canvas: &mut RgbImage) {
        for label in &self.labels {
            draw_cross_mut(canvas, self.color, label.x, label.y);
            // Rect::of_size panics on zero sizes
            if self.box_size > 0 {
                let rect = Rect::at(label.x, label.y).of_size(self.box_size, self.box_size);
                draw_hollow_rect_mut(canvas, rect, self.color);
            }
        }
    }
}

impl Default for MarkerOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for MarkerOverlay {
    fn place(&mut self, text: &str, x: i32, y: i32) {
        self.labels.push(Label {
            text: text.to_string(),
            x,
            y,
        });
    }
}
