use std::collections::VecDeque;

use tracing::{info, trace};

use crate::annotate::Annotator;
use crate::buffer::PixelBuffer;
use crate::config::CountConfig;
use crate::models::Blob;

/// Result of one counting pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobCount {
    pub count: usize,
    /// Accepted blobs in raster discovery order
    pub blobs: Vec<Blob>,
    /// Components discarded as noise
    pub rejected: usize,
}

/// Running totals for the component currently being traversed
struct Accumulator {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    sum_x: u64,
    sum_y: u64,
    pixels: usize,
}

impl Accumulator {
    fn new(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            sum_x: 0,
            sum_y: 0,
            pixels: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.pixels += 1;
    }

    fn into_blob(self, ordinal: u32) -> Blob {
        let n = self.pixels as u64;
        Blob {
            ordinal,
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
            pixel_count: self.pixels,
            centroid_x: (self.sum_x / n) as i32,
            centroid_y: (self.sum_y / n) as i32,
        }
    }
}

/// Count 4-connected black components on the red channel.
///
/// Components are seeded in raster order and expanded breadth first. Those with
/// more than `config.min_blob_size` pixels are accepted, numbered from 1, and
/// handed to `annotator` as `"{prefix} {n}"` anchored at the centroid minus
/// `config.label_offset`.
pub fn count_blobs(
    buffer: &PixelBuffer,
    config: &CountConfig,
    annotator: &mut dyn Annotator,
) -> BlobCount {
    let (width, height) = buffer.dimensions();
    let red = buffer.order().red();
    let is_foreground = |x: u32, y: u32| buffer.at(x, y)[red] == 0;

    // Dense visited grid, owned by this call only
    let mut visited = vec![false; width as usize * height as usize];
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut result = BlobCount::default();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if visited[index(x, y)] || !is_foreground(x, y) {
                continue;
            }

            let mut acc = Accumulator::new(x, y);
            visited[index(x, y)] = true;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                acc.add(cx, cy);

                let neighbors = [
                    (cx.checked_add(1).filter(|&nx| nx < width), Some(cy)),
                    (cx.checked_sub(1), Some(cy)),
                    (Some(cx), cy.checked_add(1).filter(|&ny| ny < height)),
                    (Some(cx), cy.checked_sub(1)),
                ];
                for (nx, ny) in neighbors {
                    let (Some(nx), Some(ny)) = (nx, ny) else {
                        continue;
                    };
                    let i = index(nx, ny);
                    if !visited[i] && is_foreground(nx, ny) {
                        visited[i] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            if acc.pixels > config.min_blob_size {
                result.count += 1;
                let blob = acc.into_blob(result.count as u32);
                let text = format!("{} {}", config.label_prefix, blob.ordinal);
                let (ox, oy) = config.label_offset;
                trace!(ordinal = blob.ordinal, pixels = blob.pixel_count, "blob accepted");
                annotator.place(&text, blob.centroid_x - ox, blob.centroid_y - oy);
                result.blobs.push(blob);
            } else {
                trace!(pixels = acc.pixels, "blob rejected as noise");
                result.rejected += 1;
            }
        }
    }

    info!(count = result.count, rejected = result.rejected, "blob count");
    result
}
