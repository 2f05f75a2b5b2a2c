use serde::Serialize;

/// An accepted connected component, reduced to its summary statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    /// 1-based position in raster discovery order among accepted blobs
    pub ordinal: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: usize,
    /// Integer mean of member coordinates
    pub centroid_x: i32,
    pub centroid_y: i32,
}

impl Blob {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn centroid(&self) -> (i32, i32) {
        (self.centroid_x, self.centroid_y)
    }

    /// Fraction of the bounding box covered by the blob. A filled disk is about 0.785.
    pub fn fill_ratio(&self) -> f32 {
        let bbox = (self.width() * self.height()) as f32;
        self.pixel_count as f32 / bbox
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }
}

/// Text placed at an anchor on the output image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
}
