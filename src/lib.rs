pub mod annotate;
pub mod buffer;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;

pub use annotate::{Annotator, LabelCollector, MarkerOverlay, NoAnnotation};
pub use buffer::{ChannelOrder, Color, PixelBuffer, Point};
pub use config::{CountConfig, PipelineConfig, SubtractConfig};
pub use detection::{CoinCounter, build_mask_pipeline, build_standard_pipeline};
pub use error::{CoinError, Result};
pub use models::{Blob, Label};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
