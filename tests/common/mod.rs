#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from coinslips for tests
pub use coinslips::{
    Annotator, ChannelOrder, CoinCounter, CoinError, Color, CountConfig, LabelCollector,
    PipelineConfig, PixelBuffer, Point, SubtractConfig,
};
