//! 多边形 ROI.
//!
//! 1. [`Polygon`] 在给定网格上光栅化为 [`Mask2d`](crate::Mask2d);
//! 2. [`VertexRecord`] 负责顶点的 JSON 持久化, 便于复现;
//! 3. [`capture`] 约定获取多边形、显示图像与询问用户的接口.

mod polygon;
mod record;

pub mod capture;

pub use capture::{
    Choice, ChoicePrompt, LinePrompt, PlaneDisplay, PngPreview, PolygonCapture, RecordedPolygons,
};
pub use polygon::Polygon;
pub use record::VertexRecord;
