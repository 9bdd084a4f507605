//! 面向单个细胞目录或一批文件的处理流程.
//!
//! 交互部分通过 [`crate::roi::capture`] 中的 trait 注入.

mod roi_masker;
mod spectrum_check;

pub use roi_masker::mask_cell;
pub use spectrum_check::{spectrum_check, SpectrumReport};
