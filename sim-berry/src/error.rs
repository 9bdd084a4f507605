//! 运行时错误.

use std::path::PathBuf;
use thiserror::Error;

/// 本 crate 的统一错误类型.
///
/// 所有错误都在发现处立即返回, 不做任何默认值兜底.
#[derive(Error, Debug)]
pub enum BerryError {
    /// 不支持的数组维数. 仅接受 2 维或 3 维.
    #[error("不支持的图像维数: 只接受 2/3 维, 实际为 {ndim} 维")]
    InvalidShape {
        /// 实际维数.
        ndim: usize,
    },

    /// 输入为空, 无法计算 (例如没有正值体素时无法求分位数).
    #[error("输入为空: {what}")]
    EmptyInput {
        /// 哪一项输入为空.
        what: &'static str,
    },

    /// 掩膜形状与体数据的单层形状不一致.
    #[error("掩膜形状 {mask:?} 与体数据单层形状 {volume:?} 不一致")]
    ShapeMismatch {
        /// 掩膜形状 `(H, W)`.
        mask: (usize, usize),
        /// 体数据单层形状 `(H, W)`.
        volume: (usize, usize),
    },

    /// 缺少配套文件.
    #[error("缺少配套文件 `{role}`: {}", path.display())]
    MissingCompanion {
        /// 文件角色, 例如 `mask2d_ori`.
        role: &'static str,
        /// 期望的文件路径.
        path: PathBuf,
    },

    /// 目录中找不到唯一的 `*recon.tif` / `*ori.tif`.
    #[error("目录 {} 中 `*{suffix}` 文件数为 {found}, 期望恰好 1 个", dir.display())]
    MissingStack {
        /// 被搜索的目录.
        dir: PathBuf,
        /// 文件名后缀.
        suffix: &'static str,
        /// 实际找到的个数.
        found: usize,
    },

    /// 多边形顶点不足 3 个.
    #[error("多边形至少需要 3 个顶点, 实际为 {count} 个")]
    MalformedPolygon {
        /// 实际顶点数.
        count: usize,
    },

    /// 参数超出合法范围.
    #[error("参数 `{name}` 不合法: {reason}")]
    InvalidParameter {
        /// 参数名.
        name: &'static str,
        /// 原因.
        reason: String,
    },

    /// 掩膜文件中出现 0/255 以外的像素值.
    #[error("掩膜文件中出现非法像素值 {value}, 只允许 0 或 255")]
    InvalidMaskValue {
        /// 非法值.
        value: u8,
    },

    /// 不支持的像素元素类型.
    #[error("不支持的像素元素类型: {0}")]
    UnsupportedSampleType(String),

    /// 底层 I/O 错误.
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF 编解码错误.
    #[error("TIFF 错误: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// npy 读取错误.
    #[error("npy 读取错误: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// npy 写入错误.
    #[error("npy 写入错误: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// 8-bit 图像编解码错误.
    #[error("图像错误: {0}")]
    Image(#[from] image::ImageError),

    /// JSON 序列化错误.
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV 序列化错误.
    #[error("CSV 错误: {0}")]
    Csv(#[from] csv::Error),
}

/// 本 crate 的运行时结果.
pub type Result<T> = std::result::Result<T, BerryError>;
