#![warn(missing_docs)]

//! 核心库. 提供 SIM 重建图像 (recon) 与原始图像 (ori) 堆栈的 ROI 掩膜传播,
//! 以及凝聚体 (condensate, 细胞内亮点) 的检测与形态学测量.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 所有体数据均按 `(z, H, W)` 组织, 内部计算统一使用 `f64`,
//!   写回磁盘时恢复为读入时的元素类型.
//! 2. 交互部分 (画多边形, y/n/q 选择, 显示图像) 不在本 crate 内实现,
//!   只以 trait 的形式给出接口, 见 [`roi`] 和 [`workflow`].
//! 3. 对违反前置条件的调用 (例如形状不一致的底层掩膜操作), 程序会直接 panic;
//!   面向数据的错误则通过 [`BerryError`] 返回.
//!
//! # 开发计划
//!
//! ### 灰度降维 ✅
//!
//! 2D/3D 图像到单张平面 (平均或最大投影).
//!
//! 实现位于 `sim-berry/src/reduce.rs`.
//!
//! ### 频域检查 ✅
//!
//! 归一化的对数幅度谱, 用于目测重建质量.
//!
//! 实现位于 `sim-berry/src/spectrum.rs`.
//!
//! ### 多边形 ROI 与跨分辨率掩膜传播 ✅
//!
//! 1. 多边形光栅化为二值掩膜 ✅
//! 2. 最近邻重采样到另一分辨率 ✅
//! 3. 沿 z 方向广播并作用于整个堆栈 ✅
//! 4. 顶点 JSON 记录, 便于复现 ✅
//!
//! 实现位于 `sim-berry/src/roi` 和 `sim-berry/src/propagate.rs`.
//!
//! ### 凝聚体检测 ✅
//!
//! 正值体素的分位数阈值, 26-邻接连通域标记, 每个连通域的几何/强度特征.
//! 凸包体积通过整数坐标的增量凸包精确求得.
//!
//! 实现位于 `sim-berry/src/condensate`.
//!
//! ### 表达量 ✅
//!
//! 原始分辨率堆栈掩膜内的平均强度.
//!
//! 实现位于 `sim-berry/src/expression.rs`.
//!
//! ### 统计检验 ⌛️
//!
//! 各组凝聚体特征之间的 Welch ANOVA. 尚未实现.

/// 二维索引 `(h, w)`.
pub type Idx2d = (usize, usize);

/// 三维索引 `(z, h, w)`.
pub type Idx3d = (usize, usize, usize);

/// 平面直角坐标系下的二维点 `(x, y)`. `x` 向右, `y` 向下.
pub type PointXy = (f64, f64);

pub mod consts;

mod error;

pub use error::{BerryError, Result};

/// 堆栈、掩膜等基础数据结构, 以及它们的读写.
mod data;

pub use data::{
    open_stack, save_stack, ImgWriteRaw, ImgWriteVis, ImageStack, Mask2d, SampleType, StackAttr,
    VoxelSize,
};

pub mod reduce;

pub mod spectrum;

pub mod roi;

pub mod propagate;

pub mod condensate;

pub mod expression;

pub mod dataset;

pub mod workflow;

pub mod prelude;
