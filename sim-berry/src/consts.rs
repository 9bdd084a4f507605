//! 通用常量.

/// 单通道掩膜文件中的像素值.
pub mod gray {
    /// 掩膜外 (背景) 的像素值.
    pub const MASK_OUTSIDE: u8 = 0;

    /// 掩膜内 (ROI) 的像素值. 注意不是 1.
    pub const MASK_INSIDE: u8 = 255;

    /// 像素是否表示掩膜内部?
    #[inline]
    pub const fn is_inside(p: u8) -> bool {
        matches!(p, MASK_INSIDE)
    }

    /// 像素是否是合法的掩膜值?
    #[inline]
    pub const fn is_mask_value(p: u8) -> bool {
        matches!(p, MASK_OUTSIDE | MASK_INSIDE)
    }
}

/// 默认的亮点比例. `0.01` 代表取正值体素中最亮的 1% 作为前景.
pub const DEFAULT_PERCENTILE: f64 = 0.01;

/// 频谱归一化时加在分母上的小量, 避免常数输入导致除零.
pub const SPECTRUM_EPSILON: f64 = 1e-12;

/// 多边形最少顶点数.
pub const MIN_POLYGON_VERTICES: usize = 3;
