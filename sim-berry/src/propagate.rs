//! 跨分辨率掩膜传播.
//!
//! 同一个多边形先在重建 (recon) 网格上光栅化, 再用最近邻插值缩放到原始 (ori)
//! 网格, 最后沿 z 方向广播到整个堆栈.

use ndarray::{ArrayView3, Zip};

use crate::{ImageStack, Mask2d, StackAttr};

/// 将 `mask` 沿 z 方向广播为 `depth` 层的只读视图, 不复制数据.
pub fn broadcast_mask(mask: &Mask2d, depth: usize) -> ArrayView3<'_, bool> {
    mask.broadcast(depth)
}

/// 源像素索引: `round((dst + 0.5) * src_len / dst_len - 0.5)`, 并截断到合法范围.
#[inline]
fn nearest_source(dst: usize, src_len: usize, dst_len: usize) -> usize {
    let x = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64 - 0.5;
    let idx = (x + 0.5).floor().max(0.0) as usize;
    idx.min(src_len.saturating_sub(1))
}

/// 最近邻 (0 阶) 缩放到 `(height, width)`. 输出仍为二值; 尺寸不变时原样复制.
///
/// 当源掩膜为空 (高或宽为 0) 而目标尺寸非空时 panic.
pub fn resample_mask(mask: &Mask2d, height: usize, width: usize) -> Mask2d {
    let (src_h, src_w) = mask.shape();
    if (src_h, src_w) == (height, width) {
        return mask.clone();
    }
    assert!(
        height * width == 0 || src_h * src_w > 0,
        "无法从空掩膜缩放到 {height}×{width}"
    );
    let rows: Vec<usize> = (0..height)
        .map(|r| nearest_source(r, src_h, height))
        .collect();
    let cols: Vec<usize> = (0..width)
        .map(|c| nearest_source(c, src_w, width))
        .collect();
    Mask2d::from_fn((height, width), |(r, c)| mask[(rows[r], cols[c])])
}

/// 将掩膜外的体素置 0, 返回形状与元素类型都不变的新堆栈.
///
/// `mask` 的形状必须与 `volume` 的单层形状相同, 否则 panic.
/// 面向用户的调用方应先检查并返回 [`BerryError::ShapeMismatch`](crate::BerryError::ShapeMismatch).
pub fn apply_mask(volume: &ImageStack, mask: &Mask2d) -> ImageStack {
    assert_eq!(
        volume.slice_shape(),
        mask.shape(),
        "掩膜形状必须与堆栈单层形状一致"
    );
    let mut data = volume.data().to_owned();
    Zip::from(&mut data)
        .and(&broadcast_mask(mask, volume.len_z()))
        .for_each(|v, &keep| {
            if !keep {
                *v = 0.0;
            }
        });
    volume.derive(data)
}
