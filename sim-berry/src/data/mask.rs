//! 二维二值掩膜.

use std::ops::Index;
use std::path::Path;

use ndarray::{Array2, ArrayView2, ArrayView3};

use crate::consts::gray::*;
use crate::{BerryError, Idx2d, Result};

/// 某一分辨率网格上的二维二值掩膜, `true` 表示 ROI 内部.
///
/// 一般由一个多边形光栅化得到, 见 [`crate::roi::Polygon::rasterize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask2d {
    data: Array2<bool>,
}

impl Index<Idx2d> for Mask2d {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl Mask2d {
    /// 由谓词 `f(h, w)` 逐像素生成.
    #[inline]
    pub fn from_fn<F: FnMut(Idx2d) -> bool>(shape: Idx2d, f: F) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, f),
        }
    }

    /// 创建形状为 `shape` 的掩膜, 仅 `positions` 给出的像素为 `true`.
    ///
    /// 如果存在越界索引, 则程序 panic.
    pub fn from_positions<I: IntoIterator<Item = Idx2d>>(shape: Idx2d, positions: I) -> Self {
        let mut data = Array2::from_elem(shape, false);
        for pos in positions.into_iter() {
            data[pos] = true;
        }
        Self { data }
    }

    /// 从 0/255 单通道图像数据创建. 出现其他像素值时返回
    /// [`BerryError::InvalidMaskValue`].
    pub fn from_gray(gray: ArrayView2<u8>) -> Result<Self> {
        if let Some(&value) = gray.iter().find(|p| !is_mask_value(**p)) {
            return Err(BerryError::InvalidMaskValue { value });
        }
        Ok(Self {
            data: gray.mapv(is_inside),
        })
    }

    /// 打开 0/255 单通道掩膜文件.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref())?.into_luma8();
        let (w, h) = img.dimensions();
        // `GrayImage` 按行优先存储, 与 `(H, W)` 一致.
        let gray = Array2::from_shape_vec((h as usize, w as usize), img.into_raw())
            .map_err(|_| BerryError::InvalidShape { ndim: 2 })?;
        Self::from_gray(gray.view())
    }

    /// 转换为 0/255 单通道数据.
    #[inline]
    pub fn to_gray(&self) -> Array2<u8> {
        self.data
            .mapv(|p| if p { MASK_INSIDE } else { MASK_OUTSIDE })
    }

    /// 沿新的最外层轴重复 `depth` 次, 得到 `(depth, H, W)` 只读视图.
    #[inline]
    pub fn broadcast(&self, depth: usize) -> ArrayView3<'_, bool> {
        let (h, w) = self.shape();
        // 只在前面补一个轴, 总能广播成功.
        self.data.broadcast((depth, h, w)).unwrap()
    }

    /// 掩膜的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// ROI 内部的像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// ROI 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 以行优先规则收集 ROI 内部像素的索引.
    pub fn positions(&self) -> Vec<Idx2d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &p)| p.then_some(pos))
            .collect()
    }
}
