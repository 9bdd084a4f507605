//! 平面图像的持久化存储.

use std::path::Path;

use image::{GrayImage, ImageResult, Luma};
use ndarray::{ArrayBase, Data, Ix2};

use super::Mask2d;
use crate::reduce::normalize_for_display;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于强度平面, 保存时会把 `[min, max]` 线性拉伸到 `[0, 255]`;
/// 对于 [`Mask2d`], ROI 内为白色, ROI 外为黑色.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// 掩膜按 0/255 单通道 8-bit 图像保存, 可以用 [`Mask2d::open`] 无损读回.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 逐像素生成 `(H, W)` 单通道图像.
fn gray_from_fn<F: Fn(usize, usize) -> u8>((height, width): (usize, usize), f: F) -> GrayImage {
    GrayImage::from_fn(width as u32, height as u32, |w, h| {
        Luma([f(h as usize, w as usize)])
    })
}

impl ImgWriteRaw for Mask2d {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let gray = self.to_gray();
        gray_from_fn(self.shape(), |h, w| gray[(h, w)]).save(path)
    }
}

/// 与 [`ImgWriteRaw`] 相同: 0/255 本身已经足够醒目.
impl ImgWriteVis for Mask2d {
    #[inline]
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.save_raw(path)
    }
}

/// 最小值映射为黑色, 最大值映射为白色. 常数平面保存为全黑.
impl<S: Data<Elem = f64>> ImgWriteVis for ArrayBase<S, Ix2> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let unit = normalize_for_display(self.view());
        gray_from_fn(unit.dim(), |h, w| {
            (unit[(h, w)] * 255.0).round().clamp(0.0, 255.0) as u8
        })
        .save(path)
    }
}
