use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::{Idx2d, Idx3d, Result};

mod io;
mod mask;
mod sample;
mod save;

pub use io::{open_stack, save_stack};
pub use mask::Mask2d;
pub use sample::SampleType;
pub use save::{ImgWriteRaw, ImgWriteVis};

/// 体素的物理尺寸 `(dz, dy, dx)`, 单位一般为微米.
///
/// 序列化为 `[dz, dy, dx]` 三元数组.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct VoxelSize {
    z: f64,
    y: f64,
    x: f64,
}

impl VoxelSize {
    /// 构建体素尺寸. 三个分量都必须是有限正数, 否则返回 `None`.
    pub fn new(z: f64, y: f64, x: f64) -> Option<Self> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        (ok(z) && ok(y) && ok(x)).then_some(Self { z, y, x })
    }

    /// 相邻切片方向 (z) 的尺寸.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// 单个体素的物理体积.
    #[inline]
    pub fn voxel(&self) -> f64 {
        self.z * self.y * self.x
    }
}

impl TryFrom<[f64; 3]> for VoxelSize {
    type Error = String;

    fn try_from([z, y, x]: [f64; 3]) -> std::result::Result<Self, Self::Error> {
        Self::new(z, y, x).ok_or_else(|| format!("体素尺寸必须为有限正数, 实际为 {:?}", [z, y, x]))
    }
}

impl From<VoxelSize> for [f64; 3] {
    #[inline]
    fn from(v: VoxelSize) -> Self {
        [v.z, v.y, v.x]
    }
}

/// 三维体数据的共用形状属性.
pub trait StackAttr {
    /// 获取数据形状 `(z, H, W)`.
    fn shape(&self) -> Idx3d;

    /// 获取单层切片形状 `(H, W)`.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }
}

/// `(z, H, W)` 强度堆栈.
///
/// 数据以 `f64` 保存; `sample_type` 记录文件中原本的元素类型,
/// 写回时会转换回该类型. 载入后不应再修改, 所有处理都返回新的堆栈.
#[derive(Debug, Clone)]
pub struct ImageStack {
    data: Array3<f64>,
    sample_type: SampleType,
}

impl StackAttr for ImageStack {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for ImageStack {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl ImageStack {
    /// 由已有数据直接创建.
    pub fn new(data: Array3<f64>, sample_type: SampleType) -> Self {
        Self { data, sample_type }
    }

    /// 打开堆栈文件. 根据扩展名选择 `.npy` 或 (多页) TIFF 格式.
    #[inline]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        open_stack(path)
    }

    /// 按读入时的元素类型保存到 `path`.
    #[inline]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_stack(path, self)
    }

    /// 以同样的元素类型包装一份新数据.
    ///
    /// `data` 的形状可以与 `self` 不同.
    pub(crate) fn derive(&self, data: Array3<f64>) -> Self {
        Self {
            data,
            sample_type: self.sample_type,
        }
    }

    /// 原始元素类型.
    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// 获取能按升序迭代所有切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, f64>> {
        self.data.axis_iter(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_voxel_size_validation() {
        assert!(VoxelSize::new(0.1, 0.03, 0.03).is_some());
        assert!(VoxelSize::new(0.0, 0.03, 0.03).is_none());
        assert!(VoxelSize::new(0.1, -1.0, 0.03).is_none());
        assert!(VoxelSize::new(f64::NAN, 0.03, 0.03).is_none());
    }

    #[test]
    fn test_voxel_size_serde() {
        let v: VoxelSize = serde_json::from_str("[0.125, 0.5, 0.5]").unwrap();
        assert_eq!(v.voxel(), 0.125 * 0.25);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[0.125,0.5,0.5]");
        assert!(serde_json::from_str::<VoxelSize>("[0.0, 0.5, 0.5]").is_err());
    }

    #[test]
    fn test_stack_attr() {
        let stack = ImageStack::new(Array3::zeros((3, 4, 5)), SampleType::U16);
        assert_eq!(stack.shape(), (3, 4, 5));
        assert_eq!(stack.slice_shape(), (4, 5));
        assert_eq!(stack.len_z(), 3);
        assert_eq!(stack.slice_iter().len(), 3);
    }
}
