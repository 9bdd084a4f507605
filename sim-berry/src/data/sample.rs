//! 像素元素类型.

use num::traits::AsPrimitive;
use std::fmt::Formatter;

/// 堆栈文件中像素的原始元素类型.
///
/// 内部计算统一提升为 `f64`, 写回时通过 [`SampleType`] 恢复相同的位宽和符号.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SampleType {
    /// `u8`.
    U8,
    /// `u16`. 显微镜相机最常见的类型.
    U16,
    /// `u32`.
    U32,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl SampleType {
    /// 类型名, 与 Rust 基本类型一致.
    pub const fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
            SampleType::U32 => "u32",
            SampleType::I8 => "i8",
            SampleType::I16 => "i16",
            SampleType::I32 => "i32",
            SampleType::F32 => "f32",
            SampleType::F64 => "f64",
        }
    }
}

/// 将原始像素提升为 `f64`.
#[inline]
pub(crate) fn widen<T: AsPrimitive<f64>>(data: Vec<T>) -> Vec<f64> {
    data.into_iter().map(|v| v.as_()).collect()
}

/// 将 `f64` 转换回原始类型. 整数类型向零截断并饱和, `NaN` 变为 0.
#[inline]
pub(crate) fn narrow<'a, T, I>(data: I) -> Vec<T>
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
    I: IntoIterator<Item = &'a f64>,
{
    data.into_iter().map(|v| v.as_()).collect()
}
