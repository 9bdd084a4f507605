//! 表达量: 原始分辨率堆栈在 ROI 内的平均强度, 用作凝聚体特征的归一化协变量.

use std::path::PathBuf;

use ndarray::{ArrayView3, Zip};

use crate::dataset::RoiGroup;
use crate::{BerryError, ImageStack, Mask2d, Result};

/// 计算 `volume` 在广播后的 `mask` 内全部体素的平均强度.
///
/// # 错误
///
/// - `mask` 的形状与 `volume` 的单层形状不同时返回 [`BerryError::ShapeMismatch`];
/// - `mask` 全为 `false` (或堆栈深度为 0) 时返回 [`BerryError::EmptyInput`].
pub fn mean_masked_intensity(volume: ArrayView3<f64>, mask: &Mask2d) -> Result<f64> {
    let (depth, h, w) = volume.dim();
    if mask.shape() != (h, w) {
        return Err(BerryError::ShapeMismatch {
            mask: mask.shape(),
            volume: (h, w),
        });
    }

    let (sum, count) = Zip::from(&volume)
        .and(&mask.broadcast(depth))
        .fold((0.0, 0usize), |(sum, count), &v, &keep| {
            if keep {
                (sum + v, count + 1)
            } else {
                (sum, count)
            }
        });
    if count == 0 {
        return Err(BerryError::EmptyInput { what: "掩膜内体素" });
    }
    Ok(sum / count as f64)
}

/// 对每个 ROI 组, 读取原始分辨率的掩膜堆栈和二维掩膜, 计算表达量.
///
/// 返回 `(重建分辨率掩膜堆栈路径, 表达量)`, 顺序与 `groups` 一致.
/// 任何一组失败都会立即返回错误.
pub fn expression_levels(groups: &[RoiGroup]) -> Result<Vec<(PathBuf, f64)>> {
    groups
        .iter()
        .map(|group| {
            let volume = ImageStack::open(&group.ori_masked)?;
            let mask = Mask2d::open(&group.mask2d_ori)?;
            let level = mean_masked_intensity(volume.data(), &mask)?;
            log::info!(
                "{}: expression {level:.3}",
                group.ori_masked.display()
            );
            Ok((group.recon_masked.clone(), level))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_mean_over_masked_voxels() {
        let volume = Array3::from_shape_fn((2, 2, 2), |(z, h, w)| (z * 4 + h * 2 + w) as f64);
        let mask = Mask2d::from_positions((2, 2), [(0, 0), (1, 1)]);
        // (0 + 3 + 4 + 7) / 4
        assert_eq!(mean_masked_intensity(volume.view(), &mask).unwrap(), 3.5);
    }

    #[test]
    fn test_shape_mismatch() {
        let volume = Array3::<f64>::zeros((3, 4, 5));
        let mask = Mask2d::from_fn((5, 4), |_| true);
        match mean_masked_intensity(volume.view(), &mask) {
            Err(BerryError::ShapeMismatch { mask, volume }) => {
                assert_eq!(mask, (5, 4));
                assert_eq!(volume, (4, 5));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_mask() {
        let volume = Array3::<f64>::ones((2, 2, 2));
        let mask = Mask2d::from_fn((2, 2), |_| false);
        assert!(matches!(
            mean_masked_intensity(volume.view(), &mask),
            Err(BerryError::EmptyInput { .. })
        ));
    }
}
