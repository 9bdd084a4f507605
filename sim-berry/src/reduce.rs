//! 灰度降维: 将 2/3 维强度数据压缩为单张平面.

use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};

use crate::{BerryError, Result};

/// 将任意维数的强度数据降为单张平面.
///
/// - 2 维数据原样返回 (复制为 `f64`);
/// - 3 维数据 `(z, H, W)` 沿 z 方向取平均;
/// - 其他维数返回 [`BerryError::InvalidShape`].
///
/// 深度为 0 的 3 维数据同样视为非法形状.
pub fn to_grayscale(data: ArrayViewD<f64>) -> Result<Array2<f64>> {
    let ndim = data.ndim();
    match ndim {
        2 => {
            let plane = data
                .into_dimensionality::<Ix2>()
                .map_err(|_| BerryError::InvalidShape { ndim })?;
            Ok(plane.to_owned())
        }
        3 => {
            let stack = data
                .into_dimensionality::<Ix3>()
                .map_err(|_| BerryError::InvalidShape { ndim })?;
            stack
                .mean_axis(Axis(0))
                .ok_or(BerryError::EmptyInput { what: "堆栈深度" })
        }
        _ => Err(BerryError::InvalidShape { ndim }),
    }
}

/// 沿 z 方向的最大投影.
///
/// 当深度为 0 时 panic.
pub fn max_projection(stack: ArrayView3<f64>) -> Array2<f64> {
    assert!(stack.len_of(Axis(0)) > 0, "最大投影要求至少一层切片");
    stack.map_axis(Axis(0), |lane| {
        lane.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// 线性拉伸到 `[0, 1]`. 常数平面 (含空平面) 返回全 0.
pub fn normalize_for_display(plane: ArrayView2<f64>) -> Array2<f64> {
    let (lo, hi) = plane
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if !(range > 0.0) {
        return Array2::zeros(plane.dim());
    }
    plane.mapv(|v| (v - lo) / range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3, ArrayD, IxDyn};

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_grayscale_2d_passthrough() {
        let plane = array![[1.0, 2.0], [3.0, 4.0]];
        let out = to_grayscale(plane.view().into_dyn()).unwrap();
        assert_eq!(out, plane);
    }

    #[test]
    fn test_grayscale_3d_mean() {
        let stack = Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 6.0]).unwrap();
        let out = to_grayscale(stack.view().into_dyn()).unwrap();
        assert!(float_eq(out[(0, 0)], 2.0));
        assert!(float_eq(out[(0, 1)], 4.0));
    }

    #[test]
    fn test_grayscale_rejects_other_rank() {
        let v = ArrayD::<f64>::zeros(IxDyn(&[2, 2, 2, 2]));
        assert!(matches!(
            to_grayscale(v.view()),
            Err(BerryError::InvalidShape { ndim: 4 })
        ));
        let v = ArrayD::<f64>::zeros(IxDyn(&[5]));
        assert!(matches!(
            to_grayscale(v.view()),
            Err(BerryError::InvalidShape { ndim: 1 })
        ));
    }

    #[test]
    fn test_max_projection() {
        let stack =
            Array3::from_shape_vec((3, 1, 2), vec![1.0, -5.0, 7.0, -2.0, 3.0, -9.0]).unwrap();
        assert_eq!(max_projection(stack.view()), array![[7.0, -2.0]]);
    }

    #[test]
    fn test_normalize_for_display() {
        let out = normalize_for_display(array![[2.0, 4.0], [6.0, 10.0]].view());
        assert_eq!(out, array![[0.0, 0.25], [0.5, 1.0]]);
        let flat = normalize_for_display(Array2::from_elem((3, 3), 7.0).view());
        assert!(flat.iter().all(|v| *v == 0.0));
    }
}
