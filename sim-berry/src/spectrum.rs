//! 频域检查.
//!
//! 重建伪影 (例如条纹、蜂窝纹) 在频谱中表现为离散的亮点,
//! 因此把居中的对数幅度谱交给人工目测即可快速判断重建质量.

use ndarray::{Array2, ArrayView2, Axis};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::consts::SPECTRUM_EPSILON;

/// 计算归一化的居中对数幅度谱, 输出位于 `[0, 1]`.
///
/// 步骤:
/// 1. 非有限值 (`NaN`, `±inf`) 置 0;
/// 2. 减去均值, 抑制直流分量;
/// 3. 二维离散傅里叶变换, 并将零频移到中心;
/// 4. 取模后做 `ln(1 + x)`;
/// 5. 按 `(m - min) / (max - min + 1e-12)` 归一化.
///
/// 常数平面会得到全 0 输出, 不会失败.
pub fn fft_magnitude(plane: ArrayView2<f64>) -> Array2<f64> {
    let (height, width) = plane.dim();
    if height == 0 || width == 0 {
        return Array2::zeros((height, width));
    }

    let clean = plane.mapv(|v| if v.is_finite() { v } else { 0.0 });
    let mean = clean.mean().unwrap_or(0.0);
    let mut buf = clean.mapv(|v| Complex::new(v - mean, 0.0));

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(width);
    for mut row in buf.axis_iter_mut(Axis(0)) {
        let mut line = row.to_vec();
        row_fft.process(&mut line);
        row.iter_mut().zip(line).for_each(|(dst, src)| *dst = src);
    }
    let col_fft = planner.plan_fft_forward(height);
    for mut col in buf.axis_iter_mut(Axis(1)) {
        let mut line = col.to_vec();
        col_fft.process(&mut line);
        col.iter_mut().zip(line).for_each(|(dst, src)| *dst = src);
    }

    let shifted = fftshift(&buf);
    let log_mag = shifted.mapv(|c| c.norm().ln_1p());

    let (lo, hi) = log_mag
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    log_mag.mapv(|v| (v - lo) / (hi - lo + SPECTRUM_EPSILON))
}

/// 将零频分量移到数组中心, 与 numpy 的 `fftshift` 一致.
fn fftshift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(r, c)| data[((r + h - h / 2) % h, (c + w - w / 2) % w)])
}
