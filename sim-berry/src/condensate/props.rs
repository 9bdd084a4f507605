//! 单个连通域的几何与强度特征.

use std::f64::consts::{FRAC_PI_4, PI};

use nalgebra::Matrix3;
use ndarray::ArrayView3;

use super::hull::convex_voxel_count;
use super::table::FeatureRow;
use crate::{Idx3d, VoxelSize};

/// 实对称矩阵的特征值, 按降序排列.
pub(crate) fn symmetric_eigenvalues(m: Matrix3<f64>) -> [f64; 3] {
    let v = m.symmetric_eigenvalues();
    let mut ev = [v[0], v[1], v[2]];
    ev.sort_by(|a, b| b.total_cmp(a));
    ev
}

/// 二阶中心矩 (总体方差/协方差), 坐标顺序为 `(z, y, x)`.
struct Moments {
    centroid: [f64; 3],
    /// `cov[i][j]`.
    cov: [[f64; 3]; 3],
}

impl Moments {
    fn of(voxels: &[Idx3d]) -> Self {
        let n = voxels.len() as f64;
        let coords = || voxels.iter().map(|&(z, y, x)| [z as f64, y as f64, x as f64]);
        let mut centroid = [0.0; 3];
        for c in coords() {
            (0..3).for_each(|i| centroid[i] += c[i]);
        }
        centroid.iter_mut().for_each(|v| *v /= n);

        let mut cov = [[0.0; 3]; 3];
        for c in coords() {
            let d = [c[0] - centroid[0], c[1] - centroid[1], c[2] - centroid[2]];
            for i in 0..3 {
                for j in 0..3 {
                    cov[i][j] += d[i] * d[j];
                }
            }
        }
        cov.iter_mut().flatten().for_each(|v| *v /= n);
        Self { centroid, cov }
    }

    /// 惯性张量: 对角线为其余两轴方差之和, 非对角线为协方差取负.
    fn inertia_tensor(&self) -> Matrix3<f64> {
        let c = &self.cov;
        let trace = c[0][0] + c[1][1] + c[2][2];
        Matrix3::from_fn(|i, j| if i == j { trace - c[i][i] } else { -c[i][j] })
    }

    /// `YX` 投影上主轴与行方向的夹角 (弧度), 取值 `[-π/2, π/2]`.
    fn orientation(&self) -> f64 {
        let a = self.cov[2][2];
        let c = self.cov[1][1];
        let b = -self.cov[1][2];
        if a - c == 0.0 {
            if b < 0.0 {
                FRAC_PI_4
            } else {
                -FRAC_PI_4
            }
        } else {
            0.5 * (-2.0 * b).atan2(c - a)
        }
    }
}

/// 测量一个连通域.
///
/// `voxels` 为该连通域的全部体素, 不可为空; `volume` 为未经阈值化的原始强度.
pub(crate) fn measure(
    label: u32,
    voxels: &[Idx3d],
    volume: ArrayView3<f64>,
    voxel_size: Option<VoxelSize>,
    file_name: &str,
) -> FeatureRow {
    assert!(!voxels.is_empty(), "连通域 {label} 没有体素");
    let area = voxels.len();

    let mut lo = [usize::MAX; 3];
    let mut hi = [0usize; 3];
    for &(z, y, x) in voxels {
        for (i, v) in [z, y, x].into_iter().enumerate() {
            lo[i] = lo[i].min(v);
            hi[i] = hi[i].max(v + 1);
        }
    }
    let bbox_volume = (0..3).map(|i| hi[i] - lo[i]).product::<usize>();

    let (mut min_i, mut max_i, mut sum_i) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
    for &pos in voxels {
        let v = volume[pos];
        min_i = min_i.min(v);
        max_i = max_i.max(v);
        sum_i += v;
    }

    let moments = Moments::of(voxels);
    let [ev0, ev1, ev2] = symmetric_eigenvalues(moments.inertia_tensor());
    let major = (10.0 * (ev0 + ev1 - ev2)).max(0.0).sqrt();
    let minor = (10.0 * (-ev0 + ev1 + ev2)).max(0.0).sqrt();
    let eccentricity = if major > 0.0 {
        (1.0 - (minor / major).powi(2)).max(0.0).sqrt()
    } else {
        0.0
    };

    let convex = convex_voxel_count(voxels).unwrap_or(area);
    let equivalent_diameter = (6.0 * area as f64 / PI).cbrt();

    FeatureRow {
        label,
        area,
        bbox_0: lo[0],
        bbox_1: lo[1],
        bbox_2: lo[2],
        bbox_3: hi[0],
        bbox_4: hi[1],
        bbox_5: hi[2],
        centroid_0: moments.centroid[0],
        centroid_1: moments.centroid[1],
        centroid_2: moments.centroid[2],
        equivalent_diameter,
        extent: area as f64 / bbox_volume as f64,
        max_intensity: max_i,
        mean_intensity: sum_i / area as f64,
        min_intensity: min_i,
        solidity: area as f64 / convex as f64,
        eccentricity,
        orientation: moments.orientation(),
        major_axis_length: major,
        minor_axis_length: minor,
        volume_um3: voxel_size.map(|v| area as f64 * v.voxel()),
        equivalent_diameter_um: voxel_size.map(|v| equivalent_diameter * v.z()),
        file_name: file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 特征值分解是迭代求解的, 退化量 (开方放大误差) 用较宽的容差比较.
    fn loose_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_eigenvalues_diagonal() {
        let ev = symmetric_eigenvalues(Matrix3::new(1.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 2.0));
        assert!(float_eq(ev[0], 3.0));
        assert!(float_eq(ev[1], 2.0));
        assert!(float_eq(ev[2], 1.0));
    }

    #[test]
    fn test_eigenvalues_general() {
        // 特征值为 4, 1, 1.
        let ev = symmetric_eigenvalues(Matrix3::new(2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0));
        assert!(float_eq(ev[0], 4.0));
        assert!(float_eq(ev[1], 1.0));
        assert!(float_eq(ev[2], 1.0));

        // 特征值为 3, 1, 0 (在 xy 平面旋转 45°).
        let ev = symmetric_eigenvalues(Matrix3::new(2.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0));
        assert!(float_eq(ev[0], 3.0));
        assert!(float_eq(ev[1], 1.0));
        assert!(float_eq(ev[2], 0.0));
    }

    #[test]
    fn test_inertia_eigenvalues_sorted() {
        // 沿 x 方向的杆, 惯性张量为 diag(2, 2, 0).
        let voxels: Vec<Idx3d> = (0..5).map(|x| (0, 0, x)).collect();
        let ev = symmetric_eigenvalues(Moments::of(&voxels).inertia_tensor());
        assert!(float_eq(ev[0], 2.0));
        assert!(float_eq(ev[1], 2.0));
        assert!(float_eq(ev[2], 0.0));
    }

    #[test]
    fn test_measure_cube() {
        let volume = Array3::from_shape_fn((4, 4, 4), |(z, y, x)| (z + y + x) as f64);
        let voxels: Vec<Idx3d> = itertools::iproduct!(1..3, 1..3, 1..3).collect();
        let voxel = VoxelSize::new(0.5, 0.1, 0.1).unwrap();
        let row = measure(1, &voxels, volume.view(), Some(voxel), "cell.tif");

        assert_eq!(row.area, 8);
        assert_eq!(
            [row.bbox_0, row.bbox_1, row.bbox_2, row.bbox_3, row.bbox_4, row.bbox_5],
            [1, 1, 1, 3, 3, 3]
        );
        assert!(float_eq(row.centroid_0, 1.5));
        assert!(float_eq(row.extent, 1.0));
        assert!(float_eq(row.solidity, 1.0));
        assert_eq!((row.min_intensity, row.max_intensity), (3.0, 6.0));
        assert!(float_eq(row.mean_intensity, 4.5));
        // 立方体各向同性.
        assert!(loose_eq(row.major_axis_length, row.minor_axis_length));
        assert!(loose_eq(row.eccentricity, 0.0));
        assert!(float_eq(row.equivalent_diameter, (48.0 / PI).cbrt()));
        assert!(float_eq(row.volume_um3.unwrap(), 8.0 * 0.005));
        assert!(float_eq(row.equivalent_diameter_um.unwrap(), row.equivalent_diameter * 0.5));
        assert_eq!(row.file_name, "cell.tif");
    }

    #[test]
    fn test_measure_rod() {
        let volume = Array3::from_elem((1, 1, 5), 1.0);
        let voxels: Vec<Idx3d> = (0..5).map(|x| (0, 0, x)).collect();
        let row = measure(2, &voxels, volume.view(), None, "rod.tif");
        // x 方向方差为 2, 惯性张量特征值为 2, 2, 0.
        assert!(float_eq(row.major_axis_length, (40.0f64).sqrt()));
        assert!(loose_eq(row.minor_axis_length, 0.0));
        assert!(loose_eq(row.eccentricity, 1.0));
        // 沿列方向延伸.
        assert!(float_eq(row.orientation.abs(), std::f64::consts::FRAC_PI_2));
        assert!(float_eq(row.extent, 1.0));
        assert!(row.volume_um3.is_none());
        assert!(row.equivalent_diameter_um.is_none());
    }
}
