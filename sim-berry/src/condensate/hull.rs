//! 连通域的三维凸包, 用于计算 solidity.
//!
//! 每个表面体素贡献其 6 个面中心 (坐标 ±0.5), 在这些点上构建凸包,
//! 再统计凸包内 (含边界) 的体素中心个数.
//! 所有坐标乘 2 后以 `i64` 表示, 方向判定没有舍入误差.

use std::collections::HashSet;

use crate::Idx3d;

type P3 = [i64; 3];

#[inline]
fn sub(a: P3, b: P3) -> P3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: P3, b: P3) -> P3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot(a: P3, b: P3) -> i64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// `p` 相对平面 `(a, b, c)` 的有向体积 (6 倍四面体体积).
/// 凸包的面按外法向定向, 正值表示 `p` 在面的外侧.
#[inline]
fn orient(a: P3, b: P3, c: P3, p: P3) -> i64 {
    dot(cross(sub(b, a), sub(c, a)), sub(p, a))
}

/// 凸包表面的三角面片集合, 顶点为 `points` 中的下标.
struct Hull<'a> {
    points: &'a [P3],
    faces: Vec<[usize; 3]>,
}

impl<'a> Hull<'a> {
    /// 增量构建. 所有点共面时返回 `None`.
    fn build(points: &'a [P3]) -> Option<Self> {
        let seed = Self::seed(points)?;
        let mut hull = Self {
            points,
            faces: Vec::with_capacity(64),
        };
        hull.init_tetrahedron(seed);
        for i in 0..points.len() {
            if !seed.contains(&i) {
                hull.add_point(i);
            }
        }
        Some(hull)
    }

    /// 选取初始四面体的 4 个顶点.
    fn seed(points: &[P3]) -> Option<[usize; 4]> {
        let i0 = (0..points.len()).min_by_key(|&i| points[i])?;
        let p0 = points[i0];
        let i1 = (0..points.len()).max_by_key(|&i| {
            let d = sub(points[i], p0);
            dot(d, d)
        })?;
        let p1 = points[i1];
        let i2 = (0..points.len()).max_by_key(|&i| {
            let n = cross(sub(p1, p0), sub(points[i], p0));
            dot(n, n)
        })?;
        let p2 = points[i2];
        let i3 = (0..points.len()).max_by_key(|&i| orient(p0, p1, p2, points[i]).abs())?;
        if orient(p0, p1, p2, points[i3]) == 0 {
            return None;
        }
        Some([i0, i1, i2, i3])
    }

    fn init_tetrahedron(&mut self, [a, b, c, d]: [usize; 4]) {
        for (f, opposite) in [([a, b, c], d), ([a, d, b], c), ([b, d, c], a), ([a, c, d], b)] {
            self.push_outward(f, opposite);
        }
    }

    /// 添加面片, 保证 `inner` 位于其内侧.
    fn push_outward(&mut self, [a, b, c]: [usize; 3], inner: usize) {
        let p = self.points;
        if orient(p[a], p[b], p[c], p[inner]) > 0 {
            self.faces.push([a, c, b]);
        } else {
            self.faces.push([a, b, c]);
        }
    }

    fn add_point(&mut self, i: usize) {
        let p = self.points;
        let (visible, kept): (Vec<_>, Vec<_>) = self
            .faces
            .iter()
            .partition(|&&[a, b, c]| orient(p[a], p[b], p[c], p[i]) > 0);
        if visible.is_empty() {
            return;
        }

        let edges: HashSet<(usize, usize)> = visible
            .iter()
            .flat_map(|&&[a, b, c]| [(a, b), (b, c), (c, a)])
            .collect();
        let horizon: Vec<(usize, usize)> = edges
            .iter()
            .copied()
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();

        let mut faces: Vec<[usize; 3]> = kept.into_iter().copied().collect();
        faces.extend(horizon.into_iter().map(|(a, b)| [a, b, i]));
        self.faces = faces;
    }

    /// 点是否在凸包内部或边界上?
    #[inline]
    fn contains(&self, q: P3) -> bool {
        let p = self.points;
        self.faces
            .iter()
            .all(|&[a, b, c]| orient(p[a], p[b], p[c], q) <= 0)
    }
}

/// 计算连通域 `voxels` 的凸包所覆盖的体素个数.
///
/// 只统计连通域包围盒内的体素; 凸包不会越出包围盒.
/// 输入为空或凸包退化时返回 `None`.
pub(crate) fn convex_voxel_count(voxels: &[Idx3d]) -> Option<usize> {
    if voxels.is_empty() {
        return None;
    }
    let occupied: HashSet<Idx3d> = voxels.iter().copied().collect();
    let is_set = |z: i64, h: i64, w: i64| {
        z >= 0 && h >= 0 && w >= 0 && occupied.contains(&(z as usize, h as usize, w as usize))
    };

    const AXES: [P3; 6] = [
        [1, 0, 0],
        [-1, 0, 0],
        [0, 1, 0],
        [0, -1, 0],
        [0, 0, 1],
        [0, 0, -1],
    ];
    let mut points = HashSet::new();
    for &(z, h, w) in voxels {
        let (z, h, w) = (z as i64, h as i64, w as i64);
        let surface = AXES
            .iter()
            .any(|d| !is_set(z + d[0], h + d[1], w + d[2]));
        if surface {
            points.extend(AXES.iter().map(|d| [2 * z + d[0], 2 * h + d[1], 2 * w + d[2]]));
        }
    }
    let points: Vec<P3> = points.into_iter().collect();
    let hull = Hull::build(&points)?;

    let lo = voxels.iter().fold([usize::MAX; 3], |m, &(z, h, w)| {
        [m[0].min(z), m[1].min(h), m[2].min(w)]
    });
    let hi = voxels
        .iter()
        .fold([0usize; 3], |m, &(z, h, w)| [m[0].max(z), m[1].max(h), m[2].max(w)]);
    let count = itertools::iproduct!(lo[0]..=hi[0], lo[1]..=hi[1], lo[2]..=hi[2])
        .filter(|&(z, h, w)| hull.contains([2 * z as i64, 2 * h as i64, 2 * w as i64]))
        .count();
    Some(count)
}
