//! 三维连通域标记.

use std::collections::VecDeque;

use itertools::iproduct;
use ndarray::{Array3, ArrayView3};

use crate::Idx3d;

/// 三维体素的邻接规则.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Connectivity {
    /// 共面邻接, 6 个邻居.
    Face,

    /// 共面或共棱邻接, 18 个邻居.
    Edge,

    /// 共面、共棱或共顶点邻接, 26 个邻居. 凝聚体检测使用该规则.
    #[default]
    Full,
}

impl Connectivity {
    /// 坐标差的绝对值之和上限.
    #[inline]
    const fn max_manhattan(&self) -> i32 {
        match self {
            Connectivity::Face => 1,
            Connectivity::Edge => 2,
            Connectivity::Full => 3,
        }
    }

    /// 全部邻居偏移 `(dz, dh, dw)`.
    pub fn offsets(&self) -> Vec<(isize, isize, isize)> {
        let limit = self.max_manhattan();
        iproduct!(-1..=1, -1..=1, -1..=1)
            .filter(|&(z, h, w): &(i32, i32, i32)| {
                let d = z.abs() + h.abs() + w.abs();
                d != 0 && d <= limit
            })
            .map(|(z, h, w)| (z as isize, h as isize, w as isize))
            .collect()
    }
}

/// 连通域标记结果. 背景为 0, 前景连通域从 1 开始连续编号.
///
/// 编号按连通域中第一个体素的行优先 (z, h, w) 顺序分配.
#[derive(Clone, Debug)]
pub struct LabelVolume {
    labels: Array3<u32>,
    count: u32,
}

impl LabelVolume {
    /// 连通域个数.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// 按标记号收集各连通域的全部体素, 第 `i` 项对应标记 `i + 1`.
    ///
    /// 每个连通域内部的体素按行优先顺序排列.
    pub fn components(&self) -> Vec<Vec<Idx3d>> {
        let mut ans = vec![Vec::new(); self.count as usize];
        for (pos, &label) in self.labels.indexed_iter() {
            if label != 0 {
                ans[label as usize - 1].push(pos);
            }
        }
        ans
    }
}

/// 在 `pos` 处应用偏移, 越界时返回 `None`.
#[inline]
fn shift((z, h, w): Idx3d, (dz, dh, dw): (isize, isize, isize), shape: Idx3d) -> Option<Idx3d> {
    let z = z.checked_add_signed(dz)?;
    let h = h.checked_add_signed(dh)?;
    let w = w.checked_add_signed(dw)?;
    (z < shape.0 && h < shape.1 && w < shape.2).then_some((z, h, w))
}

/// 标记 `foreground` 中的所有连通域.
///
/// 按行优先顺序扫描, 每遇到一个未标记的前景体素, 就从它出发 BFS
/// 标记整个连通域.
pub fn label_components(foreground: ArrayView3<bool>, connectivity: Connectivity) -> LabelVolume {
    let shape = foreground.dim();
    let offsets = connectivity.offsets();
    let mut labels = Array3::<u32>::zeros(shape);
    let mut count = 0u32;
    let mut q = VecDeque::new();

    for (seed, &fg) in foreground.indexed_iter() {
        if !fg || labels[seed] != 0 {
            continue;
        }
        count += 1;
        labels[seed] = count;
        q.push_back(seed);
        while let Some(cur) = q.pop_front() {
            for &off in offsets.iter() {
                let Some(next) = shift(cur, off, shape) else {
                    continue;
                };
                if foreground[next] && labels[next] == 0 {
                    labels[next] = count;
                    q.push_back(next);
                }
            }
        }
    }
    LabelVolume { labels, count }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3×4×4 体数据中两个对角相接 (不共面) 的 2×2×2 方块.
    fn corner_blocks() -> Array3<bool> {
        Array3::from_shape_fn((3, 4, 4), |(z, h, w)| {
            (z < 2 && h < 2 && w < 2) || ((1..3).contains(&z) && h >= 2 && w >= 2)
        })
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Connectivity::Face.offsets().len(), 6);
        assert_eq!(Connectivity::Edge.offsets().len(), 18);
        assert_eq!(Connectivity::Full.offsets().len(), 26);
        assert_eq!(Connectivity::default(), Connectivity::Full);
    }

    #[test]
    fn test_corner_adjacent_blocks() {
        let fg = corner_blocks();
        let full = label_components(fg.view(), Connectivity::Full);
        assert_eq!(full.count(), 1);
        assert_eq!(full.components()[0].len(), 16);

        let face = label_components(fg.view(), Connectivity::Face);
        assert_eq!(face.count(), 2);
        let comps = face.components();
        assert_eq!(comps[0].len(), 8);
        assert_eq!(comps[1].len(), 8);
        // 先扫描到的方块编号为 1.
        assert_eq!(comps[0][0], (0, 0, 0));
        assert!(comps[1].contains(&(2, 3, 3)));
    }

    #[test]
    fn test_edge_connectivity() {
        // 两个体素只共一条棱.
        let mut fg = Array3::from_elem((1, 2, 2), false);
        fg[(0, 0, 0)] = true;
        fg[(0, 1, 1)] = true;
        assert_eq!(label_components(fg.view(), Connectivity::Face).count(), 2);
        assert_eq!(label_components(fg.view(), Connectivity::Edge).count(), 1);
    }

    #[test]
    fn test_empty_foreground() {
        let fg = Array3::from_elem((2, 2, 2), false);
        let labels = label_components(fg.view(), Connectivity::Full);
        assert_eq!(labels.count(), 0);
        assert!(labels.components().is_empty());
    }
}
