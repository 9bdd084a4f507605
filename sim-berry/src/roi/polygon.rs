use crate::consts::MIN_POLYGON_VERTICES;
use crate::{BerryError, Idx2d, Mask2d, PointXy, Result};

/// 判断共线时的容差.
const COLLINEAR_EPS: f64 = 1e-9;

/// 平面多边形, 顶点按绘制顺序以 `(x, y)` 保存, 自动闭合.
///
/// `x` 对应列 (W 方向), `y` 对应行 (H 方向).
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<PointXy>,
}

impl Polygon {
    /// 创建多边形. 顶点数少于 3 时返回 [`BerryError::MalformedPolygon`].
    pub fn new(vertices: Vec<PointXy>) -> Result<Self> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(BerryError::MalformedPolygon {
                count: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// 全部顶点.
    #[inline]
    pub fn vertices(&self) -> &[PointXy] {
        &self.vertices
    }

    /// 依次迭代所有边 `(起点, 终点)`, 包括最后一个顶点回到第一个顶点的闭合边.
    fn edges(&self) -> impl Iterator<Item = (PointXy, PointXy)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// 点是否在某条边上?
    fn on_boundary(&self, (px, py): PointXy) -> bool {
        self.edges().any(|((x0, y0), (x1, y1))| {
            let cross = (x1 - x0) * (py - y0) - (y1 - y0) * (px - x0);
            cross.abs() <= COLLINEAR_EPS
                && px >= x0.min(x1) - COLLINEAR_EPS
                && px <= x0.max(x1) + COLLINEAR_EPS
                && py >= y0.min(y1) - COLLINEAR_EPS
                && py <= y0.max(y1) + COLLINEAR_EPS
        })
    }

    /// 点是否在多边形内部或边上? 内部按奇偶规则判定.
    pub fn contains(&self, point: PointXy) -> bool {
        if self.on_boundary(point) {
            return true;
        }
        let (px, py) = point;
        self.edges()
            .filter(|&((x0, y0), (x1, y1))| {
                (y0 > py) != (y1 > py) && px < (x1 - x0) * (py - y0) / (y1 - y0) + x0
            })
            .count()
            % 2
            == 1
    }

    /// 在 `(H, W)` 网格上光栅化. 像素 `(r, c)` 以其中心 `(x = c, y = r)`
    /// 参与判定, 落在边上的像素视为内部.
    ///
    /// 超出网格的部分被裁掉.
    pub fn rasterize(&self, shape: Idx2d) -> Mask2d {
        let (height, width) = shape;
        let (lo_x, hi_x, lo_y, hi_y) = self.vertices.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(lx, hx, ly, hy), &(x, y)| (lx.min(x), hx.max(x), ly.min(y), hy.max(y)),
        );
        let clip = |lo: f64, hi: f64, len: usize| -> Option<(usize, usize)> {
            if len == 0 || !lo.is_finite() || !hi.is_finite() {
                return None;
            }
            let lo = lo.ceil().max(0.0);
            let hi = hi.floor().min((len - 1) as f64);
            (lo <= hi).then_some((lo as usize, hi as usize))
        };

        let (Some((c0, c1)), Some((r0, r1))) = (clip(lo_x, hi_x, width), clip(lo_y, hi_y, height))
        else {
            return Mask2d::from_fn(shape, |_| false);
        };
        let inside = itertools::iproduct!(r0..=r1, c0..=c1)
            .filter(|&(r, c)| self.contains((c as f64, r as f64)));
        Mask2d::from_positions(shape, inside)
    }
}
