use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Polygon;
use crate::Result;

/// 多边形顶点记录, 对应 `mask_NN_vertices.json`:
///
/// ```json
/// {
///   "vertices_xy": [[x0, y0], [x1, y1], ...]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// 按绘制顺序排列的 `[x, y]` 顶点.
    pub vertices_xy: Vec<[f64; 2]>,
}

impl From<&Polygon> for VertexRecord {
    fn from(polygon: &Polygon) -> Self {
        Self {
            vertices_xy: polygon.vertices().iter().map(|&(x, y)| [x, y]).collect(),
        }
    }
}

impl VertexRecord {
    /// 读取顶点记录.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 以缩进格式写出顶点记录.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// 还原为多边形. 顶点不足 3 个时返回错误.
    pub fn to_polygon(&self) -> Result<Polygon> {
        Polygon::new(self.vertices_xy.iter().map(|&[x, y]| (x, y)).collect())
    }
}
