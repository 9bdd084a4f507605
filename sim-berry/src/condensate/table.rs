//! 凝聚体特征表.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// 一个连通域的全部特征. 字段顺序即 CSV 的列顺序.
///
/// 坐标均按 `(z, y, x)` 排列, `bbox` 的上界不包含在内.
/// 体素尺寸未知时, 物理单位下的两项为 `None`,
/// 在 CSV 中为空单元格, 在 JSON 中为 `null`.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub label: u32,
    pub area: usize,
    #[serde(rename = "bbox-0")]
    pub bbox_0: usize,
    #[serde(rename = "bbox-1")]
    pub bbox_1: usize,
    #[serde(rename = "bbox-2")]
    pub bbox_2: usize,
    #[serde(rename = "bbox-3")]
    pub bbox_3: usize,
    #[serde(rename = "bbox-4")]
    pub bbox_4: usize,
    #[serde(rename = "bbox-5")]
    pub bbox_5: usize,
    #[serde(rename = "centroid-0")]
    pub centroid_0: f64,
    #[serde(rename = "centroid-1")]
    pub centroid_1: f64,
    #[serde(rename = "centroid-2")]
    pub centroid_2: f64,
    pub equivalent_diameter: f64,
    pub extent: f64,
    pub max_intensity: f64,
    pub mean_intensity: f64,
    pub min_intensity: f64,
    pub solidity: f64,
    pub eccentricity: f64,
    pub orientation: f64,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    pub volume_um3: Option<f64>,
    pub equivalent_diameter_um: Option<f64>,
    /// 来源文件.
    pub file_name: String,
}

/// 多个体数据的特征行集合. 拼接时保持原有顺序, 既不丢行也不重复.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl From<Vec<FeatureRow>> for FeatureTable {
    #[inline]
    fn from(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<FeatureTable> for FeatureTable {
    fn from_iter<I: IntoIterator<Item = FeatureTable>>(iter: I) -> Self {
        let mut ans = FeatureTable::default();
        for t in iter {
            ans.append(t);
        }
        ans
    }
}

impl FeatureTable {
    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 判断是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 全部行.
    #[inline]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// 将 `other` 的全部行追加到末尾.
    #[inline]
    pub fn append(&mut self, other: FeatureTable) {
        self.rows.extend(other.rows);
    }

    /// 以 CSV 格式写出, 第一行为表头. 空表不写出任何内容.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows.iter() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 以 CSV 格式保存到 `path`.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }

    /// 以 JSON 数组格式写出.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, &self.rows)?;
        writer.flush()?;
        Ok(())
    }

    /// 以 JSON 格式保存到 `path`.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_json(BufWriter::new(File::create(path)?))
    }
}
