//! 分析结果.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sim_berry::condensate::FeatureTable;
use sim_berry::dataset::RoiGroup;
use sim_berry::{BerryError, Result};

/// 表达量表中的一行.
#[derive(Serialize)]
struct ExpressionRow<'a> {
    file_name: &'a str,
    expression: f64,
}

/// 一次批量分析的全部结果.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// 成功处理的细胞目录数.
    pub cells: usize,
    /// 全部 ROI 组.
    pub groups: Vec<RoiGroup>,
    /// `(重建分辨率掩膜堆栈, 表达量)`.
    pub expression: Vec<(PathBuf, f64)>,
    /// 凝聚体特征.
    pub table: FeatureTable,
    /// 被跳过的目录或文件.
    pub failures: Vec<(PathBuf, BerryError)>,
}

#[inline]
fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) => format!("{f:.4}"),
        None => "/".to_string(),
    }
}

/// 算术平均. 空输入返回 `None`.
fn mean<I: IntoIterator<Item = f64>>(it: I) -> Option<f64> {
    let (sum, n) = it
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl AnalysisResult {
    /// 将摘要写进 `w` 中.
    pub fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        const S4: &str = "    ";
        let rows = self.table.rows();

        writeln!(w, "Analysis summary:")?;
        writeln!(w, "{S4}Cells: {}", self.cells)?;
        writeln!(w, "{S4}ROIs: {}", self.groups.len())?;
        writeln!(
            w,
            "{S4}Average expression: {}",
            f64_to_display(mean(self.expression.iter().map(|(_, e)| *e)))
        )?;
        writeln!(w, "{S4}Condensates: {}", rows.len())?;
        writeln!(
            w,
            "{S4}Average area: {} voxel(s)",
            f64_to_display(mean(rows.iter().map(|r| r.area as f64)))
        )?;
        writeln!(
            w,
            "{S4}Average solidity: {}",
            f64_to_display(mean(rows.iter().map(|r| r.solidity)))
        )?;
        writeln!(
            w,
            "{S4}Average volume: {} um^3",
            f64_to_display(mean(rows.iter().filter_map(|r| r.volume_um3)))
        )?;
        write!(w, "{S4}Skipped: {}", self.failures.len())?;
        for (path, e) in self.failures.iter() {
            write!(w, "\n{S4}{S4}{}: {e}", path.display())?;
        }
        Ok(())
    }

    /// 打印摘要.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        match self.describe_into(&mut buf) {
            Ok(()) => println!("{}", String::from_utf8_lossy(&buf)),
            Err(e) => log::error!("Failed to describe result: {e}"),
        }
        utils::sep();
    }

    /// 以 CSV 格式保存表达量.
    pub fn save_expression<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for (file, expression) in self.expression.iter() {
            let file_name = file.display().to_string();
            wtr.serialize(ExpressionRow {
                file_name: &file_name,
                expression: *expression,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
