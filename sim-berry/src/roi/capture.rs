//! 交互协作者接口.
//!
//! 画多边形、显示图像和 y/n/q 选择都依赖外部界面, 本模块只约定接口,
//! 并提供可在无界面环境下使用的实现.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use ndarray::ArrayView2;

use super::{Polygon, VertexRecord};
use crate::{ImgWriteVis, Result};

/// 在一张显示平面上获取多边形 ROI.
pub trait PolygonCapture {
    /// 本次需要绘制的 ROI 个数.
    fn roi_count(&mut self) -> Result<usize>;

    /// 获取第 `index` 个 (从 1 开始, 共 `total` 个) 多边形.
    ///
    /// `display` 为已归一化到 `[0, 1]` 的显示平面.
    fn capture_polygon(
        &mut self,
        display: ArrayView2<f64>,
        index: usize,
        total: usize,
    ) -> Result<Polygon>;
}

/// 用户对一个文件的处理选择.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Choice {
    /// 接受 (`y`).
    Accept,
    /// 跳过 (`n`).
    Skip,
    /// 停止处理剩余文件 (`q`).
    Quit,
}

/// 询问用户如何处理 `name`.
pub trait ChoicePrompt {
    /// 返回用户的选择.
    fn prompt_choice(&mut self, name: &str) -> Result<Choice>;
}

/// 显示一张平面.
pub trait PlaneDisplay {
    /// 以 `title` 为标题显示 `plane`.
    fn show(&mut self, title: &str, plane: ArrayView2<f64>) -> Result<()>;
}

/// 按顺序回放事先给定的多边形, 例如从已有的顶点记录复现掩膜.
#[derive(Clone, Debug, Default)]
pub struct RecordedPolygons {
    polygons: Vec<Polygon>,
}

impl RecordedPolygons {
    /// 直接给定多边形.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// 依次读取顶点记录文件.
    pub fn from_records<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let polygons = paths
            .iter()
            .map(|p| VertexRecord::read(p)?.to_polygon())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { polygons })
    }
}

impl PolygonCapture for RecordedPolygons {
    fn roi_count(&mut self) -> Result<usize> {
        Ok(self.polygons.len())
    }

    /// 当 `index` 超出记录个数时 panic.
    fn capture_polygon(
        &mut self,
        _display: ArrayView2<f64>,
        index: usize,
        total: usize,
    ) -> Result<Polygon> {
        assert!(
            (1..=self.polygons.len()).contains(&index),
            "只记录了 {} 个多边形, 但请求第 {index}/{total} 个",
            self.polygons.len()
        );
        Ok(self.polygons[index - 1].clone())
    }
}

/// 逐行读取 `y` / `n` / `q` 的选择器. 无法识别的输入会重新询问,
/// 输入结束视为 `q`.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    /// 从 `input` 读取回答, 向 `output` 写出提示.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ChoicePrompt for LinePrompt<R, W> {
    fn prompt_choice(&mut self, name: &str) -> Result<Choice> {
        let mut line = String::new();
        loop {
            write!(self.output, "{name}: keep [y] / skip [n] / quit [q]? ")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Choice::Quit);
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "y" => return Ok(Choice::Accept),
                "n" => return Ok(Choice::Skip),
                "q" => return Ok(Choice::Quit),
                other => writeln!(self.output, "Unrecognized answer `{other}`")?,
            }
        }
    }
}

/// 把平面以归一化 8-bit PNG 写入目录, 文件名为 `{title}.png`.
#[derive(Clone, Debug)]
pub struct PngPreview {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngPreview {
    /// 输出到 `dir`. 目录必须已存在.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    /// 已写出的文件.
    #[inline]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PlaneDisplay for PngPreview {
    fn show(&mut self, title: &str, plane: ArrayView2<f64>) -> Result<()> {
        let path = self.dir.join(format!("{title}.png"));
        plane.save(&path)?;
        log::debug!("Preview written to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_line_prompt() {
        let input = b"maybe\nY\n n \nq\n";
        let mut out = Vec::new();
        let mut prompt = LinePrompt::new(&input[..], &mut out);
        assert_eq!(prompt.prompt_choice("a.tif").unwrap(), Choice::Accept);
        assert_eq!(prompt.prompt_choice("b.tif").unwrap(), Choice::Skip);
        assert_eq!(prompt.prompt_choice("c.tif").unwrap(), Choice::Quit);
        // 输入耗尽.
        assert_eq!(prompt.prompt_choice("d.tif").unwrap(), Choice::Quit);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unrecognized answer `maybe`"));
        assert_eq!(text.matches("a.tif").count(), 2);
    }

    #[test]
    fn test_recorded_polygons() {
        let tri = Polygon::new(vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]).unwrap();
        let mut capture = RecordedPolygons::new(vec![tri.clone()]);
        assert_eq!(capture.roi_count().unwrap(), 1);
        let plane = Array2::<f64>::zeros((3, 3));
        assert_eq!(capture.capture_polygon(plane.view(), 1, 1).unwrap(), tri);
    }

    #[test]
    fn test_recorded_polygons_from_records() {
        let dir = tempfile::tempdir().unwrap();
        let tri = Polygon::new(vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]).unwrap();
        let quad = Polygon::new(vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]).unwrap();
        let paths = [dir.path().join("a.json"), dir.path().join("b.json")];
        VertexRecord::from(&tri).write(&paths[0]).unwrap();
        VertexRecord::from(&quad).write(&paths[1]).unwrap();

        let mut capture = RecordedPolygons::from_records(&paths).unwrap();
        assert_eq!(capture.roi_count().unwrap(), 2);
        let plane = Array2::<f64>::zeros((4, 4));
        assert_eq!(capture.capture_polygon(plane.view(), 1, 2).unwrap(), tri);
        assert_eq!(capture.capture_polygon(plane.view(), 2, 2).unwrap(), quad);

        let missing = [dir.path().join("c.json")];
        assert!(RecordedPolygons::from_records(&missing).is_err());
    }

    #[test]
    fn test_png_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut preview = PngPreview::new(dir.path());
        preview
            .show("cell_spectrum", Array2::<f64>::eye(4).view())
            .unwrap();
        assert_eq!(preview.written(), &[dir.path().join("cell_spectrum.png")]);
        assert!(preview.written()[0].exists());
    }
}
