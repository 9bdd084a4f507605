use std::path::{Path, PathBuf};

use crate::reduce::{normalize_for_display, to_grayscale};
use crate::roi::{Choice, ChoicePrompt, PlaneDisplay};
use crate::spectrum::fft_magnitude;
use crate::{BerryError, ImageStack, Result};

/// 频域检查的结果.
#[derive(Debug, Default)]
pub struct SpectrumReport {
    /// 已经做出选择的文件, 按处理顺序排列. 不包含收到 `q` 的那个文件.
    pub decisions: Vec<(PathBuf, Choice)>,
    /// 无法读取或处理的文件, 以及对应的错误.
    pub failures: Vec<(PathBuf, BerryError)>,
    /// 是否因为用户选择 `q` 而提前结束?
    pub quit: bool,
}

impl SpectrumReport {
    /// 被接受的文件.
    pub fn accepted(&self) -> impl Iterator<Item = &Path> + '_ {
        self.decisions
            .iter()
            .filter(|(_, c)| *c == Choice::Accept)
            .map(|(p, _)| p.as_path())
    }
}

/// 单个文件的显示部分. 出错时该文件被跳过.
fn preview<D: PlaneDisplay + ?Sized>(path: &Path, display: &mut D) -> Result<()> {
    let stack = ImageStack::open(path)?;
    let plane = to_grayscale(stack.data().into_dyn())?;
    let spectrum = fft_magnitude(plane.view());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    display.show(&format!("{stem}_image"), normalize_for_display(plane.view()).view())?;
    display.show(&format!("{stem}_spectrum"), spectrum.view())?;
    Ok(())
}

/// 依次显示每个文件的灰度图与频谱, 并询问用户的选择.
///
/// 单个文件读取或显示失败时记录错误并继续; 用户选择 `q` 时立即停止.
/// 询问本身出错 (例如输入流错误) 时返回错误.
pub fn spectrum_check<P, D, C>(
    files: &[P],
    display: &mut D,
    prompt: &mut C,
) -> Result<SpectrumReport>
where
    P: AsRef<Path>,
    D: PlaneDisplay + ?Sized,
    C: ChoicePrompt + ?Sized,
{
    let mut report = SpectrumReport::default();
    for path in files.iter().map(|p| p.as_ref()) {
        log::info!("Processing: {}", path.display());
        if let Err(e) = preview(path, display) {
            log::warn!("Failed to process {}: {e}", path.display());
            report.failures.push((path.to_path_buf(), e));
            continue;
        }

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match prompt.prompt_choice(&name)? {
            Choice::Quit => {
                log::info!("Quit signal received");
                report.quit = true;
                break;
            }
            choice => report.decisions.push((path.to_path_buf(), choice)),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::{LinePrompt, PngPreview};
    use crate::SampleType;
    use ndarray::Array3;

    #[test]
    fn test_spectrum_check() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = ["a.tif", "b.tif", "c.tif", "d.tif"]
            .iter()
            .map(|n| dir.path().join(n))
            .collect();
        let stack = ImageStack::new(
            Array3::from_shape_fn((2, 8, 8), |(z, h, w)| ((z + h * w) % 7) as f64),
            SampleType::U16,
        );
        stack.save(&files[0]).unwrap();
        stack.save(&files[2]).unwrap();
        stack.save(&files[3]).unwrap();
        // b.tif 不存在.

        let preview_dir = tempfile::tempdir().unwrap();
        let mut display = PngPreview::new(preview_dir.path());
        let mut prompt = LinePrompt::new(&b"y\nq\n"[..], std::io::sink());
        let report = spectrum_check(&files, &mut display, &mut prompt).unwrap();

        assert_eq!(report.decisions, vec![(files[0].clone(), Choice::Accept)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, files[1]);
        assert!(report.quit);
        assert_eq!(report.accepted().collect::<Vec<_>>(), vec![files[0].as_path()]);
        // a 和 c 各两张预览.
        assert_eq!(display.written().len(), 4);
        assert!(preview_dir.path().join("a_spectrum.png").exists());
    }
}
