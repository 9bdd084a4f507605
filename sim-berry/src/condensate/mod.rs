//! 凝聚体 (condensate) 检测与形态学测量.
//!
//! 对一个已掩膜的体数据:
//!
//! 1. 在全部严格为正的体素上求 `(1 - percentile) * 100` 分位数作为阈值;
//! 2. 不低于阈值的体素为前景;
//! 3. 按 26-邻接规则标记三维连通域;
//! 4. 对每个连通域测量几何与强度特征, 强度取自阈值化之前的数据.

use std::path::{Path, PathBuf};

use ndarray::ArrayView3;
use ordered_float::OrderedFloat;

use crate::{BerryError, ImageStack, Result, VoxelSize};

mod hull;
mod label;
mod props;
mod table;

pub use label::{label_components, Connectivity, LabelVolume};
pub use table::{FeatureRow, FeatureTable};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 检查亮点比例是否位于 `(0, 1]`.
fn check_percentile(percentile: f64) -> Result<()> {
    if percentile > 0.0 && percentile <= 1.0 {
        Ok(())
    } else {
        Err(BerryError::InvalidParameter {
            name: "percentile",
            reason: format!("必须位于 (0, 1], 实际为 {percentile}"),
        })
    }
}

/// 计算前景阈值: 严格为正的体素的 `(1 - percentile) * 100` 分位数,
/// 在相邻秩之间线性插值.
///
/// # 错误
///
/// - `percentile` 不在 `(0, 1]` 内时返回 [`BerryError::InvalidParameter`];
/// - 没有严格为正的体素时返回 [`BerryError::EmptyInput`].
pub fn percentile_threshold(volume: ArrayView3<f64>, percentile: f64) -> Result<f64> {
    check_percentile(percentile)?;
    let mut positive: Vec<f64> = volume.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return Err(BerryError::EmptyInput {
            what: "严格为正的体素",
        });
    }
    positive.sort_unstable_by_key(|v| OrderedFloat(*v));

    let rank = (1.0 - percentile) * (positive.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (a, b) = (positive[lo], positive[hi]);
    Ok(a + (b - a) * (rank - lo as f64))
}

/// 凝聚体检测器.
#[derive(Copy, Clone, Debug)]
pub struct Detector {
    percentile: f64,
    voxel_size: Option<VoxelSize>,
    connectivity: Connectivity,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            percentile: crate::consts::DEFAULT_PERCENTILE,
            voxel_size: None,
            connectivity: Connectivity::Full,
        }
    }
}

impl Detector {
    /// 以亮点比例 `percentile` 创建检测器, 使用 26-邻接.
    pub fn new(percentile: f64) -> Result<Self> {
        check_percentile(percentile)?;
        Ok(Self {
            percentile,
            ..Default::default()
        })
    }

    /// 提供体素尺寸后, 特征表会额外给出物理单位下的体积和等效直径.
    #[inline]
    pub fn with_voxel_size(mut self, voxel_size: Option<VoxelSize>) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// 更换邻接规则.
    #[inline]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// 亮点比例.
    #[inline]
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// 检测 `volume` 中的全部凝聚体, 每行都标记来源 `file_name`.
    pub fn detect(&self, volume: ArrayView3<f64>, file_name: &str) -> Result<FeatureTable> {
        let threshold = percentile_threshold(volume, self.percentile)?;
        let foreground = volume.mapv(|v| v >= threshold);
        let labels = label_components(foreground.view(), self.connectivity);
        log::debug!(
            "{file_name}: threshold {threshold:.3}, {} component(s)",
            labels.count()
        );

        let rows = labels
            .components()
            .iter()
            .enumerate()
            .map(|(i, voxels)| {
                props::measure(i as u32 + 1, voxels, volume, self.voxel_size, file_name)
            })
            .collect::<Vec<_>>();
        Ok(FeatureTable::from(rows))
    }

    /// 打开堆栈文件并检测. 来源标记为文件路径.
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> Result<FeatureTable> {
        let path = path.as_ref();
        let stack = ImageStack::open(path)?;
        let table = self.detect(stack.data(), &path.display().to_string())?;
        log::info!("{}: {} condensate(s)", path.display(), table.len());
        Ok(table)
    }
}

/// 以 26-邻接检测 `volume` 中的凝聚体.
///
/// 等价于 `Detector::new(percentile)?.with_voxel_size(voxel_size).detect(volume, file_name)`.
pub fn detect(
    volume: ArrayView3<f64>,
    percentile: f64,
    voxel_size: Option<VoxelSize>,
    file_name: &str,
) -> Result<FeatureTable> {
    Detector::new(percentile)?
        .with_voxel_size(voxel_size)
        .detect(volume, file_name)
}

/// 批量检测时遇到失败文件的处理方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// 遇到第一个失败的文件立即返回该错误.
    #[default]
    FailFast,

    /// 跳过失败的文件, 在结果中一并返回它们的错误.
    CollectErrors,
}

/// 批量检测的结果.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 按输入顺序拼接的特征表.
    pub table: FeatureTable,
    /// 失败的文件及其错误, 按输入顺序排列. `FailFast` 模式下总为空.
    pub failures: Vec<(PathBuf, BerryError)>,
}

impl BatchOutcome {
    /// 所有文件都成功了吗?
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 依次检测 `paths` 中的每个堆栈文件, 按输入顺序拼接结果.
///
/// 启用 `rayon` feature 时各文件并行检测, 结果顺序不变.
///
/// `FailFast` 模式下遇到错误即停止调度剩余文件. 串行时返回第一个失败文件的错误;
/// 并行时返回的可能是任意一个失败文件的错误.
pub fn detect_batch<P: AsRef<Path> + Sync>(
    paths: &[P],
    detector: &Detector,
    mode: BatchMode,
) -> Result<BatchOutcome> {
    if mode == BatchMode::FailFast {
        return detect_all(paths, detector).map(|table| BatchOutcome {
            table,
            failures: Vec::new(),
        });
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            let results: Vec<Result<FeatureTable>> =
                paths.par_iter().map(|p| detector.detect_file(p)).collect();
        } else {
            let results: Vec<Result<FeatureTable>> =
                paths.iter().map(|p| detector.detect_file(p)).collect();
        }
    }

    let mut outcome = BatchOutcome::default();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(table) => outcome.table.append(table),
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.as_ref().display());
                outcome.failures.push((path.as_ref().to_path_buf(), e));
            }
        }
    }
    Ok(outcome)
}

/// 检测全部文件, 任一失败即返回.
fn detect_all<P: AsRef<Path> + Sync>(paths: &[P], detector: &Detector) -> Result<FeatureTable> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            let tables = paths
                .par_iter()
                .map(|p| detector.detect_file(p))
                .collect::<Result<Vec<FeatureTable>>>()?;
        } else {
            let tables = paths
                .iter()
                .map(|p| detector.detect_file(p))
                .collect::<Result<Vec<FeatureTable>>>()?;
        }
    }
    Ok(tables.into_iter().collect())
}
