//! 分析配置.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sim_berry::condensate::{BatchMode, Detector};
use sim_berry::consts::DEFAULT_PERCENTILE;
use sim_berry::{BerryError, Result, VoxelSize};

use crate::loader;

/// 配置文件环境变量.
pub const CONFIG_ENV: &str = "SIM_BERRY_CONFIG";

/// 一次批量分析的配置. JSON 中缺失的字段取默认值, 例如:
///
/// ```json
/// {
///   "data_dir": "/data/sim/GFP",
///   "percentile": 0.02,
///   "voxel_size": [0.125, 0.03, 0.03],
///   "batch_mode": "collect_errors"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 数据根目录, 其下每个子目录为一个细胞.
    pub data_dir: Option<PathBuf>,
    /// 亮点比例, 位于 `(0, 1]`.
    pub percentile: f64,
    /// 体素尺寸 `[dz, dy, dx]`.
    pub voxel_size: Option<VoxelSize>,
    /// 失败文件的处理方式.
    pub batch_mode: BatchMode,
    /// 输出目录. 缺省时与数据根目录相同.
    pub output_dir: Option<PathBuf>,
    /// 表达量表文件名.
    pub expression_csv: String,
    /// 凝聚体特征表 (CSV) 文件名.
    pub condensate_csv: String,
    /// 凝聚体特征表 (JSON) 文件名.
    pub condensate_json: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            percentile: DEFAULT_PERCENTILE,
            voxel_size: None,
            batch_mode: BatchMode::FailFast,
            output_dir: None,
            expression_csv: "expression.csv".to_string(),
            condensate_csv: "condensates.csv".to_string(),
            condensate_json: "condensates.json".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// 读取 JSON 配置文件.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 按以下顺序确定配置:
    ///
    /// 1. `$SIM_BERRY_CONFIG` 非空时读取该文件, 否则使用默认值;
    /// 2. 若 `data_dir` 仍未指定, 取 `$SIM_BERRY_DATA_DIR` 或 `$HOME/dataset/sim`.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(p) if !p.is_empty() => Self::open(p)?,
            _ => Self::default(),
        };
        if config.data_dir.is_none() {
            config.data_dir = loader::data_dir_from_env_or_home();
        }
        Ok(config)
    }

    /// 数据根目录. 未配置时返回 [`BerryError::InvalidParameter`].
    pub fn data_dir(&self) -> Result<&Path> {
        self.data_dir
            .as_deref()
            .ok_or_else(|| BerryError::InvalidParameter {
                name: "data_dir",
                reason: "无法确定数据根目录".to_string(),
            })
    }

    /// 输出目录.
    pub fn output_dir(&self) -> Result<&Path> {
        match self.output_dir.as_deref() {
            Some(d) => Ok(d),
            None => self.data_dir(),
        }
    }

    /// 按配置构建检测器. 亮点比例非法时返回错误.
    pub fn detector(&self) -> Result<Detector> {
        Ok(Detector::new(self.percentile)?.with_voxel_size(self.voxel_size))
    }
}
