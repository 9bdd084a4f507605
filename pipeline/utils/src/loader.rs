//! 对 `sim-berry::dataset` 的更一层封装. 提供更直接的数据集加载器.

use sim_berry::dataset::{self, GroupLoader};
use sim_berry::Result;
use std::env;
use std::path::{Path, PathBuf};

/// 数据根目录环境变量.
pub const DATA_DIR_ENV: &str = "SIM_BERRY_DATA_DIR";

/// 获取数据根目录.
///
/// 1. 若环境变量 `$SIM_BERRY_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/sim`;
/// 3. 无法确定用户主目录时返回 `None`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(DATA_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(["sim"]),
    }
}

/// 获取根目录下各细胞目录的 ROI 组加载器.
#[inline]
pub fn group_loader<P: AsRef<Path>>(root: P) -> Result<GroupLoader> {
    dataset::group_loader(root)
}
