//! 数据集操作.
//!
//! 数据按细胞组织, 每个细胞一个目录:
//!
//! ```text
//! {root}/
//!   cell_01/
//!     xxx_recon.tif          重建分辨率堆栈
//!     xxx_ori.tif            原始分辨率堆栈
//!     recon_mask_01.tif      以下由 ROI 掩膜流程生成
//!     ori_mask_01.tif
//!     mask2d_recon_01.tif
//!     mask2d_ori_01.tif
//!     mask_01_vertices.json
//!   cell_02/
//!     ...
//! ```

use std::path::{Path, PathBuf};

mod groups;
pub mod naming;

pub use groups::{discover_groups, find_cell_pair, group_loader, is_processed, GroupLoader, RoiGroup};
pub use naming::FilenameBuilder;

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}
