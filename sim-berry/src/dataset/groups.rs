//! 细胞目录的发现与配对.

use std::fs;
use std::path::{Path, PathBuf};

use super::naming::{self, ORI_MASKED_PREFIX, ORI_STACK_SUFFIX, RECON_STACK_SUFFIX};
use crate::{BerryError, Result};

/// 同一个 ROI 的全部配套文件.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoiGroup {
    /// ROI 后缀, 即文件名最后一个 `_` 之后的部分, 例如 `"01.tif"`.
    pub suffix: String,
    /// 掩膜后的原始分辨率堆栈.
    pub ori_masked: PathBuf,
    /// 掩膜后的重建分辨率堆栈.
    pub recon_masked: PathBuf,
    /// 原始分辨率二维掩膜.
    pub mask2d_ori: PathBuf,
    /// 重建分辨率二维掩膜.
    pub mask2d_recon: PathBuf,
    /// 多边形顶点记录. 旧数据可能没有.
    pub vertices: Option<PathBuf>,
}

/// 目录下的全部文件名 (不含子目录), 按字典序排列.
fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut ans = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            ans.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    ans.sort_unstable();
    Ok(ans)
}

/// 在细胞目录中找到唯一的 `*recon.tif` 和 `*ori.tif` (大小写不敏感).
///
/// 返回 `(recon, ori)`. 任何一种文件数量不为 1 时返回 [`BerryError::MissingStack`].
pub fn find_cell_pair<P: AsRef<Path>>(dir: P) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    let names = file_names(dir)?;
    let find = |suffix: &'static str| -> Result<PathBuf> {
        let found: Vec<&String> = names
            .iter()
            .filter(|n| n.to_lowercase().ends_with(suffix))
            .collect();
        match found.as_slice() {
            [one] => Ok(dir.join(one)),
            _ => Err(BerryError::MissingStack {
                dir: dir.to_path_buf(),
                suffix,
                found: found.len(),
            }),
        }
    };
    Ok((find(RECON_STACK_SUFFIX)?, find(ORI_STACK_SUFFIX)?))
}

/// 细胞目录是否已处理过? 已处理的目录中存在 `.json` 文件 (顶点记录).
pub fn is_processed<P: AsRef<Path>>(dir: P) -> Result<bool> {
    Ok(file_names(dir.as_ref())?
        .iter()
        .any(|n| n.to_lowercase().ends_with(".json")))
}

/// 以每个 `ori_mask*` 文件为锚点, 按相同的 ROI 后缀寻找配套文件.
/// 锚点与配套文件的匹配都不区分大小写.
///
/// 结果按锚点文件名排序. 缺少任意一个必需的配套文件时返回
/// [`BerryError::MissingCompanion`], 其中的路径为按命名约定期望的文件.
pub fn discover_groups<P: AsRef<Path>>(dir: P) -> Result<Vec<RoiGroup>> {
    let dir = dir.as_ref();
    let names = file_names(dir)?;

    let mut groups = Vec::new();
    for anchor in names
        .iter()
        .filter(|n| n.to_lowercase().starts_with(ORI_MASKED_PREFIX))
    {
        let Some(suffix) = naming::roi_suffix(anchor) else {
            continue;
        };
        let companion = |role: &'static str| -> Result<PathBuf> {
            let pattern = format!("{role}_{suffix}");
            let lower = pattern.to_lowercase();
            names
                .iter()
                .find(|n| n.to_lowercase().ends_with(&lower))
                .map(|n| dir.join(n))
                .ok_or_else(|| BerryError::MissingCompanion {
                    role,
                    path: dir.join(&pattern),
                })
        };

        let vertices = naming::parse_roi_id(suffix)
            .map(|id| dir.join(naming::vertices_name(id)))
            .filter(|p| p.is_file());
        groups.push(RoiGroup {
            suffix: suffix.to_string(),
            ori_masked: dir.join(anchor),
            recon_masked: companion("recon_mask")?,
            mask2d_ori: companion("mask2d_ori")?,
            mask2d_recon: companion("mask2d_recon")?,
            vertices,
        });
    }
    log::debug!("Found {} ROI group(s) in {}", groups.len(), dir.display());
    Ok(groups)
}

/// 依次处理根目录下每个细胞子目录的 ROI 组加载器.
///
/// 子目录按名称排序. 每次迭代返回 `(子目录, 该目录的 ROI 组)`;
/// 单个目录出错不会中断迭代.
pub fn group_loader<P: AsRef<Path>>(root: P) -> Result<GroupLoader> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root.as_ref())? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort_unstable();
    dirs.reverse();
    Ok(GroupLoader { dirs_rev: dirs })
}

/// 见 [`group_loader`].
#[derive(Debug)]
pub struct GroupLoader {
    dirs_rev: Vec<PathBuf>,
}

impl Iterator for GroupLoader {
    type Item = (PathBuf, Result<Vec<RoiGroup>>);

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.dirs_rev.pop()?;
        let groups = discover_groups(&dir);
        Some((dir, groups))
    }
}

impl ExactSizeIterator for GroupLoader {
    #[inline]
    fn len(&self) -> usize {
        self.dirs_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, names: &[&str]) {
        for n in names {
            File::create(dir.join(n)).unwrap();
        }
    }

    #[test]
    fn test_find_cell_pair() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["cell_recon.tif", "cell_ORI.tif", "recon_mask_01.tif"]);
        let (recon, ori) = find_cell_pair(dir.path()).unwrap();
        assert_eq!(recon, dir.path().join("cell_recon.tif"));
        assert_eq!(ori, dir.path().join("cell_ORI.tif"));

        touch(dir.path(), &["other_recon.tif"]);
        assert!(matches!(
            find_cell_pair(dir.path()),
            Err(BerryError::MissingStack { found: 2, suffix: "recon.tif", .. })
        ));
    }

    #[test]
    fn test_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a_recon.tif"]);
        assert!(!is_processed(dir.path()).unwrap());
        touch(dir.path(), &["mask_01_vertices.JSON"]);
        assert!(is_processed(dir.path()).unwrap());
    }

    #[test]
    fn test_discover_groups() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "ori_mask_02.tif",
                "recon_mask_02.tif",
                "mask2d_ori_02.tif",
                "mask2d_recon_02.tif",
                "ori_mask_01.tif",
                "recon_mask_01.tif",
                "mask2d_ori_01.tif",
                "mask2d_recon_01.tif",
                "mask_01_vertices.json",
            ],
        );
        let groups = discover_groups(dir.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].suffix, "01.tif");
        assert_eq!(groups[0].recon_masked, dir.path().join("recon_mask_01.tif"));
        assert_eq!(
            groups[0].vertices,
            Some(dir.path().join("mask_01_vertices.json"))
        );
        assert_eq!(groups[1].mask2d_recon, dir.path().join("mask2d_recon_02.tif"));
        assert_eq!(groups[1].vertices, None);
    }

    #[test]
    fn test_discover_groups_upper_case() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "ORI_MASK_01.tif",
                "RECON_MASK_01.tif",
                "MASK2D_ORI_01.tif",
                "MASK2D_RECON_01.tif",
            ],
        );
        let groups = discover_groups(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ori_masked, dir.path().join("ORI_MASK_01.tif"));
        assert_eq!(groups[0].recon_masked, dir.path().join("RECON_MASK_01.tif"));
        assert_eq!(groups[0].mask2d_ori, dir.path().join("MASK2D_ORI_01.tif"));
        assert_eq!(groups[0].mask2d_recon, dir.path().join("MASK2D_RECON_01.tif"));
    }

    #[test]
    fn test_missing_companion() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &["ori_mask_01.tif", "recon_mask_01.tif", "mask2d_recon_01.tif"],
        );
        match discover_groups(dir.path()) {
            Err(BerryError::MissingCompanion { role, path }) => {
                assert_eq!(role, "mask2d_ori");
                assert_eq!(path, dir.path().join("mask2d_ori_01.tif"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_group_loader() {
        let root = tempfile::tempdir().unwrap();
        for cell in ["cell_b", "cell_a"] {
            fs::create_dir(root.path().join(cell)).unwrap();
        }
        touch(&root.path().join("cell_b"), &["ori_mask_01.tif"]);
        touch(root.path(), &["notes.txt"]);

        let loader = group_loader(root.path()).unwrap();
        assert_eq!(loader.len(), 2);
        let items: Vec<_> = loader.collect();
        assert_eq!(items[0].0, root.path().join("cell_a"));
        assert!(items[0].1.as_ref().unwrap().is_empty());
        assert!(items[1].1.is_err());
    }
}
