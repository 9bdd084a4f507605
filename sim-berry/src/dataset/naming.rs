//! 单个细胞目录内的文件命名约定.
//!
//! ROI 编号 `NN` 从 1 开始, 以两位数字书写.

/// 文件名构造器. 接受 ROI 编号, 获得文件名.
pub type FilenameBuilder = fn(u32) -> String;

/// 原始分辨率掩膜堆栈文件名前缀.
pub const ORI_MASKED_PREFIX: &str = "ori_mask";

/// 重建分辨率的完整堆栈文件名后缀.
pub const RECON_STACK_SUFFIX: &str = "recon.tif";

/// 原始分辨率的完整堆栈文件名后缀.
pub const ORI_STACK_SUFFIX: &str = "ori.tif";

/// `recon_mask_NN.tif`: 掩膜后的重建分辨率堆栈.
pub fn recon_masked_name(id: u32) -> String {
    format!("recon_mask_{id:02}.tif")
}

/// `ori_mask_NN.tif`: 掩膜后的原始分辨率堆栈.
pub fn ori_masked_name(id: u32) -> String {
    format!("{ORI_MASKED_PREFIX}_{id:02}.tif")
}

/// `mask2d_recon_NN.tif`: 重建分辨率二维掩膜.
pub fn mask2d_recon_name(id: u32) -> String {
    format!("mask2d_recon_{id:02}.tif")
}

/// `mask2d_ori_NN.tif`: 原始分辨率二维掩膜.
pub fn mask2d_ori_name(id: u32) -> String {
    format!("mask2d_ori_{id:02}.tif")
}

/// `mask_NN_vertices.json`: 多边形顶点记录.
pub fn vertices_name(id: u32) -> String {
    format!("mask_{id:02}_vertices.json")
}

/// 从文件名中取出 ROI 后缀: 最后一个 `_` 之后的部分, 例如 `"01.tif"`.
///
/// 文件名中没有 `_` 时返回 `None`.
pub fn roi_suffix(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('_').map(|(_, s)| s)
}

/// 从 ROI 后缀中解析编号, 例如 `"07.tif"` 得到 `7`.
pub fn parse_roi_id(suffix: &str) -> Option<u32> {
    let stem = suffix.split_once('.').map_or(suffix, |(s, _)| s);
    stem.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let builders: [FilenameBuilder; 5] = [
            recon_masked_name,
            ori_masked_name,
            mask2d_recon_name,
            mask2d_ori_name,
            vertices_name,
        ];
        let names: Vec<String> = builders.iter().map(|b| b(3)).collect();
        assert_eq!(
            names,
            vec![
                "recon_mask_03.tif",
                "ori_mask_03.tif",
                "mask2d_recon_03.tif",
                "mask2d_ori_03.tif",
                "mask_03_vertices.json"
            ]
        );
        assert_eq!(ori_masked_name(12), "ori_mask_12.tif");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(roi_suffix("ori_mask_01.tif"), Some("01.tif"));
        assert_eq!(roi_suffix("plain.tif"), None);
        assert_eq!(parse_roi_id("01.tif"), Some(1));
        assert_eq!(parse_roi_id("12"), Some(12));
        assert_eq!(parse_roi_id("xx.tif"), None);
    }
}
