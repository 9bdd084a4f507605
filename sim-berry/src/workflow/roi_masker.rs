use std::path::Path;

use crate::dataset::{find_cell_pair, is_processed, naming, RoiGroup};
use crate::propagate::{apply_mask, resample_mask};
use crate::reduce::{max_projection, normalize_for_display};
use crate::roi::{PolygonCapture, VertexRecord};
use crate::{BerryError, ImageStack, ImgWriteRaw, Result, StackAttr};

/// 为一个细胞目录生成全部 ROI 文件.
///
/// 流程:
///
/// 1. 目录中已有 `.json` 文件时视为已处理, 返回 `Ok(None)`;
/// 2. 读取唯一的 `*recon.tif` 和 `*ori.tif`;
/// 3. 在重建堆栈的最大投影上依次获取 `capture.roi_count()` 个多边形;
/// 4. 每个多边形在重建网格上光栅化并作用于重建堆栈, 再最近邻缩放到原始网格并作用于原始堆栈;
/// 5. 写出 `recon_mask_NN.tif`, `mask2d_recon_NN.tif`, `ori_mask_NN.tif`,
///   `mask2d_ori_NN.tif` 和 `mask_NN_vertices.json`.
///
/// 掩膜后的堆栈保持原有元素类型.
///
/// # 错误
///
/// - ROI 个数为 0 时返回 [`BerryError::InvalidParameter`];
/// - 文件查找、读写以及多边形获取的错误原样返回.
pub fn mask_cell<P, C>(dir: P, capture: &mut C) -> Result<Option<Vec<RoiGroup>>>
where
    P: AsRef<Path>,
    C: PolygonCapture + ?Sized,
{
    let dir = dir.as_ref();
    log::info!("Processing: {}", dir.display());
    if is_processed(dir)? {
        log::info!("{} is already processed", dir.display());
        return Ok(None);
    }

    let (recon_path, ori_path) = find_cell_pair(dir)?;
    let recon = ImageStack::open(&recon_path)?;
    let ori = ImageStack::open(&ori_path)?;
    let (ori_h, ori_w) = ori.slice_shape();
    log::debug!(
        "recon {:?} {}, ori {:?} {}",
        recon.shape(),
        recon.sample_type(),
        ori.shape(),
        ori.sample_type()
    );

    let display = normalize_for_display(max_projection(recon.data()).view());

    let total = capture.roi_count()?;
    if total == 0 {
        return Err(BerryError::InvalidParameter {
            name: "roi_count",
            reason: "至少需要绘制 1 个掩膜".to_string(),
        });
    }

    let mut groups = Vec::with_capacity(total);
    for i in 1..=total {
        let id = i as u32;
        let polygon = capture.capture_polygon(display.view(), i, total)?;

        let mask_recon = polygon.rasterize(recon.slice_shape());
        if mask_recon.is_empty() {
            log::warn!("Mask {i}/{total} covers no pixel on recon grid");
        }
        let recon_masked = dir.join(naming::recon_masked_name(id));
        let mask2d_recon = dir.join(naming::mask2d_recon_name(id));
        apply_mask(&recon, &mask_recon).save(&recon_masked)?;
        mask_recon.save_raw(&mask2d_recon)?;

        let mask_ori = resample_mask(&mask_recon, ori_h, ori_w);
        let ori_masked = dir.join(naming::ori_masked_name(id));
        let mask2d_ori = dir.join(naming::mask2d_ori_name(id));
        apply_mask(&ori, &mask_ori).save(&ori_masked)?;
        mask_ori.save_raw(&mask2d_ori)?;

        let vertices = dir.join(naming::vertices_name(id));
        VertexRecord::from(&polygon).write(&vertices)?;

        log::info!(
            "Mask {i}/{total} completed: {} pixel(s) on recon grid, {} on ori grid",
            mask_recon.count(),
            mask_ori.count()
        );
        groups.push(RoiGroup {
            suffix: format!("{id:02}.tif"),
            ori_masked,
            recon_masked,
            mask2d_ori,
            mask2d_recon,
            vertices: Some(vertices),
        });
    }
    Ok(Some(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::discover_groups;
    use crate::roi::{Polygon, RecordedPolygons};
    use crate::{Mask2d, SampleType};
    use ndarray::Array3;

    fn write_cell(dir: &Path) {
        let recon = Array3::from_shape_fn((2, 8, 8), |(z, h, w)| (z * 64 + h * 8 + w + 1) as f64);
        ImageStack::new(recon, SampleType::U16)
            .save(dir.join("c1_recon.tif"))
            .unwrap();
        let ori = Array3::from_shape_fn((3, 4, 4), |(z, h, w)| (z * 16 + h * 4 + w + 1) as f64);
        ImageStack::new(ori, SampleType::U8)
            .save(dir.join("c1_ori.tif"))
            .unwrap();
    }

    #[test]
    fn test_mask_cell() {
        let dir = tempfile::tempdir().unwrap();
        write_cell(dir.path());
        // 重建网格上覆盖行列 2..=5 的正方形.
        let square = Polygon::new(vec![(2.0, 2.0), (5.0, 2.0), (5.0, 5.0), (2.0, 5.0)]).unwrap();
        let mut capture = RecordedPolygons::new(vec![square]);

        let groups = mask_cell(dir.path(), &mut capture).unwrap().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(discover_groups(dir.path()).unwrap(), groups);

        let recon_mask = Mask2d::open(&groups[0].mask2d_recon).unwrap();
        assert_eq!(recon_mask.count(), 16);
        let ori_mask = Mask2d::open(&groups[0].mask2d_ori).unwrap();
        assert_eq!(ori_mask.positions(), vec![(1, 1), (1, 2), (2, 1), (2, 2)]);

        let ori_masked = ImageStack::open(&groups[0].ori_masked).unwrap();
        assert_eq!(ori_masked.sample_type(), SampleType::U8);
        assert_eq!(ori_masked.shape(), (3, 4, 4));
        assert_eq!(ori_masked[(0, 0, 0)], 0.0);
        assert_eq!(ori_masked[(2, 1, 1)], 38.0);

        // 第二次运行时跳过.
        let mut capture = RecordedPolygons::default();
        assert!(mask_cell(dir.path(), &mut capture).unwrap().is_none());
    }

    #[test]
    fn test_zero_roi_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_cell(dir.path());
        let mut capture = RecordedPolygons::default();
        assert!(matches!(
            mask_cell(dir.path(), &mut capture),
            Err(BerryError::InvalidParameter { name: "roi_count", .. })
        ));
    }
}
