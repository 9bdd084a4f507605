//! 程序运行函数.

use std::path::PathBuf;

use log::{info, warn};
use sim_berry::condensate::{detect_batch, BatchMode};
use sim_berry::expression::expression_levels;
use sim_berry::{BerryError, Result};
use utils::config::AnalysisConfig;
use utils::loader;

use crate::result::AnalysisResult;

/// 实际运行: 发现全部 ROI 组, 计算表达量, 再检测每个重建分辨率掩膜堆栈中的凝聚体.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisResult> {
    let root = config.data_dir()?;
    let detector = config.detector()?;
    info!(
        "Analyzing {} with percentile {} on {} core(s)",
        root.display(),
        detector.percentile(),
        utils::cpus()
    );

    let mut result = AnalysisResult::default();
    for (dir, groups) in loader::group_loader(root)? {
        let groups = match groups.and_then(|g| expression_levels(&g).map(|e| (g, e))) {
            Ok(ok) => ok,
            Err(e) => match config.batch_mode {
                BatchMode::FailFast => return Err(e),
                BatchMode::CollectErrors => {
                    warn!("Skipping {}: {e}", dir.display());
                    result.failures.push((dir, e));
                    continue;
                }
            },
        };
        let (groups, levels) = groups;
        if groups.is_empty() {
            warn!("No ROI found in {}", dir.display());
            continue;
        }
        result.cells += 1;
        result.groups.extend(groups);
        result.expression.extend(levels);
    }

    let paths: Vec<PathBuf> = result
        .groups
        .iter()
        .map(|g| g.recon_masked.clone())
        .collect();
    let outcome = detect_batch(&paths, &detector, config.batch_mode)?;
    result.table = outcome.table;
    result.failures.extend(outcome.failures);
    Ok(result)
}

/// 将结果写入输出目录.
pub fn save(config: &AnalysisConfig, result: &AnalysisResult) -> Result<()> {
    let out = config.output_dir()?;
    if !out.is_dir() {
        return Err(BerryError::InvalidParameter {
            name: "output_dir",
            reason: format!("{} 不是目录", out.display()),
        });
    }
    result.save_expression(out.join(&config.expression_csv))?;
    result.table.save_csv(out.join(&config.condensate_csv))?;
    result.table.save_json(out.join(&config.condensate_json))?;
    info!("Results written to {}", out.display());
    Ok(())
}
