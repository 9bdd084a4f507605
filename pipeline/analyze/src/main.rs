//! 批量分析: 表达量与凝聚体特征.
//!
//! 配置见 `utils::config::AnalysisConfig`; 日志级别由 `$SIM_BERRY_LOG` 控制.

mod result;
mod runner;

use utils::config::AnalysisConfig;

fn main() -> sim_berry::Result<()> {
    if let Err(e) = utils::init_logger() {
        eprintln!("Failed to install logger: {e}");
    }

    let config = AnalysisConfig::from_env()?;
    let result = runner::run(&config)?;
    result.analyze();
    runner::save(&config, &result)
}
