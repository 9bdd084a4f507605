//! 分析流程依赖的通用组件.

use std::str::FromStr;

use log::LevelFilter;

pub mod config;
pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 日志级别环境变量.
pub const LOG_ENV: &str = "SIM_BERRY_LOG";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 解析日志级别, 无法识别时返回 `Info`.
fn parse_level(s: Option<&str>) -> LevelFilter {
    s.and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// 安装 `simple_logger`. 级别取自 `$SIM_BERRY_LOG` (例如 `debug`), 默认为 `info`.
///
/// 重复安装时返回错误.
pub fn init_logger() -> Result<(), log::SetLoggerError> {
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    simple_logger::SimpleLogger::new().with_level(level).init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Info);
    }

    #[test]
    fn test_cpus() {
        assert!(cpus() >= 1);
    }
}
