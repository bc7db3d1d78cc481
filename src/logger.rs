//! 日志工具模块
//!
//! 提供全局日志订阅器和日志文件的初始化

use anyhow::Result;
use std::fs;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 过滤级别来自 `RUST_LOG` 环境变量，默认 `info`；
/// 重复调用是空操作，测试中可以放心多次初始化
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题目分布统计日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}
