//! # xraylab - X 射线光学性质命令行工具
//!
//! ## 子命令
//! - `calc`    - 单个材料的光学性质
//! - `batch`   - 从 CSV 批量计算
//! - `convert` - 能量/波长换算
//! - `formula` - 化学式组成信息
//! - `bragg`   - Bragg 角计算
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   └── commands/   (命令执行逻辑)
//!         └── xraylab (库: engine, batch, xray, parsers, models)
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;
use xraylab::utils::output;

/// 日志初始化：RUST_LOG 优先，否则按 -v 次数选择级别
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = commands::run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
