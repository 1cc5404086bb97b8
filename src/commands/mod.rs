//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/` 与 `xraylab` 库
//! - 子模块: calc, batch, convert, formula, bragg

pub mod batch;
pub mod bragg;
pub mod calc;
pub mod convert;
pub mod formula;

use crate::cli::{Cli, Commands};

use anyhow::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        data_dir, command, ..
    } = cli;

    match command {
        Commands::Calc(args) => calc::execute(args, &data_dir),
        Commands::Batch(args) => batch::execute(args, &data_dir),
        Commands::Convert(args) => convert::execute(args),
        Commands::Formula(args) => formula::execute(args),
        Commands::Bragg(args) => bragg::execute(args),
    }
}
