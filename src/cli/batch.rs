//! # batch 子命令 CLI 定义
//!
//! 输入 CSV 列为 `formula,density,energy`。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/batch.rs`

use super::OutputFormat;

use clap::Args;
use std::path::PathBuf;

/// batch 子命令参数
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input CSV with columns formula,density,energy
    pub input: PathBuf,

    /// Output file (.csv or .json)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format (inferred from --output extension when omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum number of worker threads (default: CPU count)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Jobs per chunk
    #[arg(long, default_value_t = 100)]
    pub chunk_size: usize,

    /// Memory ceiling in MiB (default: 4096)
    #[arg(long)]
    pub memory_limit_mb: Option<u64>,

    /// Use the worker pool once the batch has at least this many jobs
    #[arg(long, default_value_t = 20)]
    pub parallel_threshold: usize,

    /// Comma-separated subset of output fields
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Number of decimal places in CSV output
    #[arg(long, default_value_t = 6)]
    pub precision: usize,

    /// Preload commonly used elements before the batch starts
    #[arg(long, default_value_t = false)]
    pub warm_common: bool,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
