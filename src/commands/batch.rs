//! # batch 子命令实现
//!
//! 从 CSV 读取任务，批量计算后导出全部成功结果，并汇总失败任务。
//!
//! ## 依赖关系
//! - 使用 `cli/batch.rs` 定义的 BatchArgs
//! - 使用 `xraylab::batch` 读取输入与调度
//! - 使用 `xraylab::xray::export` 导出

use crate::cli::batch::BatchArgs;
use crate::cli::OutputFormat;

use anyhow::{bail, Context, Result};
use std::path::Path;
use xraylab::batch::input;
use xraylab::utils::output;
use xraylab::xray::{export, PRIORITY_ELEMENTS};
use xraylab::{BatchConfig, XrayEngine};

/// 执行 batch
pub fn execute(args: BatchArgs, data_dir: &Path) -> Result<()> {
    output::print_header("Batch X-ray Property Calculation");

    let format = match args.format.or_else(|| OutputFormat::from_path(&args.output)) {
        Some(OutputFormat::Table) => bail!("batch output must be csv or json"),
        Some(format) => format,
        None => OutputFormat::Csv,
    };
    let fields = export::select_fields(Some(args.fields.as_slice()))?;

    let records = input::read_jobs_from_path(&args.input)
        .with_context(|| format!("cannot read batch input '{}'", args.input.display()))?;
    if records.is_empty() {
        output::print_warning(&format!("No jobs found in '{}'", args.input.display()));
        return Ok(());
    }
    output::print_info(&format!(
        "Loaded {} jobs from '{}'",
        records.len(),
        args.input.display()
    ));

    let mut config = BatchConfig::default()
        .with_chunk_size(args.chunk_size)
        .with_parallel_threshold(args.parallel_threshold)
        .with_progress(!args.no_progress);
    if let Some(workers) = args.workers {
        config = config.with_max_workers(workers);
    }
    if let Some(mb) = args.memory_limit_mb {
        config = config.with_memory_limit(mb * 1024 * 1024);
    }

    let engine = XrayEngine::from_data_dir(data_dir);
    output::print_info(&format!("Element data: {}", engine.cache().source_description()));

    if args.warm_common {
        let loaded = engine
            .cache()
            .warm_priority_set(PRIORITY_ELEMENTS.iter().copied());
        output::print_info(&format!("Preloaded {} common elements", loaded));
    }

    let report = engine.run_records(records, &config)?;
    output::print_info(&format!(
        "Executed {} jobs ({}, {} chunks) in {:.2?}",
        report.len(),
        report.stats.mode,
        report.stats.chunks,
        report.stats.elapsed
    ));

    let successes: Vec<_> = report.successes().map(|(_, r)| r).collect();
    if successes.is_empty() {
        output::print_warning("No successful calculations, nothing written");
    } else {
        match format {
            OutputFormat::Json => {
                export::to_json(successes.iter().copied(), &args.output, &fields)?
            }
            _ => export::to_csv(
                successes.iter().copied(),
                &args.output,
                &fields,
                args.precision,
            )?,
        }
        output::print_success(&format!(
            "Saved {} results to '{}'",
            successes.len(),
            args.output.display()
        ));
    }

    // 打印统计
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} failed",
        report.stats.succeeded, report.stats.failed
    ));

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        output::print_warning("Failed jobs:");
        for (key, err) in failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", key, err));
        }
        if failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", failures.len() - 10));
        }
    }

    let stats = engine.cache_stats();
    output::print_info(&format!(
        "Cache: {} elements, hit rate {:.1}%",
        stats.cached_elements,
        stats.hit_rate() * 100.0
    ));

    if let Some(e) = &report.aborted {
        bail!(
            "batch stopped early, {} jobs not submitted: {}",
            report.stats.unsubmitted,
            e
        );
    }
    Ok(())
}
