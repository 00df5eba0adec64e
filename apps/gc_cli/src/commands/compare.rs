// apps/gc_cli/src/commands/compare.rs

//! 等价比较命令
//!
//! 两个 CRS 几何等价时退出码为 0，否则为 1。

use anyhow::{Context, Result};
use clap::Args;
use gc_crs::GeodeticEngine;
use serde_json::json;
use tracing::info;

use super::{parse_input, print_json};
use crate::config::OutputFormat;

/// 比较参数
#[derive(Args)]
pub struct CompareArgs {
    /// 第一个 CRS
    pub first: String,

    /// 第二个 CRS
    pub second: String,
}

/// 执行比较命令，返回是否等价
pub fn execute<E: GeodeticEngine>(args: CompareArgs, engine: &E, output: OutputFormat) -> Result<bool> {
    info!("=== CRS 比较 ({} 引擎) ===", engine.name());

    let first = parse_input(&args.first, engine)?;
    let second = parse_input(&args.second, engine)?;
    let same = first
        .equivalent(&second, engine)
        .context("引擎无法比较这两个 CRS")?;

    match output {
        OutputFormat::Text => println!("{}", if same { "equivalent" } else { "different" }),
        OutputFormat::Json => print_json(&json!({
            "first": first.to_string(),
            "second": second.to_string(),
            "equivalent": same,
        }))?,
    }
    Ok(same)
}
