// apps/gc_cli/src/commands/mod.rs

//! 子命令

pub mod compare;
pub mod convert;
pub mod info;
pub mod keys;

use anyhow::{Context, Result};
use gc_crs::{Crs, GeodeticEngine};

/// 解析命令行给出的 CRS 输入
///
/// 纯数字按 EPSG 代码处理，其余按字符串分派
pub(crate) fn parse_input<E: GeodeticEngine>(input: &str, engine: &E) -> Result<Crs> {
    let crs = match input.trim().parse::<i64>() {
        Ok(code) => Crs::from_user_input(code, engine),
        Err(_) => Crs::from_user_input(input, engine),
    };
    crs.with_context(|| format!("无法解析 CRS 输入: {input}"))
}

/// 以缩进 JSON 打印
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
