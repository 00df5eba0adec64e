// apps/gc_cli/src/commands/convert.rs

//! 格式转换命令
//!
//! 把任意 CRS 输入转换为 PROJ4、WKT 或 JSON 参数映射。

use anyhow::Result;
use clap::{Args, ValueEnum};
use gc_crs::{proj4, GeodeticEngine};
use tracing::info;

use super::parse_input;

/// 目标格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    /// PROJ4 参数串
    Proj4,
    /// WKT
    Wkt,
    /// JSON 参数映射
    Json,
}

/// 转换参数
#[derive(Args)]
pub struct ConvertArgs {
    /// CRS 输入
    pub input: String,

    /// 目标格式
    #[arg(short, long, value_enum, default_value_t = TargetFormat::Proj4)]
    pub to: TargetFormat,
}

/// 转换为目标格式文本
fn convert<E: GeodeticEngine>(input: &str, to: TargetFormat, engine: &E) -> Result<String> {
    let crs = parse_input(input, engine)?;
    let text = match to {
        TargetFormat::Proj4 => proj4::render(&crs.to_dict(engine)?),
        TargetFormat::Wkt => crs.wkt(engine)?,
        TargetFormat::Json => serde_json::to_string_pretty(&crs.to_dict(engine)?)?,
    };
    Ok(text)
}

/// 执行转换命令
pub fn execute<E: GeodeticEngine>(args: ConvertArgs, engine: &E) -> Result<()> {
    info!("=== CRS 转换 → {:?} ({} 引擎) ===", args.to, engine.name());
    println!("{}", convert(&args.input, args.to, engine)?);
    Ok(())
}
