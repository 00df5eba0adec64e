// apps/gc_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示 CRS 的输入语法、类别、EPSG 代码、参数与 WKT。

use anyhow::Result;
use clap::Args;
use gc_crs::{classify, Crs, GeodeticEngine, ParamMap};
use serde::Serialize;
use tracing::{info, warn};

use super::{parse_input, print_json};
use crate::config::OutputFormat;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// CRS 输入（EPSG 代码、`EPSG:n`、PROJ4、WKT 或 JSON）
    pub input: String,

    /// 不输出 WKT
    #[arg(long)]
    pub no_wkt: bool,
}

/// CRS 信息
#[derive(Debug, Serialize)]
struct CrsReport {
    grammar: &'static str,
    geographic: bool,
    projected: bool,
    epsg: Option<u32>,
    parameters: ParamMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    wkt: Option<String>,
}

impl CrsReport {
    fn collect<E: GeodeticEngine>(input: &str, crs: &Crs, engine: &E, with_wkt: bool) -> Result<Self> {
        let wkt = if with_wkt {
            match crs.wkt(engine) {
                Ok(wkt) => Some(wkt),
                Err(e) => {
                    warn!("无法导出 WKT: {e}");
                    None
                }
            }
        } else {
            None
        };
        Ok(Self {
            grammar: classify(input).as_str(),
            geographic: crs.is_geographic(engine)?,
            projected: crs.is_projected(engine)?,
            epsg: crs.to_epsg(engine)?,
            parameters: crs.to_dict(engine)?,
            wkt,
        })
    }

    fn kind(&self) -> &'static str {
        match (self.geographic, self.projected) {
            (true, _) => "geographic",
            (false, true) => "projected",
            (false, false) => "other",
        }
    }

    fn render_text(&self) -> String {
        let mut lines = vec![
            format!("输入语法: {}", self.grammar),
            format!("类别: {}", self.kind()),
            format!("EPSG: {}", self.epsg.map_or_else(|| "-".to_string(), |c| c.to_string())),
            "参数:".to_string(),
        ];
        lines.extend(self.parameters.iter().map(|(k, v)| format!("  {k} = {v}")));
        if let Some(wkt) = &self.wkt {
            lines.push(format!("WKT: {wkt}"));
        }
        lines.join("\n")
    }
}

/// 执行信息命令
pub fn execute<E: GeodeticEngine>(args: InfoArgs, engine: &E, output: OutputFormat) -> Result<()> {
    info!("=== CRS 信息 ({} 引擎) ===", engine.name());

    let crs = parse_input(&args.input, engine)?;
    let report = CrsReport::collect(&args.input, &crs, engine, !args.no_wkt)?;

    match output {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}
