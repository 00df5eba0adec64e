// apps/gc_cli/src/commands/keys.rs

//! 参数键列表命令

use anyhow::Result;
use clap::Args;
use gc_crs::registry;
use indexmap::IndexMap;
use tracing::info;

use super::print_json;
use crate::config::OutputFormat;

/// 参数键列表参数
#[derive(Args)]
pub struct KeysArgs {
    /// 只列出以此前缀开头的键
    #[arg(short, long)]
    pub prefix: Option<String>,
}

fn matching(prefix: Option<&str>) -> IndexMap<&'static str, &'static str> {
    registry::entries()
        .filter(|(key, _)| prefix.map_or(true, |p| key.starts_with(p)))
        .collect()
}

/// 执行参数键列表命令
pub fn execute(args: KeysArgs, output: OutputFormat) -> Result<()> {
    let entries = matching(args.prefix.as_deref());
    info!("已识别参数键: {} / {}", entries.len(), registry::len());

    match output {
        OutputFormat::Text => {
            let width = entries.keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, description) in &entries {
                println!("{key:<width$}  {description}");
            }
        }
        OutputFormat::Json => print_json(&entries)?,
    }
    Ok(())
}
