// apps/gc_cli/src/main.rs

//! 坐标参考系命令行界面
//!
//! 提供 CRS 信息查看、等价比较与格式转换的命令行工具。
//! 大地测量引擎通过 `--engine` 或配置文件选择，命令本身对引擎泛型。

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use gc_crs::{GeodeticEngine, ReferenceEngine};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use config::{CliConfig, EngineKind, OutputFormat};

/// 坐标参考系命令行工具
#[derive(Parser)]
#[command(name = "gc_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Coordinate reference system inspection and comparison", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// 配置文件 (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 大地测量引擎
    #[arg(short, long, value_enum)]
    engine: Option<EngineKind>,

    /// 输出格式
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示 CRS 信息
    Info(commands::info::InfoArgs),
    /// 比较两个 CRS 是否等价
    Compare(commands::compare::CompareArgs),
    /// 转换 CRS 表示
    Convert(commands::convert::ConvertArgs),
    /// 列出已识别的 PROJ4 参数键
    Keys(commands::keys::KeysArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn run<E: GeodeticEngine>(command: Commands, engine: &E, output: OutputFormat) -> anyhow::Result<ExitCode> {
    debug!("使用引擎: {}", engine.name());
    match command {
        Commands::Info(args) => commands::info::execute(args, engine, output)?,
        Commands::Compare(args) => {
            let same = commands::compare::execute(args, engine, output)?;
            return Ok(if same { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Commands::Convert(args) => commands::convert::execute(args, engine)?,
        Commands::Keys(args) => commands::keys::execute(args, output)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    }
    .with_overrides(cli.engine, cli.output, cli.log_level);
    config.validate()?;

    // 初始化日志，库内的 log 记录经 tracing-log 桥接
    FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("无法初始化日志: {e}"))?;

    // 执行命令
    match config.engine {
        EngineKind::Reference => run(cli.command, &ReferenceEngine::new(), config.output),
        #[cfg(feature = "gdal")]
        EngineKind::Gdal => run(cli.command, &gc_crs::GdalEngine::new(), config.output),
        #[cfg(not(feature = "gdal"))]
        EngineKind::Gdal => anyhow::bail!("gdal 引擎未编译，请使用 --features gdal 构建"),
    }
}
