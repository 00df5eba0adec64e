// apps/gc_cli/src/config.rs

//! 命令行配置
//!
//! 可选的 JSON 配置文件，命令行参数优先于文件中的值：
//!
//! ```json
//! { "engine": "reference", "output": "text", "log_level": "info" }
//! ```

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 可选日志级别
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },
}

/// 几何引擎选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// 内置纯 Rust 参考引擎
    #[default]
    Reference,
    /// GDAL/OGR（需启用 `gdal` 特性）
    Gdal,
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 人类可读文本
    #[default]
    Text,
    /// JSON
    Json,
}

/// 命令行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 几何引擎
    pub engine: EngineKind,
    /// 输出格式
    pub output: OutputFormat,
    /// 日志级别 (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Reference,
            output: OutputFormat::Text,
            log_level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// 从 JSON 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 文本加载并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: self.log_level.clone(),
                reason: format!("必须为 {} 之一", LOG_LEVELS.join(", ")),
            });
        }
        if self.engine == EngineKind::Gdal && !cfg!(feature = "gdal") {
            return Err(ConfigError::InvalidValue {
                key: "engine".to_string(),
                value: "gdal".to_string(),
                reason: "编译时未启用 gdal 特性".to_string(),
            });
        }
        Ok(())
    }

    /// 用命令行参数覆盖
    #[must_use]
    pub fn with_overrides(
        mut self,
        engine: Option<EngineKind>,
        output: Option<OutputFormat>,
        log_level: Option<String>,
    ) -> Self {
        if let Some(engine) = engine {
            self.engine = engine;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        self
    }
}
