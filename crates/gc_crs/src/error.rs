// crates/gc_crs/src/error.rs

//! CRS 错误类型
//!
//! 对外只暴露一种错误：无效 CRS（`CrsError::InvalidCrs`），由消息区分具体原因。
//! 几何引擎的底层错误（`EngineError`）在边界处统一转换为本类型，不会泄漏给调用方。
//!
//! # 错误来源
//!
//! - **输入错误**：空输入、非正 EPSG 代码、JSON 格式错误、过滤后参数为空
//! - **引擎错误**：解析、ESRI 规范化、导出失败

use thiserror::Error;

use crate::engine::EngineError;

/// CRS 模块结果类型
pub type CrsResult<T> = Result<T, CrsError>;

/// CRS 错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrsError {
    /// 无效的 CRS
    #[error("{message}")]
    InvalidCrs {
        /// 错误描述
        message: String,
    },
}

impl From<EngineError> for CrsError {
    fn from(err: EngineError) -> Self {
        Self::invalid(err.to_string())
    }
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl CrsError {
    /// 创建任意消息的无效 CRS 错误
    #[inline]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCrs {
            message: message.into(),
        }
    }

    /// 输入为空或无法识别
    #[inline]
    pub fn empty_or_invalid(input: &str) -> Self {
        Self::invalid(format!("CRS is empty or invalid: {input:?}"))
    }

    /// EPSG 代码不是正整数
    #[inline]
    pub fn non_positive_epsg(code: impl std::fmt::Display) -> Self {
        Self::invalid(format!("EPSG codes are positive integers: {code}"))
    }

    /// 看起来是 JSON 但解析失败
    #[inline]
    pub fn json_invalid(reason: impl std::fmt::Display) -> Self {
        Self::invalid(format!("CRS appears to be JSON but is not valid: {reason}"))
    }

    /// JSON 对象为空
    #[inline]
    pub fn json_empty() -> Self {
        Self::invalid("CRS is empty JSON")
    }

    /// WKT 无法被引擎解析
    #[inline]
    pub fn wkt_parse_failed(reason: impl std::fmt::Display) -> Self {
        Self::invalid(format!("The WKT could not be parsed. {reason}"))
    }

    /// 不支持的用户输入类型
    #[inline]
    pub fn unsupported_input(kind: &str) -> Self {
        Self::invalid(format!("CRS is invalid: unsupported input of type {kind}"))
    }

    /// 空 CRS 上调用需要引擎的操作
    #[inline]
    pub fn empty_crs(operation: &str) -> Self {
        Self::invalid(format!("CRS is empty: cannot compute {operation}"))
    }

    /// 错误消息
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidCrs { message } => message,
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_or_invalid_error() {
        let err = CrsError::empty_or_invalid("");
        match &err {
            CrsError::InvalidCrs { message } => {
                assert!(message.starts_with("CRS is empty or invalid"));
            }
        }
        assert!(format!("{err}").contains("\"\""));
    }

    #[test]
    fn test_non_positive_epsg_error() {
        let err = CrsError::non_positive_epsg(-1);
        let msg = format!("{err}");
        assert!(msg.contains("EPSG codes are positive integers"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn test_json_errors_are_distinct() {
        let invalid = CrsError::json_invalid("EOF while parsing");
        let empty = CrsError::json_empty();
        assert_ne!(invalid, empty);
        assert!(invalid.message().contains("appears to be JSON"));
        assert_eq!(empty.message(), "CRS is empty JSON");
    }

    #[test]
    fn test_engine_error_is_translated() {
        let engine_err = EngineError::parse("GEOGCS[", "unbalanced brackets");
        let err: CrsError = engine_err.into();
        match err {
            CrsError::InvalidCrs { message } => {
                assert!(message.contains("unbalanced brackets"));
            }
        }
    }

    #[test]
    fn test_wkt_parse_failed_embeds_reason() {
        let err = CrsError::wkt_parse_failed("unknown keyword FOO");
        assert!(err.message().starts_with("The WKT could not be parsed"));
        assert!(err.message().contains("FOO"));
    }
}
