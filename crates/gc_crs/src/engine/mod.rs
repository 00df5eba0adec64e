// crates/gc_crs/src/engine/mod.rs

//! 几何参考引擎边界
//!
//! CRS 值对象本身不做任何大地测量计算；解析投影语法、导出 WKT/PROJ4、
//! 判定地理/投影、识别 EPSG、判定等价，全部委托给实现 [`GeodeticEngine`] 的引擎。
//!
//! # 句柄生命周期
//!
//! `interpret` 返回的句柄是 RAII 值：释放即 `Drop`。每个操作在自身作用域内
//! 获取句柄，正常返回、`?` 提前返回或 panic 展开时都会释放，不跨调用持有。
//!
//! # 实现
//!
//! - [`ReferenceEngine`]: 纯 Rust 确定性引擎（内置常用坐标系表）
//! - `GdalEngine`: 基于 GDAL/OGR 空间参考（需启用 `gdal` 特性）

pub mod reference;

#[cfg(feature = "gdal")]
pub mod gdal;

use thiserror::Error;

pub use reference::ReferenceEngine;

#[cfg(feature = "gdal")]
pub use self::gdal::GdalEngine;

/// 引擎结果类型
pub type EngineResult<T> = Result<T, EngineError>;

/// 引擎底层错误
///
/// 只在引擎内部与边界处使用，对外统一转换为 [`crate::CrsError`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 定义文本无法解析
    #[error("failed to interpret {input:?}: {reason}")]
    Parse {
        /// 输入文本（过长时截断）
        input: String,
        /// 失败原因
        reason: String,
    },

    /// ESRI 规范化失败
    #[error("ESRI normalization failed: {reason}")]
    Normalize {
        /// 失败原因
        reason: String,
    },

    /// 导出失败
    #[error("failed to export {format}: {reason}")]
    Export {
        /// 导出格式（`WKT` / `PROJ4`）
        format: &'static str,
        /// 失败原因
        reason: String,
    },

    /// 原生库报告的错误
    #[error("native engine error: {0}")]
    Native(String),
}

/// 错误消息中保留的输入长度
const INPUT_ECHO_LIMIT: usize = 80;

impl EngineError {
    /// 创建解析错误
    #[inline]
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        let input = match input.char_indices().nth(INPUT_ECHO_LIMIT) {
            Some((cut, _)) => format!("{}...", &input[..cut]),
            None => input.to_owned(),
        };
        Self::Parse {
            input,
            reason: reason.into(),
        }
    }

    /// 创建规范化错误
    #[inline]
    pub fn normalize(reason: impl Into<String>) -> Self {
        Self::Normalize {
            reason: reason.into(),
        }
    }

    /// 创建导出错误
    #[inline]
    pub fn export(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Export {
            format,
            reason: reason.into(),
        }
    }
}

/// 几何参考引擎
///
/// 所有实现都必须对相互独立的并发调用安全：每次调用各自获取句柄，互不共享。
pub trait GeodeticEngine: Send + Sync {
    /// 已解析的空间参考句柄，`Drop` 即释放
    type Handle;

    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 把 WKT / PROJ4 / `EPSG:n` 等用户输入解释为句柄
    fn interpret(&self, text: &str) -> EngineResult<Self::Handle>;

    /// 就地修正 ESRI 风格 WKT 的特殊写法
    fn normalize_esri(&self, handle: &mut Self::Handle) -> EngineResult<()>;

    /// 导出 WKT
    fn export_wkt(&self, handle: &Self::Handle) -> EngineResult<String>;

    /// 导出 PROJ4 参数串
    fn export_proj4(&self, handle: &Self::Handle) -> EngineResult<String>;

    /// 是否为地理坐标系
    fn is_geographic(&self, handle: &Self::Handle) -> bool;

    /// 是否为投影坐标系
    fn is_projected(&self, handle: &Self::Handle) -> bool;

    /// 自动识别 EPSG 代码；找不到时返回 `None`
    fn autodetect_epsg(&self, handle: &mut Self::Handle) -> Option<u32>;

    /// 两个句柄是否描述等价的坐标系
    fn compare_equivalent(&self, lhs: &Self::Handle, rhs: &Self::Handle) -> bool;

    /// 释放句柄
    ///
    /// 句柄按值移入，重复释放在类型层面不可能发生
    fn release(&self, handle: Self::Handle) {
        drop(handle);
    }

    /// 解释并做 ESRI 规范化；规范化失败时句柄随作用域释放
    fn interpret_normalized(&self, text: &str) -> EngineResult<Self::Handle> {
        let mut handle = self.interpret(text)?;
        self.normalize_esri(&mut handle)?;
        Ok(handle)
    }
}

impl<E: GeodeticEngine + ?Sized> GeodeticEngine for &E {
    type Handle = E::Handle;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn interpret(&self, text: &str) -> EngineResult<Self::Handle> {
        (**self).interpret(text)
    }

    fn normalize_esri(&self, handle: &mut Self::Handle) -> EngineResult<()> {
        (**self).normalize_esri(handle)
    }

    fn export_wkt(&self, handle: &Self::Handle) -> EngineResult<String> {
        (**self).export_wkt(handle)
    }

    fn export_proj4(&self, handle: &Self::Handle) -> EngineResult<String> {
        (**self).export_proj4(handle)
    }

    fn is_geographic(&self, handle: &Self::Handle) -> bool {
        (**self).is_geographic(handle)
    }

    fn is_projected(&self, handle: &Self::Handle) -> bool {
        (**self).is_projected(handle)
    }

    fn autodetect_epsg(&self, handle: &mut Self::Handle) -> Option<u32> {
        (**self).autodetect_epsg(handle)
    }

    fn compare_equivalent(&self, lhs: &Self::Handle, rhs: &Self::Handle) -> bool {
        (**self).compare_equivalent(lhs, rhs)
    }

    fn release(&self, handle: Self::Handle) {
        (**self).release(handle);
    }
}
