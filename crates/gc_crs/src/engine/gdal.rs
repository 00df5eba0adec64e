// crates/gc_crs/src/engine/gdal.rs

//! 基于 GDAL/OGR 空间参考的几何引擎
//!
//! 句柄为 [`SpatialRef`]，释放即 `OSRRelease`（由 `Drop` 完成）。

use gdal::spatial_ref::SpatialRef;

use super::{EngineError, EngineResult, GeodeticEngine};

impl From<gdal::errors::GdalError> for EngineError {
    fn from(e: gdal::errors::GdalError) -> Self {
        EngineError::Native(e.to_string())
    }
}

/// GDAL 引擎（无状态，每次调用各自创建 `SpatialRef`）
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalEngine;

impl GdalEngine {
    /// 创建引擎
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GeodeticEngine for GdalEngine {
    type Handle = SpatialRef;

    fn name(&self) -> &'static str {
        "gdal"
    }

    fn interpret(&self, text: &str) -> EngineResult<SpatialRef> {
        SpatialRef::from_definition(text).map_err(|e| EngineError::parse(text, e.to_string()))
    }

    fn normalize_esri(&self, handle: &mut SpatialRef) -> EngineResult<()> {
        // OSRImportFromESRI 对 WKT 输入等同于 importFromWkt + morphFromESRI
        let wkt = handle.to_wkt()?;
        *handle = SpatialRef::from_esri(&wkt).map_err(|e| EngineError::normalize(e.to_string()))?;
        Ok(())
    }

    fn export_wkt(&self, handle: &SpatialRef) -> EngineResult<String> {
        handle.to_wkt().map_err(|e| EngineError::export("WKT", e.to_string()))
    }

    fn export_proj4(&self, handle: &SpatialRef) -> EngineResult<String> {
        handle.to_proj4().map_err(|e| EngineError::export("PROJ4", e.to_string()))
    }

    fn is_geographic(&self, handle: &SpatialRef) -> bool {
        handle.is_geographic()
    }

    fn is_projected(&self, handle: &SpatialRef) -> bool {
        handle.is_projected()
    }

    fn autodetect_epsg(&self, handle: &mut SpatialRef) -> Option<u32> {
        if let Err(e) = handle.auto_identify_epsg() {
            log::debug!("GDAL 未识别出 EPSG 代码: {e}");
        }
        handle.auth_code().ok().and_then(|code| u32::try_from(code).ok())
    }

    fn compare_equivalent(&self, lhs: &SpatialRef, rhs: &SpatialRef) -> bool {
        lhs == rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdal_engine_epsg() {
        let engine = GdalEngine::new();
        let mut handle = engine.interpret("EPSG:4326").expect("解析失败");
        assert!(engine.is_geographic(&handle));
        assert_eq!(engine.autodetect_epsg(&mut handle), Some(4326));
    }

    #[test]
    fn test_gdal_engine_invalid() {
        let engine = GdalEngine::new();
        assert!(matches!(engine.interpret("not a crs"), Err(EngineError::Parse { .. })));
    }
}
