// crates/gc_crs/src/engine/reference/mod.rs

//! 纯 Rust 参考引擎
//!
//! 不依赖原生库的确定性引擎，覆盖常用坐标系：
//!
//! - `EPSG:n` 输入与 `+init=epsg:n`，查内置表 [`catalog`]
//! - PROJ4 参数串（[`proj`]）
//! - WKT1（OGC / ESRI）与 WKT2（[`wkt`]），导出为 WKT1
//!
//! 等价判定比较归一后的几何模型（类别、基准面/椭球体、投影参数、单位），
//! 与书写方式无关。

pub mod catalog;
pub mod ellipsoid;
pub mod model;
pub mod proj;
pub mod wkt;

use super::{EngineError, EngineResult, GeodeticEngine};
use model::{CrsKind, SpatialModel};

/// ESRI 名称前缀：坐标系 `GCS_`，基准面 `D_`
const ESRI_GCS_PREFIX: &str = "GCS_";
const ESRI_DATUM_PREFIX: &str = "D_";

/// 参考引擎句柄
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceHandle {
    model: SpatialModel,
    esri_normalized: bool,
}

impl ReferenceHandle {
    /// 解析得到的几何模型
    #[must_use]
    pub fn model(&self) -> &SpatialModel {
        &self.model
    }

    /// 是否已做过 ESRI 规范化
    #[must_use]
    pub fn is_esri_normalized(&self) -> bool {
        self.esri_normalized
    }
}

/// 参考引擎（无状态）
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    /// 创建引擎
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn interpret_epsg(text: &str, code: &str) -> EngineResult<SpatialModel> {
        let code: u32 = code
            .trim()
            .parse()
            .map_err(|_| EngineError::parse(text, format!("invalid EPSG code {code:?}")))?;
        catalog::lookup(code).ok_or_else(|| EngineError::parse(text, format!("EPSG:{code} is not in the built-in catalog")))
    }
}

/// 去掉 ASCII 大小写不敏感的前缀
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

impl GeodeticEngine for ReferenceEngine {
    type Handle = ReferenceHandle;

    fn name(&self) -> &'static str {
        "reference"
    }

    fn interpret(&self, text: &str) -> EngineResult<ReferenceHandle> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::parse(text, "empty definition"));
        }
        // WKT 的 EXTENSION["PROJ4", ...] 中也会出现 '='，先认括号
        let model = if let Some(code) = strip_prefix_ignore_case(trimmed, "EPSG:") {
            Self::interpret_epsg(text, code)?
        } else if trimmed.starts_with('+') {
            proj::parse(trimmed)?
        } else if trimmed.contains('[') || trimmed.contains('(') {
            wkt::parse(trimmed)?
        } else if trimmed.contains('=') {
            proj::parse(trimmed)?
        } else {
            return Err(EngineError::parse(text, "not a recognized CRS definition"));
        };
        log::trace!("参考引擎解析完成: {:?}", model.name);
        Ok(ReferenceHandle {
            model,
            esri_normalized: false,
        })
    }

    fn normalize_esri(&self, handle: &mut ReferenceHandle) -> EngineResult<()> {
        let model = &mut handle.model;
        if let Some(name) = model.name.as_deref().and_then(|n| n.strip_prefix(ESRI_GCS_PREFIX)) {
            model.name = Some(name.to_owned());
        }
        if let Some(datum) = model.datum.as_deref().and_then(|d| d.strip_prefix(ESRI_DATUM_PREFIX)) {
            model.datum = Some(datum.to_owned());
        }
        handle.esri_normalized = true;
        Ok(())
    }

    fn export_wkt(&self, handle: &ReferenceHandle) -> EngineResult<String> {
        Ok(wkt::export(&handle.model))
    }

    fn export_proj4(&self, handle: &ReferenceHandle) -> EngineResult<String> {
        Ok(proj::export(&handle.model))
    }

    fn is_geographic(&self, handle: &ReferenceHandle) -> bool {
        handle.model.kind == CrsKind::Geographic
    }

    fn is_projected(&self, handle: &ReferenceHandle) -> bool {
        handle.model.kind == CrsKind::Projected
    }

    fn autodetect_epsg(&self, handle: &mut ReferenceHandle) -> Option<u32> {
        let code = catalog::identify(&handle.model)?;
        handle.model.authority = Some(code);
        Some(code)
    }

    fn compare_equivalent(&self, lhs: &ReferenceHandle, rhs: &ReferenceHandle) -> bool {
        lhs.model.equivalent(&rhs.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    #[test]
    fn test_interpret_dispatch() {
        let engine = ReferenceEngine::new();
        assert!(engine.interpret("EPSG:4326").is_ok());
        assert!(engine.interpret("epsg:32650").is_ok());
        assert!(engine.interpret("+proj=longlat +datum=WGS84").is_ok());
        assert!(engine.interpret(ESRI_WKT).is_ok());
    }

    #[test]
    fn test_interpret_errors() {
        let engine = ReferenceEngine::new();
        for bad in ["", "   ", "EPSG:", "EPSG:abc", "EPSG:1", "hello world"] {
            match engine.interpret(bad) {
                Err(EngineError::Parse { .. }) => {}
                other => panic!("{bad:?} 应当解析失败: {other:?}"),
            }
        }
    }

    #[test]
    fn test_esri_normalization() {
        let engine = ReferenceEngine::new();
        let wgs84 = engine.interpret("EPSG:4326").expect("4326");

        let mut esri = engine.interpret(ESRI_WKT).expect("ESRI WKT");
        assert!(!engine.compare_equivalent(&esri, &wgs84));
        engine.normalize_esri(&mut esri).expect("规范化失败");
        assert!(esri.is_esri_normalized());
        assert_eq!(esri.model().datum.as_deref(), Some("WGS_1984"));
        assert_eq!(esri.model().name.as_deref(), Some("WGS_1984"));
        assert!(engine.compare_equivalent(&esri, &wgs84));
    }

    #[test]
    fn test_classification() {
        let engine = ReferenceEngine::new();
        let geographic = engine.interpret("EPSG:4326").expect("4326");
        let projected = engine.interpret("EPSG:3857").expect("3857");
        assert!(engine.is_geographic(&geographic));
        assert!(!engine.is_projected(&geographic));
        assert!(engine.is_projected(&projected));
        assert!(!engine.is_geographic(&projected));
    }

    #[test]
    fn test_autodetect_epsg() {
        let engine = ReferenceEngine::new();
        let mut handle = engine
            .interpret("+proj=utm +zone=50 +datum=WGS84 +units=m +no_defs")
            .expect("解析失败");
        assert_eq!(engine.autodetect_epsg(&mut handle), Some(32650));
        assert_eq!(handle.model().authority, Some(32650));

        let mut lcc = engine
            .interpret("+proj=lcc +lat_1=25 +lat_2=47 +lon_0=105 +datum=WGS84")
            .expect("解析失败");
        assert_eq!(engine.autodetect_epsg(&mut lcc), None);
    }

    #[test]
    fn test_exports_reinterpret_equivalent() {
        let engine = ReferenceEngine::new();
        let handle = engine.interpret("EPSG:32650").expect("32650");
        let wkt = engine.export_wkt(&handle).expect("WKT");
        let proj4 = engine.export_proj4(&handle).expect("PROJ4");
        let from_wkt = engine.interpret(&wkt).expect("重新解析 WKT");
        let from_proj4 = engine.interpret(&proj4).expect("重新解析 PROJ4");
        assert!(engine.compare_equivalent(&handle, &from_wkt));
        assert!(engine.compare_equivalent(&from_wkt, &from_proj4));
    }
}
