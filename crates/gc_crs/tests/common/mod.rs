// crates/gc_crs/tests/common/mod.rs

//! 集成测试共用的计数引擎
//!
//! 包装参考引擎，统计解释调用次数、显式释放次数与存活句柄数，
//! 并可在指定阶段注入失败，用于验证句柄在所有路径上都被释放。

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gc_crs::engine::reference::ReferenceHandle;
use gc_crs::{EngineError, EngineResult, GeodeticEngine, ReferenceEngine};

/// 注入失败的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// 解释
    Interpret,
    /// ESRI 规范化
    Normalize,
    /// WKT / PROJ4 导出
    Export,
}

/// 计数句柄，`Drop` 时存活数减一
#[derive(Debug)]
pub struct CountedHandle {
    inner: ReferenceHandle,
    live: Arc<AtomicUsize>,
}

impl Drop for CountedHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 计数引擎
#[derive(Debug, Default)]
pub struct CountingEngine {
    inner: ReferenceEngine,
    live: Arc<AtomicUsize>,
    interprets: AtomicUsize,
    releases: AtomicUsize,
    fail: Option<FailAt>,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail: Some(stage),
            ..Self::default()
        }
    }

    /// 当前存活的句柄数
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// 解释调用次数（含失败）
    pub fn interpret_calls(&self) -> usize {
        self.interprets.load(Ordering::SeqCst)
    }

    /// 显式释放次数
    pub fn release_calls(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    fn check(&self, stage: FailAt) -> EngineResult<()> {
        if self.fail == Some(stage) {
            return Err(EngineError::Native(format!("injected failure at {stage:?}")));
        }
        Ok(())
    }
}

impl GeodeticEngine for CountingEngine {
    type Handle = CountedHandle;

    fn name(&self) -> &'static str {
        "counting"
    }

    fn interpret(&self, text: &str) -> EngineResult<CountedHandle> {
        self.interprets.fetch_add(1, Ordering::SeqCst);
        self.check(FailAt::Interpret)?;
        let inner = self.inner.interpret(text)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(CountedHandle {
            inner,
            live: Arc::clone(&self.live),
        })
    }

    fn normalize_esri(&self, handle: &mut CountedHandle) -> EngineResult<()> {
        self.check(FailAt::Normalize)?;
        self.inner.normalize_esri(&mut handle.inner)
    }

    fn export_wkt(&self, handle: &CountedHandle) -> EngineResult<String> {
        self.check(FailAt::Export)?;
        self.inner.export_wkt(&handle.inner)
    }

    fn export_proj4(&self, handle: &CountedHandle) -> EngineResult<String> {
        self.check(FailAt::Export)?;
        self.inner.export_proj4(&handle.inner)
    }

    fn is_geographic(&self, handle: &CountedHandle) -> bool {
        self.inner.is_geographic(&handle.inner)
    }

    fn is_projected(&self, handle: &CountedHandle) -> bool {
        self.inner.is_projected(&handle.inner)
    }

    fn autodetect_epsg(&self, handle: &mut CountedHandle) -> Option<u32> {
        self.inner.autodetect_epsg(&mut handle.inner)
    }

    fn compare_equivalent(&self, lhs: &CountedHandle, rhs: &CountedHandle) -> bool {
        self.inner.compare_equivalent(&lhs.inner, &rhs.inner)
    }

    fn release(&self, handle: CountedHandle) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        drop(handle);
    }
}

/// OGC WKT: WGS 84 (EPSG:4326)
pub const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

/// ESRI WKT: GCS_WGS_1984
pub const WGS84_ESRI_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// OGC WKT: WGS 84 / UTM zone 50N，无 AUTHORITY
pub const UTM50_WKT: &str = r#"PROJCS["WGS 84 / UTM zone 50N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",117],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1]]"#;
