// crates/gc_crs/tests/engine_tests.rs

//! 引擎委托测试
//!
//! 分类、EPSG 识别、WKT 派生参数，以及每个访问引擎的操作在成功与失败时都释放句柄。

mod common;

use std::sync::Arc;
use std::thread;

use common::{CountingEngine, FailAt, UTM50_WKT, WGS84_ESRI_WKT, WGS84_WKT};
use gc_crs::prelude::*;
use gc_crs::proj4;

// ============================================================
// 分类与识别
// ============================================================

#[test]
fn test_epsg_4326_geographic() {
    let engine = CountingEngine::new();
    let crs = Crs::from_epsg(4326).expect("from_epsg");
    assert!(crs.is_geographic(&engine).expect("is_geographic"));
    assert!(!crs.is_projected(&engine).expect("is_projected"));
    assert_eq!(crs.to_epsg(&engine).expect("to_epsg"), Some(4326));
    assert_eq!(engine.live_handles(), 0);
    assert_eq!(engine.interpret_calls(), engine.release_calls());
}

#[test]
fn test_wkt_classification_and_epsg() {
    let engine = CountingEngine::new();
    let utm = Crs::from_wkt(UTM50_WKT, &engine).expect("from_wkt");
    assert!(utm.is_projected(&engine).expect("is_projected"));
    // WKT 中没有 AUTHORITY，靠引擎识别
    assert_eq!(utm.to_epsg(&engine).expect("to_epsg"), Some(32650));

    let esri = Crs::from_wkt(WGS84_ESRI_WKT, &engine).expect("from_wkt");
    assert!(esri.is_geographic(&engine).expect("is_geographic"));
    assert_eq!(esri.to_epsg(&engine).expect("to_epsg"), Some(4326));
}

#[test]
fn test_no_epsg_is_not_an_error() {
    let engine = CountingEngine::new();
    let lcc = Crs::from_proj4("+proj=lcc +lat_1=25 +lat_2=47 +lon_0=105 +ellps=krass +units=m").expect("from_proj4");
    assert_eq!(lcc.to_epsg(&engine).expect("to_epsg"), None);
    assert!(lcc.is_projected(&engine).expect("is_projected"));
}

// ============================================================
// 派生参数
// ============================================================

#[test]
fn test_to_dict_from_wkt_matches_engine_export() {
    let engine = CountingEngine::new();
    let crs = Crs::from_wkt(WGS84_WKT, &engine).expect("from_wkt");

    let handle = engine.interpret(WGS84_WKT).expect("interpret");
    let exported = engine.export_proj4(&handle).expect("export_proj4");
    engine.release(handle);

    let derived = crs.to_dict(&engine).expect("to_dict");
    assert_eq!(derived, proj4::tokenize(&exported));
    assert_eq!(derived["proj"], ParamValue::from("longlat"));
    assert!(derived.keys().all(|key| gc_crs::registry::is_recognized(key)));
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn test_to_dict_from_wkt_not_cached() {
    let engine = CountingEngine::new();
    let crs = Crs::from_wkt(UTM50_WKT, &engine).expect("from_wkt");
    let before = engine.interpret_calls();
    let first = crs.to_dict(&engine).expect("to_dict");
    let second = crs.to_dict(&engine).expect("to_dict");
    assert_eq!(first, second);
    assert_eq!(engine.interpret_calls(), before + 2);
}

#[test]
fn test_wkt_derived_for_parameter_crs() {
    let engine = CountingEngine::new();
    let crs = Crs::from_proj4("+proj=utm +zone=50 +datum=WGS84 +units=m +no_defs").expect("from_proj4");
    let wkt = crs.wkt(&engine).expect("wkt");
    let reparsed = Crs::from_wkt(&wkt, &engine).expect("from_wkt");
    assert!(reparsed.with_engine(&engine) == crs.with_engine(&engine));
    assert_eq!(engine.live_handles(), 0);
}

// ============================================================
// 失败路径上的句柄释放
// ============================================================

#[test]
fn test_from_wkt_releases_on_export_failure() {
    let engine = CountingEngine::failing_at(FailAt::Export);
    let err = Crs::from_wkt(WGS84_WKT, &engine).expect_err("导出失败");
    assert!(err.message().starts_with("The WKT could not be parsed."));
    assert!(err.message().contains("injected failure"));
    assert_eq!(engine.interpret_calls(), 1);
    assert_eq!(engine.release_calls(), 1);
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn test_from_wkt_releases_on_normalize_failure() {
    let engine = CountingEngine::failing_at(FailAt::Normalize);
    let err = Crs::from_wkt(WGS84_WKT, &engine).expect_err("规范化失败");
    assert!(err.message().starts_with("The WKT could not be parsed."));
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn test_from_wkt_interpret_failure() {
    let engine = CountingEngine::failing_at(FailAt::Interpret);
    assert!(Crs::from_wkt(WGS84_WKT, &engine).is_err());
    assert_eq!(engine.live_handles(), 0);
    assert_eq!(engine.release_calls(), 0);
}

#[test]
fn test_accessors_release_on_failure() {
    let crs = Crs::from_epsg(4326).expect("from_epsg");

    let engine = CountingEngine::failing_at(FailAt::Export);
    assert!(crs.wkt(&engine).is_err());
    assert_eq!(engine.live_handles(), 0);
    assert_eq!(engine.release_calls(), 1);

    let engine = CountingEngine::failing_at(FailAt::Normalize);
    assert!(crs.is_geographic(&engine).is_err());
    assert!(crs.is_projected(&engine).is_err());
    assert!(crs.to_epsg(&engine).is_err());
    assert_eq!(engine.interpret_calls(), 3);
    assert_eq!(engine.live_handles(), 0);

    let engine = CountingEngine::new();
    let unknown = Crs::from_epsg(999_999).expect("from_epsg");
    assert!(unknown.is_geographic(&engine).is_err());
    assert!(unknown.wkt(&engine).is_err());
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn test_to_dict_releases_on_export_failure() {
    let engine = CountingEngine::new();
    let crs = Crs::from_wkt(UTM50_WKT, &engine).expect("from_wkt");
    let failing = CountingEngine::failing_at(FailAt::Export);
    assert!(crs.to_dict(&failing).is_err());
    assert_eq!(failing.live_handles(), 0);
    assert_eq!(failing.release_calls(), 1);
}

#[test]
fn test_engine_errors_surface_as_crs_error() {
    let engine = CountingEngine::failing_at(FailAt::Interpret);
    let crs = Crs::from_epsg(4326).expect("from_epsg");
    match crs.is_geographic(&engine) {
        Err(CrsError::InvalidCrs { message }) => assert!(message.contains("native engine error")),
        Ok(value) => panic!("应当失败，得到 {value}"),
    }
}

// ============================================================
// 并发
// ============================================================

#[test]
fn test_concurrent_independent_callers() {
    let engine = Arc::new(CountingEngine::new());
    let crs = Arc::new(Crs::from_epsg(32650).expect("from_epsg"));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let crs = Arc::clone(&crs);
            thread::spawn(move || {
                let code = if i == 0 { 32650 } else { 32600 + i };
                let other = Crs::from_epsg(code).expect("from_epsg");
                let projected = crs.is_projected(&*engine).expect("is_projected");
                let same = crs.equivalent(&other, &*engine).expect("equivalent");
                (projected, same, i == 0)
            })
        })
        .collect();
    for handle in handles {
        let (projected, same, expect_same) = handle.join().expect("线程 panic");
        assert!(projected);
        assert_eq!(same, expect_same);
    }
    assert_eq!(engine.live_handles(), 0);
}
