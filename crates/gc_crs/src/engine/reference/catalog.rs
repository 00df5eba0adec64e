// crates/gc_crs/src/engine/reference/catalog.rs

//! 内置 EPSG 坐标系表
//!
//! 参考引擎只认识常用的一小部分 EPSG 代码：
//!
//! | 代码 | 坐标系 |
//! |---|---|
//! | 4326 / 4269 / 4267 / 4490 / 4258 | WGS84 / NAD83 / NAD27 / CGCS2000 / ETRS89 地理坐标系 |
//! | 3857 | Web Mercator |
//! | 32601–32660 / 32701–32760 | WGS84 UTM 北 / 南半球 |
//! | 4534–4554 | CGCS2000 3 度带高斯-克吕格（CM 75E–135E） |

use super::ellipsoid::Ellipsoid;
use super::model::{Projection, SpatialModel};

/// 地理坐标系 `(代码, 名称, 基准面)`
const GEOGRAPHIC: &[(u32, &str, &str)] = &[
    (4326, "WGS 84", "WGS84"),
    (4269, "NAD83", "NAD83"),
    (4267, "NAD27", "NAD27"),
    (4490, "China Geodetic Coordinate System 2000", "CGCS2000"),
    (4258, "ETRS89", "ETRS89"),
];

/// 按 EPSG 代码查找
#[must_use]
pub fn lookup(code: u32) -> Option<SpatialModel> {
    if let Some(&(code, name, datum)) = GEOGRAPHIC.iter().find(|(c, _, _)| *c == code) {
        return Some(geographic(name, datum).with_authority(code));
    }
    let model = match code {
        3857 => web_mercator(),
        32601..=32660 => utm(zone_of(code - 32600), true),
        32701..=32760 => utm(zone_of(code - 32700), false),
        4534..=4554 => gauss_kruger_3(zone_of(code - 4534 + 25)),
        _ => return None,
    };
    Some(model.with_authority(code))
}

/// 为没有权威代码的模型识别 EPSG 代码
#[must_use]
pub fn identify(model: &SpatialModel) -> Option<u32> {
    if let Some(code) = model.authority {
        return Some(code);
    }
    candidates(model)
        .into_iter()
        .find(|&code| lookup(code).is_some_and(|known| known.equivalent(model)))
}

/// 可能与模型等价的代码
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn candidates(model: &SpatialModel) -> Vec<u32> {
    let Some(projection) = &model.projection else {
        return GEOGRAPHIC.iter().map(|(code, _, _)| *code).collect();
    };
    match projection.method.as_str() {
        "merc" => vec![3857],
        "tmerc" => {
            let mut codes = Vec::new();
            if let Some((zone, north)) = projection.utm_zone() {
                codes.push(u32::from(zone) + if north { 32600 } else { 32700 });
            }
            let cm = projection.param("lon_0");
            if cm % 3.0 == 0.0 && (75.0..=135.0).contains(&cm) {
                codes.push(4534 + (cm / 3.0) as u32 - 25);
            }
            codes
        }
        _ => Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn zone_of(n: u32) -> u8 {
    n as u8
}

fn geographic(name: &str, datum: &str) -> SpatialModel {
    let ellipsoid = super::model::datum_ellipsoid(datum).unwrap_or_default();
    SpatialModel::geographic(Some(datum), ellipsoid).named(name)
}

fn utm(zone: u8, north: bool) -> SpatialModel {
    let hemisphere = if north { 'N' } else { 'S' };
    SpatialModel::projected(geographic("WGS 84", "WGS84"), Projection::utm(zone, north))
        .named(format!("WGS 84 / UTM zone {zone}{hemisphere}"))
}

/// CGCS2000 3 度带，中央子午线 = 带号 * 3
fn gauss_kruger_3(zone: u8) -> SpatialModel {
    let cm = f64::from(zone) * 3.0;
    let base = geographic("China Geodetic Coordinate System 2000", "CGCS2000");
    SpatialModel::projected(base, Projection::transverse_mercator(cm, 1.0, 500_000.0, 0.0))
        .named(format!("CGCS2000 / 3-degree Gauss-Kruger CM {cm}E"))
}

fn web_mercator() -> SpatialModel {
    let base = SpatialModel::geographic(None, Ellipsoid::WEB_MERCATOR_SPHERE);
    let projection = Projection::new("merc")
        .with("lat_ts", 0.0)
        .with("lon_0", 0.0)
        .with("k_0", 1.0)
        .with("x_0", 0.0)
        .with("y_0", 0.0);
    SpatialModel::projected(base, projection).named("WGS 84 / Pseudo-Mercator")
}
