// crates/gc_crs/src/engine/reference/proj.rs

//! PROJ4 参数串 ⇄ 几何模型

use std::collections::HashMap;

use super::catalog;
use super::ellipsoid::Ellipsoid;
use super::model::{canonical_datum, datum_ellipsoid, LinearUnit, Projection, SpatialModel};
use crate::engine::{EngineError, EngineResult};
use crate::proj4;
use crate::value::ParamValue;

/// 地理坐标系的 PROJ 方法名
const GEOGRAPHIC_METHODS: &[&str] = &["longlat", "latlong", "lonlat", "latlon"];

/// 参考引擎支持的投影方法
pub(crate) const PROJECTION_METHODS: &[&str] = &[
    "tmerc", "utm", "merc", "lcc", "aea", "laea", "stere", "sterea", "eqc", "aeqd", "omerc",
    "cass", "moll", "robin", "sinu", "ortho", "poly", "eqdc", "krovak", "gnom", "cea",
];

/// 参与模型的投影参数，按导出顺序排列
const PROJECTION_PARAMS: &[&str] = &[
    "lat_0", "lat_1", "lat_2", "lat_ts", "lon_0", "lonc", "alpha", "gamma", "h", "k_0", "x_0",
    "y_0",
];

/// 能以 `+datum=` 导出的基准面
const PROJ_DATUMS: &[&str] = &["WGS84", "NAD83", "NAD27"];

/// 解析 PROJ4 参数串
///
/// # Errors
/// 缺少 `+proj`、方法或椭球体未知、数值参数非数值时返回解析错误
pub fn parse(text: &str) -> EngineResult<SpatialModel> {
    // 不经注册表过滤：未识别的键对模型没有影响
    let params: HashMap<&str, ParamValue> = proj4::pairs(text).collect();

    if let Some(init) = params.get("init") {
        return parse_init(text, init);
    }

    let method = params
        .get("proj")
        .and_then(ParamValue::as_str)
        .ok_or_else(|| EngineError::parse(text, "missing +proj"))?;

    let (datum, ellipsoid) = parse_ellipsoid(text, &params)?;
    let mut base = SpatialModel::geographic(datum.as_deref(), ellipsoid);
    base.towgs84 = params.get("towgs84").map(ToString::to_string);

    if GEOGRAPHIC_METHODS.contains(&method) {
        return Ok(base);
    }
    if !PROJECTION_METHODS.contains(&method) {
        return Err(EngineError::parse(text, format!("unknown projection method {method:?}")));
    }

    let projection = if method == "utm" {
        parse_utm(text, &params)?
    } else {
        let mut projection = Projection::new(method);
        for &key in PROJECTION_PARAMS {
            // `k` 是 `k_0` 的旧名
            let value = params.get(key).or_else(|| (key == "k_0").then(|| params.get("k")).flatten());
            if let Some(value) = value {
                let number = value
                    .as_f64()
                    .ok_or_else(|| EngineError::parse(text, format!("+{key} must be numeric, got {value}")))?;
                projection.params.insert(key.to_owned(), number);
            }
        }
        projection
    };

    let mut model = SpatialModel::projected(base, projection);
    model.unit = parse_unit(text, &params)?;
    Ok(model)
}

fn parse_init(text: &str, init: &ParamValue) -> EngineResult<SpatialModel> {
    let spec = init.to_string();
    let code = spec
        .split_once(':')
        .filter(|(authority, _)| authority.eq_ignore_ascii_case("epsg"))
        .and_then(|(_, code)| code.parse::<u32>().ok())
        .ok_or_else(|| EngineError::parse(text, format!("unsupported init {spec:?}")))?;
    catalog::lookup(code).ok_or_else(|| EngineError::parse(text, format!("unknown EPSG code {code}")))
}

fn parse_utm(text: &str, params: &HashMap<&str, ParamValue>) -> EngineResult<Projection> {
    let zone = params
        .get("zone")
        .and_then(ParamValue::as_i64)
        .filter(|z| (1..=60).contains(z))
        .ok_or_else(|| EngineError::parse(text, "+proj=utm requires +zone in 1..=60"))?;
    let south = params.get("south").is_some_and(|v| v.as_bool() != Some(false));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let zone = zone as u8;
    Ok(Projection::utm(zone, !south))
}

/// 基准面优先，其次 `+ellps`，再次 `+a`/`+b`/`+rf`/`+R`；都没有时为 WGS84
fn parse_ellipsoid(
    text: &str,
    params: &HashMap<&str, ParamValue>,
) -> EngineResult<(Option<String>, Ellipsoid)> {
    let number = |key: &str| params.get(key).and_then(ParamValue::as_f64);

    if let Some(datum) = params.get("datum") {
        let name = datum.to_string();
        let ellipsoid = canonical_datum(&name)
            .and_then(|c| datum_ellipsoid(&c))
            .ok_or_else(|| EngineError::parse(text, format!("unknown datum {name:?}")))?;
        return Ok((Some(name), ellipsoid));
    }
    if let Some(ellps) = params.get("ellps") {
        let name = ellps.to_string();
        let ellipsoid = Ellipsoid::from_proj_name(&name)
            .ok_or_else(|| EngineError::parse(text, format!("unknown ellipsoid {name:?}")))?;
        return Ok((None, ellipsoid));
    }
    if let Some(radius) = number("R") {
        return Ok((None, Ellipsoid::sphere(radius)));
    }
    if let Some(a) = number("a") {
        let ellipsoid = if let Some(rf) = number("rf") {
            Ellipsoid::from_inverse_flattening(a, rf)
        } else if let Some(b) = number("b") {
            Ellipsoid::from_semi_axes(a, b)
        } else if let Some(f) = number("f") {
            Ellipsoid::new(a, f)
        } else {
            Ellipsoid::sphere(a)
        };
        return Ok((None, ellipsoid));
    }
    Ok((None, Ellipsoid::WGS84))
}

fn parse_unit(text: &str, params: &HashMap<&str, ParamValue>) -> EngineResult<LinearUnit> {
    if let Some(units) = params.get("units") {
        let name = units.to_string();
        return LinearUnit::from_proj_name(&name)
            .ok_or_else(|| EngineError::parse(text, format!("unknown units {name:?}")));
    }
    match params.get("to_meter") {
        Some(factor) => factor
            .as_f64()
            .filter(|f| *f > 0.0)
            .map(LinearUnit::from_factor)
            .ok_or_else(|| EngineError::parse(text, "+to_meter must be a positive number")),
        None => Ok(LinearUnit::METRE),
    }
}

/// 导出 PROJ4 参数串
#[must_use]
pub fn export(model: &SpatialModel) -> String {
    let mut tokens = Vec::new();
    match &model.projection {
        None => tokens.push("+proj=longlat".to_owned()),
        Some(projection) => match projection.utm_zone() {
            Some((zone, north)) => {
                tokens.push("+proj=utm".to_owned());
                tokens.push(format!("+zone={zone}"));
                if !north {
                    tokens.push("+south".to_owned());
                }
            }
            None => {
                tokens.push(format!("+proj={}", projection.method));
                for &key in PROJECTION_PARAMS {
                    if let Some(value) = projection.params.get(key) {
                        let key = if key == "k_0" { "k" } else { key };
                        tokens.push(format!("+{key}={value}"));
                    }
                }
            }
        },
    }
    tokens.extend(ellipsoid_tokens(model));
    if let Some(towgs84) = &model.towgs84 {
        tokens.push(format!("+towgs84={towgs84}"));
    }
    if model.projection.is_some() {
        match model.unit.proj_name {
            Some(name) => tokens.push(format!("+units={name}")),
            None => tokens.push(format!("+to_meter={}", model.unit.to_meter)),
        }
    }
    tokens.push("+no_defs".to_owned());
    tokens.join(" ")
}

fn ellipsoid_tokens(model: &SpatialModel) -> Vec<String> {
    let ellipsoid = &model.ellipsoid;
    if let Some(datum) = model.canonical_datum() {
        let matches = datum_ellipsoid(&datum).is_some_and(|e| e.approx_eq(ellipsoid));
        if matches && PROJ_DATUMS.contains(&datum.as_str()) {
            return vec![format!("+datum={datum}")];
        }
    }
    if let Some(name) = ellipsoid.proj_name() {
        return vec![format!("+ellps={name}")];
    }
    if ellipsoid.is_sphere() {
        return vec![format!("+a={}", ellipsoid.a), format!("+b={}", ellipsoid.a)];
    }
    vec![format!("+a={}", ellipsoid.a), format!("+rf={}", ellipsoid.rf())]
}
