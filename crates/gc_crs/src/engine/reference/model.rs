// crates/gc_crs/src/engine/reference/model.rs

//! 参考引擎的几何模型
//!
//! PROJ4、WKT、EPSG 三种输入都归一到 [`SpatialModel`]，等价判定只比较模型，
//! 不比较原始文本。

use std::collections::BTreeMap;

use super::ellipsoid::Ellipsoid;

/// 投影参数比较容差
const PARAM_TOLERANCE: f64 = 1e-9;

/// 坐标系类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsKind {
    /// 地理坐标系（经纬度）
    Geographic,
    /// 投影坐标系（平面）
    Projected,
}

/// 长度单位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearUnit {
    /// PROJ 名称（非命名单位为 `None`）
    pub proj_name: Option<&'static str>,
    /// 换算到米的系数
    pub to_meter: f64,
}

impl LinearUnit {
    /// 米
    pub const METRE: Self = Self {
        proj_name: Some("m"),
        to_meter: 1.0,
    };

    /// 命名单位表 `(PROJ 名称, WKT 名称, 换算系数)`
    const NAMED: &'static [(&'static str, &'static str, f64)] = &[
        ("m", "metre", 1.0),
        ("km", "kilometre", 1000.0),
        ("ft", "foot", 0.3048),
        ("us-ft", "US survey foot", 1200.0 / 3937.0),
        ("yd", "yard", 0.9144),
        ("mi", "Statute mile", 1609.344),
    ];

    /// 按 PROJ 名称查找
    #[must_use]
    pub fn from_proj_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(proj, _, _)| *proj == name)
            .map(|(proj, _, factor)| Self {
                proj_name: Some(proj),
                to_meter: *factor,
            })
    }

    /// 按换算系数创建，命中命名单位时带上名称
    #[must_use]
    pub fn from_factor(to_meter: f64) -> Self {
        let proj_name = Self::NAMED
            .iter()
            .find(|(_, _, factor)| (factor - to_meter).abs() < 1e-12)
            .map(|(proj, _, _)| *proj);
        Self {
            proj_name,
            to_meter,
        }
    }

    /// WKT 名称
    #[must_use]
    pub fn wkt_name(&self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(_, _, factor)| (factor - self.to_meter).abs() < 1e-12)
            .map_or("unknown", |(_, wkt, _)| *wkt)
    }
}

impl Default for LinearUnit {
    fn default() -> Self {
        Self::METRE
    }
}

/// 投影方法及参数
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// PROJ 方法名（`tmerc`、`merc`、`lcc` ...）
    pub method: String,
    /// PROJ 参数名 → 数值
    pub params: BTreeMap<String, f64>,
}

impl Projection {
    /// 创建投影
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: BTreeMap::new(),
        }
    }

    /// 链式设置参数
    #[must_use]
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.params.insert(key.to_owned(), value);
        self
    }

    /// 横轴墨卡托参数（UTM / 高斯-克吕格）
    #[must_use]
    pub fn transverse_mercator(central_meridian: f64, scale: f64, false_easting: f64, false_northing: f64) -> Self {
        Self::new("tmerc")
            .with("lat_0", 0.0)
            .with("lon_0", central_meridian)
            .with("k_0", scale)
            .with("x_0", false_easting)
            .with("y_0", false_northing)
    }

    /// UTM 带参数
    ///
    /// 中央子午线 = zone * 6 - 183
    #[must_use]
    pub fn utm(zone: u8, north: bool) -> Self {
        let central_meridian = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::transverse_mercator(central_meridian, 0.9996, 500_000.0, false_northing)
    }

    /// 参数值；缺省时比例因子为 1，其余为 0
    #[must_use]
    pub fn param(&self, key: &str) -> f64 {
        self.params
            .get(key)
            .copied()
            .unwrap_or(if key == "k_0" { 1.0 } else { 0.0 })
    }

    /// 若参数恰为某个 UTM 带，返回 `(带号, 是否北半球)`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn utm_zone(&self) -> Option<(u8, bool)> {
        if self.method != "tmerc" {
            return None;
        }
        let zone = ((self.param("lon_0") + 183.0) / 6.0).round();
        if !(1.0..=60.0).contains(&zone) {
            return None;
        }
        let zone = zone as u8;
        [true, false]
            .into_iter()
            .find(|&north| same_params(self, &Self::utm(zone, north)))
            .map(|north| (zone, north))
    }
}

/// 两个投影的参数是否一致（缺省值参与比较）
fn same_params(lhs: &Projection, rhs: &Projection) -> bool {
    lhs.method == rhs.method
        && lhs
            .params
            .keys()
            .chain(rhs.params.keys())
            .all(|key| (lhs.param(key) - rhs.param(key)).abs() < PARAM_TOLERANCE)
}

/// 归一化的空间参考模型
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialModel {
    /// 坐标系名称
    pub name: Option<String>,
    /// 类别
    pub kind: CrsKind,
    /// 基准面名称（原样保留，比较时归一）
    pub datum: Option<String>,
    /// 椭球体
    pub ellipsoid: Ellipsoid,
    /// 投影（地理坐标系为 `None`）
    pub projection: Option<Projection>,
    /// 长度单位（仅投影坐标系有意义）
    pub unit: LinearUnit,
    /// 七参数/三参数基准变换
    pub towgs84: Option<String>,
    /// EPSG 权威代码
    pub authority: Option<u32>,
}

impl SpatialModel {
    /// 地理坐标系
    #[must_use]
    pub fn geographic(datum: Option<&str>, ellipsoid: Ellipsoid) -> Self {
        Self {
            name: None,
            kind: CrsKind::Geographic,
            datum: datum.map(str::to_owned),
            ellipsoid,
            projection: None,
            unit: LinearUnit::METRE,
            towgs84: None,
            authority: None,
        }
    }

    /// 以地理坐标系为基础的投影坐标系
    #[must_use]
    pub fn projected(base: Self, projection: Projection) -> Self {
        Self {
            kind: CrsKind::Projected,
            projection: Some(projection),
            name: None,
            authority: None,
            ..base
        }
    }

    /// 设置名称
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置 EPSG 代码
    #[must_use]
    pub fn with_authority(mut self, code: u32) -> Self {
        self.authority = Some(code);
        self
    }

    /// 归一后的基准面名称
    #[must_use]
    pub fn canonical_datum(&self) -> Option<String> {
        self.datum.as_deref().and_then(canonical_datum)
    }

    /// 几何意义上是否等价
    ///
    /// 类别、椭球体、投影参数、单位必须一致；双方都命名了基准面时基准面也必须一致
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        if self.kind != other.kind || !self.ellipsoid.approx_eq(&other.ellipsoid) {
            return false;
        }
        if let (Some(lhs), Some(rhs)) = (self.canonical_datum(), other.canonical_datum()) {
            if lhs != rhs {
                return false;
            }
        }
        match (&self.projection, &other.projection) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => {
                same_params(lhs, rhs) && (self.unit.to_meter - other.unit.to_meter).abs() < 1e-12
            }
            _ => false,
        }
    }
}

/// 基准面名称归一
///
/// 常见基准面的各种拼写归到 PROJ 名称；`unknown` 视为未命名
#[must_use]
pub fn canonical_datum(raw: &str) -> Option<String> {
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let canonical = match key.as_str() {
        "" | "UNKNOWN" | "UNNAMED" => return None,
        "WGS84" | "WGS1984" | "WORLDGEODETICSYSTEM1984" | "WORLDGEODETICSYSTEM1984ENSEMBLE" => "WGS84",
        "NAD83" | "NORTHAMERICANDATUM1983" => "NAD83",
        "NAD27" | "NORTHAMERICANDATUM1927" => "NAD27",
        "CGCS2000" | "CHINA2000" | "CHINAGEODETICCOORDINATESYSTEM2000" => "CGCS2000",
        "ETRS89" | "EUROPEANTERRESTRIALREFERENCESYSTEM1989" | "EUROPEANTERRESTRIALREFERENCESYSTEM1989ENSEMBLE" => {
            "ETRS89"
        }
        _ => return Some(key),
    };
    Some(canonical.to_owned())
}

/// 基准面的标准椭球体
#[must_use]
pub fn datum_ellipsoid(canonical: &str) -> Option<Ellipsoid> {
    match canonical {
        "WGS84" => Some(Ellipsoid::WGS84),
        "NAD83" | "CGCS2000" | "ETRS89" => Some(Ellipsoid::GRS80),
        "NAD27" => Some(Ellipsoid::CLARKE_1866),
        _ => None,
    }
}

/// 基准面的 WKT 名称
#[must_use]
pub fn datum_wkt_name(canonical: &str) -> &str {
    match canonical {
        "WGS84" => "WGS_1984",
        "NAD83" => "North_American_Datum_1983",
        "NAD27" => "North_American_Datum_1927",
        "CGCS2000" => "China_2000",
        "ETRS89" => "European_Terrestrial_Reference_System_1989",
        other => other,
    }
}
