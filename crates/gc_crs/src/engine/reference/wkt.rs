// crates/gc_crs/src/engine/reference/wkt.rs

//! WKT 解析与导出
//!
//! 解析支持 WKT1（OGC / ESRI）与 WKT2 的地理、投影坐标系；导出统一为 WKT1。
//! 方括号与圆括号均可作为定界符，关键字不区分大小写。

use super::ellipsoid::Ellipsoid;
use super::model::{datum_wkt_name, LinearUnit, Projection, SpatialModel};
use super::proj;
use crate::engine::{EngineError, EngineResult};

/// 一度对应的弧度
const DEGREE: &str = "0.0174532925199433";

/// 投影方法 `(PROJ 名称, WKT1 名称, 其他写法)`
///
/// 其他写法已归一（小写、空格与连字符转下划线、去括号）
const METHODS: &[(&str, &str, &[&str])] = &[
    ("tmerc", "Transverse_Mercator", &["gauss_kruger"]),
    (
        "merc",
        "Mercator_1SP",
        &[
            "mercator_2sp",
            "mercator",
            "mercator_variant_a",
            "mercator_variant_b",
            "popular_visualisation_pseudo_mercator",
            "mercator_auxiliary_sphere",
        ],
    ),
    (
        "lcc",
        "Lambert_Conformal_Conic_2SP",
        &[
            "lambert_conformal_conic_1sp",
            "lambert_conformal_conic",
            "lambert_conic_conformal_2sp",
            "lambert_conic_conformal_1sp",
        ],
    ),
    ("aea", "Albers_Conic_Equal_Area", &["albers_equal_area", "albers"]),
    ("laea", "Lambert_Azimuthal_Equal_Area", &[]),
    ("stere", "Polar_Stereographic", &["polar_stereographic_variant_a", "polar_stereographic_variant_b", "stereographic"]),
    ("sterea", "Oblique_Stereographic", &["double_stereographic"]),
    ("eqc", "Equirectangular", &["equidistant_cylindrical", "plate_carree"]),
    ("aeqd", "Azimuthal_Equidistant", &["modified_azimuthal_equidistant"]),
    (
        "omerc",
        "Hotine_Oblique_Mercator",
        &["hotine_oblique_mercator_variant_a", "hotine_oblique_mercator_variant_b", "hotine_oblique_mercator_azimuth_center"],
    ),
    ("cass", "Cassini_Soldner", &["cassini"]),
    ("moll", "Mollweide", &[]),
    ("robin", "Robinson", &[]),
    ("sinu", "Sinusoidal", &[]),
    ("ortho", "Orthographic", &[]),
    ("poly", "Polyconic", &["american_polyconic"]),
    ("eqdc", "Equidistant_Conic", &[]),
    ("krovak", "Krovak", &[]),
    ("gnom", "Gnomonic", &[]),
    ("cea", "Cylindrical_Equal_Area", &["lambert_cylindrical_equal_area"]),
];

/// 投影参数 `(PROJ 名称, WKT1 名称, 其他写法)`
const PARAMS: &[(&str, &str, &[&str])] = &[
    (
        "lat_0",
        "latitude_of_origin",
        &["latitude_of_natural_origin", "latitude_of_center", "latitude_of_false_origin", "latitude_of_projection_centre"],
    ),
    ("lat_1", "standard_parallel_1", &["latitude_of_1st_standard_parallel"]),
    ("lat_2", "standard_parallel_2", &["latitude_of_2nd_standard_parallel"]),
    ("lat_ts", "latitude_of_true_scale", &[]),
    (
        "lon_0",
        "central_meridian",
        &[
            "longitude_of_natural_origin",
            "longitude_of_center",
            "longitude_of_origin",
            "longitude_of_false_origin",
            "longitude_of_projection_centre",
        ],
    ),
    ("alpha", "azimuth", &["azimuth_of_initial_line"]),
    ("gamma", "rectified_grid_angle", &["angle_from_rectified_to_skew_grid"]),
    ("h", "satellite_height", &[]),
    (
        "k_0",
        "scale_factor",
        &["scale_factor_at_natural_origin", "scale_factor_on_initial_line", "scale_factor_at_projection_centre"],
    ),
    ("x_0", "false_easting", &["easting_at_false_origin", "easting_at_projection_centre"]),
    ("y_0", "false_northing", &["northing_at_false_origin", "northing_at_projection_centre"]),
];

// ============================================================================
// 语法树
// ============================================================================

/// WKT 节点参数
#[derive(Debug, Clone, PartialEq)]
pub enum WktArg {
    /// 带引号的文本
    Text(String),
    /// 数值或枚举等裸值
    Value(String),
    /// 子节点
    Node(WktNode),
}

/// WKT 节点 `KEYWORD[arg, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    /// 关键字（大写）
    pub keyword: String,
    /// 参数
    pub args: Vec<WktArg>,
}

impl WktNode {
    /// 第一个指定关键字的子节点
    #[must_use]
    pub fn child(&self, keyword: &str) -> Option<&WktNode> {
        self.args.iter().find_map(|arg| match arg {
            WktArg::Node(node) if node.keyword == keyword => Some(node),
            _ => None,
        })
    }

    /// 指定关键字的全部子节点
    pub fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a WktNode> + 'a {
        self.args.iter().filter_map(move |arg| match arg {
            WktArg::Node(node) if node.keyword == keyword => Some(node),
            _ => None,
        })
    }

    /// 第 `i` 个文本或裸值参数
    #[must_use]
    pub fn text(&self, i: usize) -> Option<&str> {
        match self.args.get(i)? {
            WktArg::Text(s) | WktArg::Value(s) => Some(s),
            WktArg::Node(_) => None,
        }
    }

    /// 第 `i` 个参数按数值解析
    #[must_use]
    pub fn number(&self, i: usize) -> Option<f64> {
        self.text(i)?.trim().parse().ok()
    }
}

/// 把 WKT 文本解析为语法树
///
/// # Errors
/// 定界符不匹配、引号未闭合、根节点后有多余内容时返回解析错误
pub fn parse_tree(text: &str) -> EngineResult<WktNode> {
    let mut parser = Parser {
        src: text,
        chars: text.char_indices().peekable(),
    };
    let root = parser.node()?;
    parser.skip_ws();
    if let Some(&(pos, c)) = parser.chars.peek() {
        return Err(parser.error(format!("unexpected {c:?} at offset {pos} after root node")));
    }
    Ok(root)
}

struct Parser<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> EngineError {
        EngineError::parse(self.src, reason)
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some((_, c)) = self.chars.next_if(|(_, c)| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(c);
        }
        word
    }

    fn node(&mut self) -> EngineResult<WktNode> {
        self.skip_ws();
        let keyword = self.word();
        if keyword.is_empty() {
            return Err(self.error("expected a WKT keyword"));
        }
        self.skip_ws();
        match self.chars.next() {
            Some((_, '[' | '(')) => {}
            _ => return Err(self.error(format!("expected '[' after {keyword}"))),
        }
        self.body(keyword.to_ascii_uppercase())
    }

    fn body(&mut self, keyword: String) -> EngineResult<WktNode> {
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            if let Some((_, ']' | ')')) = self.chars.peek() {
                self.chars.next();
                break;
            }
            args.push(self.arg(&keyword)?);
            self.skip_ws();
            match self.chars.next() {
                Some((_, ',')) => {}
                Some((_, ']' | ')')) => break,
                Some((pos, c)) => return Err(self.error(format!("unexpected {c:?} at offset {pos} in {keyword}"))),
                None => return Err(self.error(format!("unterminated {keyword}"))),
            }
        }
        Ok(WktNode { keyword, args })
    }

    fn arg(&mut self, parent: &str) -> EngineResult<WktArg> {
        match self.chars.peek().copied() {
            Some((_, '"')) => {
                self.chars.next();
                self.quoted().map(WktArg::Text)
            }
            Some((_, c)) if c.is_ascii_alphabetic() => {
                let word = self.word();
                self.skip_ws();
                if self.chars.next_if(|(_, c)| matches!(c, '[' | '(')).is_some() {
                    self.body(word.to_ascii_uppercase()).map(WktArg::Node)
                } else {
                    Ok(WktArg::Value(word))
                }
            }
            Some(_) => {
                let mut value = String::new();
                while let Some((_, c)) = self
                    .chars
                    .next_if(|(_, c)| !matches!(c, ',' | ']' | ')') && !c.is_whitespace())
                {
                    value.push(c);
                }
                if value.is_empty() {
                    return Err(self.error(format!("empty argument in {parent}")));
                }
                Ok(WktArg::Value(value))
            }
            None => Err(self.error(format!("unterminated {parent}"))),
        }
    }

    /// 引号内文本，`""` 为转义的引号
    fn quoted(&mut self) -> EngineResult<String> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => {
                    if self.chars.next_if(|(_, c)| *c == '"').is_some() {
                        text.push('"');
                    } else {
                        return Ok(text);
                    }
                }
                Some((_, c)) => text.push(c),
                None => return Err(self.error("unterminated quoted string")),
            }
        }
    }
}

// ============================================================================
// 语法树 → 模型
// ============================================================================

/// 解析 WKT 为几何模型
///
/// # Errors
/// 语法错误、不支持的根节点或投影方法、缺少基准面/椭球体时返回解析错误
pub fn parse(text: &str) -> EngineResult<SpatialModel> {
    let root = parse_tree(text)?;
    let mut model = match root.keyword.as_str() {
        "GEOGCS" | "GEOGCRS" | "GEODCRS" | "GEOGRAPHICCRS" | "GEODETICCRS" => geographic(text, &root)?,
        "PROJCS" | "PROJCRS" | "PROJECTEDCRS" => projected(text, &root)?,
        other => return Err(EngineError::parse(text, format!("unsupported WKT root {other}"))),
    };
    // GDAL 把无法用 WKT1 表达的定义放在 EXTENSION["PROJ4", ...] 中
    if let Some(extension) = root.child("EXTENSION").filter(|e| e.text(0) == Some("PROJ4")) {
        let definition = extension
            .text(1)
            .ok_or_else(|| EngineError::parse(text, "EXTENSION[\"PROJ4\"] without definition"))?;
        let name = model.name.take();
        let authority = model.authority;
        model = proj::parse(definition)?;
        model.name = name;
        model.authority = authority;
    }
    Ok(model)
}

fn authority(node: &WktNode) -> Option<u32> {
    node.child("AUTHORITY")
        .or_else(|| node.child("ID"))
        .filter(|id| id.text(0).is_some_and(|a| a.eq_ignore_ascii_case("EPSG")))
        .and_then(|id| id.text(1))
        .and_then(|code| code.trim().parse().ok())
}

fn geographic(text: &str, node: &WktNode) -> EngineResult<SpatialModel> {
    let datum = node
        .child("DATUM")
        .or_else(|| node.child("GEODETICDATUM"))
        .or_else(|| node.child("TRF"))
        .or_else(|| node.child("ENSEMBLE"))
        .ok_or_else(|| EngineError::parse(text, format!("{} without DATUM", node.keyword)))?;
    let spheroid = datum
        .child("SPHEROID")
        .or_else(|| datum.child("ELLIPSOID"))
        .ok_or_else(|| EngineError::parse(text, "DATUM without SPHEROID"))?;
    let (Some(a), Some(rf)) = (spheroid.number(1), spheroid.number(2)) else {
        return Err(EngineError::parse(text, "SPHEROID requires semi-major axis and inverse flattening"));
    };

    let mut model = SpatialModel::geographic(datum.text(0), Ellipsoid::from_inverse_flattening(a, rf));
    model.name = node.text(0).map(str::to_owned);
    model.authority = authority(node);
    model.towgs84 = datum.child("TOWGS84").map(|t| {
        (0..t.args.len())
            .filter_map(|i| t.text(i))
            .collect::<Vec<_>>()
            .join(",")
    });
    Ok(model)
}

fn projected(text: &str, node: &WktNode) -> EngineResult<SpatialModel> {
    let base_node = node
        .child("GEOGCS")
        .or_else(|| node.child("BASEGEOGCRS"))
        .or_else(|| node.child("BASEGEODCRS"))
        .ok_or_else(|| EngineError::parse(text, format!("{} without base geographic CRS", node.keyword)))?;
    let base = geographic(text, base_node)?;

    // WKT1: PROJECTION + PARAMETER；WKT2: CONVERSION[METHOD, PARAMETER...]
    let (method_name, param_owner) = match node.child("CONVERSION") {
        Some(conversion) => (conversion.child("METHOD").and_then(|m| m.text(0)), conversion),
        None => (node.child("PROJECTION").and_then(|p| p.text(0)), node),
    };
    let method_name = method_name.ok_or_else(|| EngineError::parse(text, "projected CRS without projection method"))?;
    let method = proj_method(method_name)
        .ok_or_else(|| EngineError::parse(text, format!("unsupported projection method {method_name:?}")))?;

    let mut projection = Projection::new(method);
    for parameter in param_owner.children("PARAMETER") {
        let (Some(name), Some(value)) = (parameter.text(0), parameter.number(1)) else {
            return Err(EngineError::parse(text, "PARAMETER requires a name and a numeric value"));
        };
        match proj_param(name) {
            Some(key) => {
                projection.params.insert(key.to_owned(), value);
            }
            None => log::debug!("忽略未知的 WKT 投影参数: {name}"),
        }
    }
    if method == "merc" {
        if let Some(lat_ts) = projection.params.remove("lat_1") {
            projection.params.insert("lat_ts".to_owned(), lat_ts);
        }
    }
    if method == "omerc" {
        if let Some(lonc) = projection.params.remove("lon_0") {
            projection.params.insert("lonc".to_owned(), lonc);
        }
    }

    let to_meter = node
        .child("UNIT")
        .or_else(|| node.child("LENGTHUNIT"))
        .or_else(|| node.child("AXIS").and_then(|axis| axis.child("LENGTHUNIT")))
        .and_then(|unit| unit.number(1))
        .unwrap_or(1.0);

    let mut model = SpatialModel::projected(base, projection);
    model.unit = LinearUnit::from_factor(to_meter);
    model.name = node.text(0).map(str::to_owned);
    model.authority = authority(node);
    Ok(model)
}

/// 名称归一：小写，空格与连字符转下划线，去掉括号
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

fn proj_method(name: &str) -> Option<&'static str> {
    let name = normalize_name(name);
    METHODS
        .iter()
        .find(|(_, wkt, aliases)| wkt.eq_ignore_ascii_case(&name) || aliases.contains(&name.as_str()))
        .map(|(proj, _, _)| *proj)
}

fn proj_param(name: &str) -> Option<&'static str> {
    let name = normalize_name(name);
    PARAMS
        .iter()
        .find(|(_, wkt, aliases)| *wkt == name || aliases.contains(&name.as_str()))
        .map(|(proj, _, _)| *proj)
}

// ============================================================================
// 模型 → WKT1
// ============================================================================

/// 导出 WKT1
#[must_use]
pub fn export(model: &SpatialModel) -> String {
    let Some(projection) = &model.projection else {
        return geogcs(model, model.name.as_deref(), model.authority);
    };

    let mut parts = vec![
        quote(model.name.as_deref().unwrap_or("unknown")),
        geogcs(model, base_name(model), None),
        format!("PROJECTION[{}]", quote(wkt_method(&projection.method))),
    ];
    for (key, value) in &projection.params {
        let name = if projection.method == "merc" && key == "lat_ts" {
            "standard_parallel_1"
        } else {
            wkt_param(key)
        };
        parts.push(format!("PARAMETER[{},{value}]", quote(name)));
    }
    parts.push(format!("UNIT[{},{}]", quote(model.unit.wkt_name()), model.unit.to_meter));
    if let Some(code) = model.authority {
        parts.push(authority_clause(code));
    }
    format!("PROJCS[{}]", parts.join(","))
}

fn geogcs(model: &SpatialModel, name: Option<&str>, code: Option<u32>) -> String {
    let datum = model.canonical_datum();
    let datum_name = datum.as_deref().map_or("unknown", datum_wkt_name);
    let ellipsoid = &model.ellipsoid;
    let mut datum_parts = vec![
        quote(datum_name),
        format!("SPHEROID[{},{},{}]", quote(ellipsoid.wkt_name()), ellipsoid.a, ellipsoid.rf()),
    ];
    if let Some(towgs84) = &model.towgs84 {
        datum_parts.push(format!("TOWGS84[{towgs84}]"));
    }
    let mut parts = vec![
        quote(name.unwrap_or("unknown")),
        format!("DATUM[{}]", datum_parts.join(",")),
        "PRIMEM[\"Greenwich\",0]".to_owned(),
        format!("UNIT[\"degree\",{DEGREE}]"),
    ];
    if let Some(code) = code {
        parts.push(authority_clause(code));
    }
    format!("GEOGCS[{}]", parts.join(","))
}

/// 投影坐标系所基于的地理坐标系名称
fn base_name(model: &SpatialModel) -> Option<&'static str> {
    match model.canonical_datum()?.as_str() {
        "WGS84" => Some("WGS 84"),
        "NAD83" => Some("NAD83"),
        "NAD27" => Some("NAD27"),
        "CGCS2000" => Some("China Geodetic Coordinate System 2000"),
        "ETRS89" => Some("ETRS89"),
        _ => None,
    }
}

fn authority_clause(code: u32) -> String {
    format!("AUTHORITY[\"EPSG\",\"{code}\"]")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn wkt_method(method: &str) -> &str {
    METHODS
        .iter()
        .find(|(proj, _, _)| *proj == method)
        .map_or(method, |(_, wkt, _)| *wkt)
}

fn wkt_param(key: &str) -> &str {
    match key {
        "lonc" => "longitude_of_center",
        _ => PARAMS
            .iter()
            .find(|(proj, _, _)| *proj == key)
            .map_or(key, |(_, wkt, _)| *wkt),
    }
}
