// crates/gc_crs/src/input.rs

//! 输入识别与分派
//!
//! 把任意字符串按固定顺序归入四种语法之一，再交给对应的构造方法：
//!
//! 1. 空串 → 错误
//! 2. `EPSG:` 前缀（忽略大小写与首尾空白）→ [`Crs::from_epsg`]
//! 3. 含 `{` → 宽松 JSON 对象，不经注册表过滤
//! 4. 同时含 `+` 与 `=` → PROJ4 分词
//! 5. 其余 → [`Crs::from_wkt`]
//!
//! 多态入口 [`Crs::from_user_input`] 接受 [`CrsInput`]，可由 CRS、整数、
//! 映射、字符串或 `serde_json::Value` 转换得到。

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

use crate::crs::Crs;
use crate::engine::GeodeticEngine;
use crate::error::{CrsError, CrsResult};
use crate::value::{ParamMap, ParamValue};

// ============================================================================
// 语法识别
// ============================================================================

/// 输入字符串的语法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputGrammar {
    /// 空串（仅含空白的串按 WKT 处理）
    Empty,
    /// `EPSG:<code>`
    Epsg,
    /// JSON 对象
    Json,
    /// PROJ4 参数串
    Proj4,
    /// WKT（兜底）
    Wkt,
}

impl InputGrammar {
    /// 语法名称
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Epsg => "epsg",
            Self::Json => "json",
            Self::Proj4 => "proj4",
            Self::Wkt => "wkt",
        }
    }
}

impl fmt::Display for InputGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `EPSG:` 前缀之后的部分（忽略大小写）
fn epsg_suffix(trimmed: &str) -> Option<&str> {
    let head = trimmed.get(..5)?;
    head.eq_ignore_ascii_case("EPSG:").then(|| &trimmed[5..])
}

/// 识别输入语法，判定顺序固定
#[must_use]
pub fn classify(s: &str) -> InputGrammar {
    if s.is_empty() {
        InputGrammar::Empty
    } else if epsg_suffix(s.trim()).is_some() {
        InputGrammar::Epsg
    } else if s.contains('{') {
        InputGrammar::Json
    } else if s.contains('+') && s.contains('=') {
        InputGrammar::Proj4
    } else {
        InputGrammar::Wkt
    }
}

// ============================================================================
// 宽松 JSON
// ============================================================================

/// 宽松解析接受的非有限数字字面量（长者在前）
const NON_FINITE: [(&str, f64); 4] = [
    ("-Infinity", f64::NEG_INFINITY),
    ("+Infinity", f64::INFINITY),
    ("Infinity", f64::INFINITY),
    ("NaN", f64::NAN),
];

/// 非有限字面量改写成的字符串前缀（解码后以 NUL 开头）
const NON_FINITE_MARK: &str = "\0non-finite:";

/// 字符串外的非有限字面量（后面不能紧跟标识符字符）
fn non_finite_literal(rest: &str) -> Option<&'static str> {
    NON_FINITE.iter().map(|&(literal, _)| literal).find(|literal| {
        rest.strip_prefix(literal)
            .is_some_and(|tail| !tail.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    })
}

/// 改写后的占位字符串还原为非有限浮点数
fn decode_non_finite(s: &str) -> Option<f64> {
    let literal = s.strip_prefix(NON_FINITE_MARK)?;
    NON_FINITE.iter().find(|(l, _)| *l == literal).map(|&(_, x)| x)
}

/// 宽松 JSON 预处理
///
/// - 字符串字面量内的裸控制字符转义为 `\u00XX`
/// - 字符串外的 `NaN` / `Infinity` / `-Infinity` 改写为占位字符串，由 [`json_scalar`] 还原
fn relax_json(s: &str) -> Cow<'_, str> {
    let needs_rewrite =
        s.chars().any(char::is_control) || NON_FINITE.iter().any(|(literal, _)| s.contains(literal));
    if !needs_rewrite {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if u32::from(c) < 0x20 {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
                rest = &rest[c.len_utf8()..];
                continue;
            }
        } else if let Some(literal) = non_finite_literal(rest) {
            out.push_str("\"\\u0000");
            out.push_str(&NON_FINITE_MARK[1..]);
            out.push_str(literal);
            out.push('"');
            rest = &rest[literal.len()..];
            continue;
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(out)
}

/// 宽松解析 JSON 对象：允许字符串内的裸控制字符与非有限数字
fn parse_json_object(s: &str) -> CrsResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(&relax_json(s)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CrsError::json_invalid(format!("expected an object, found {}", json_kind(&other)))),
        Err(err) => Err(CrsError::json_invalid(err)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON 标量 → 参数值；数组内元素的文本形式
fn json_scalar(value: &Value) -> Option<ParamValue> {
    match value {
        Value::Bool(b) => Some(ParamValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ParamValue::Int)
            .or_else(|| n.as_f64().map(ParamValue::Float)),
        Value::String(s) => Some(decode_non_finite(s).map_or_else(|| ParamValue::Str(s.clone()), ParamValue::Float)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// JSON 值 → 参数值；标量数组以逗号连接（PROJ 列表写法，如 `towgs84`）
fn json_value(key: &str, value: &Value) -> CrsResult<ParamValue> {
    if let Value::Array(items) = value {
        let parts = items
            .iter()
            .map(|item| json_scalar(item).map(|v| v.to_string()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CrsError::json_invalid(format!("{key:?} must be a list of scalars")))?;
        return Ok(ParamValue::Str(parts.join(",")));
    }
    json_scalar(value)
        .ok_or_else(|| CrsError::json_invalid(format!("{key:?} has unsupported {} value", json_kind(value))))
}

/// 解码 JSON 对象为有序参数映射（保留调用方顺序，不过滤）
fn json_params(map: &Map<String, Value>) -> CrsResult<ParamMap> {
    map.iter()
        .map(|(key, value)| -> CrsResult<(String, ParamValue)> { Ok((key.clone(), json_value(key, value)?)) })
        .collect()
}

// ============================================================================
// 字符串分派
// ============================================================================

impl Crs {
    /// 从任意字符串创建，按 [`classify`] 的顺序分派
    ///
    /// # Errors
    /// - 空串："CRS is empty or invalid"
    /// - `EPSG:` 后缀为空或不是正整数
    /// - JSON 解析失败："appears to be JSON but is not valid"；空对象："CRS is empty JSON"
    /// - PROJ4 过滤后为空
    /// - WKT 无法被引擎解析
    pub fn from_string<E: GeodeticEngine>(text: &str, engine: &E) -> CrsResult<Self> {
        let grammar = classify(text);
        log::debug!("CRS 输入识别为 {grammar}");
        match grammar {
            InputGrammar::Empty => Err(CrsError::empty_or_invalid(text)),
            InputGrammar::Epsg => {
                let code = epsg_suffix(text.trim()).map(str::trim).unwrap_or_default();
                if code.is_empty() {
                    return Err(CrsError::empty_or_invalid(text));
                }
                let code: i64 = code.parse().map_err(|_| CrsError::non_positive_epsg(code))?;
                Self::from_epsg(code)
            }
            InputGrammar::Json => {
                let map = parse_json_object(text)?;
                if map.is_empty() {
                    return Err(CrsError::json_empty());
                }
                Ok(Self::from_parameters(json_params(&map)?))
            }
            InputGrammar::Proj4 => Self::from_proj4(text),
            InputGrammar::Wkt => Self::from_wkt(text, engine),
        }
    }

    /// 多态入口
    ///
    /// CRS 原样返回；整数按 EPSG；映射按 [`Crs::from_dict`]；字符串按
    /// [`Crs::from_string`]；其余类型报错。
    ///
    /// # Errors
    /// 对应构造方法的错误，或不支持的输入类型
    pub fn from_user_input<E: GeodeticEngine>(input: impl Into<CrsInput>, engine: &E) -> CrsResult<Self> {
        match input.into() {
            CrsInput::Crs(crs) => Ok(crs),
            CrsInput::Epsg(code) => Self::from_epsg(code),
            CrsInput::Mapping(params) => Ok(Self::from_dict(params)),
            CrsInput::Json(map) => Ok(Self::from_dict(json_params(&map)?)),
            CrsInput::Text(text) => Self::from_string(&text, engine),
            CrsInput::Unsupported(kind) => Err(CrsError::unsupported_input(kind)),
        }
    }
}

// ============================================================================
// 多态输入
// ============================================================================

/// [`Crs::from_user_input`] 接受的输入
#[derive(Debug, Clone)]
pub enum CrsInput {
    /// 已有的 CRS
    Crs(Crs),
    /// EPSG 代码
    Epsg(i64),
    /// 参数映射
    Mapping(ParamMap),
    /// JSON 对象
    Json(Map<String, Value>),
    /// 任意字符串
    Text(String),
    /// 不支持的输入，记录其类型名
    Unsupported(&'static str),
}

impl From<Crs> for CrsInput {
    fn from(crs: Crs) -> Self {
        Self::Crs(crs)
    }
}

impl From<&Crs> for CrsInput {
    fn from(crs: &Crs) -> Self {
        Self::Crs(crs.clone())
    }
}

impl From<i64> for CrsInput {
    fn from(code: i64) -> Self {
        Self::Epsg(code)
    }
}

impl From<i32> for CrsInput {
    fn from(code: i32) -> Self {
        Self::Epsg(i64::from(code))
    }
}

impl From<u32> for CrsInput {
    fn from(code: u32) -> Self {
        Self::Epsg(i64::from(code))
    }
}

impl From<ParamMap> for CrsInput {
    fn from(params: ParamMap) -> Self {
        Self::Mapping(params)
    }
}

impl From<&str> for CrsInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for CrsInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for CrsInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Json(map),
            Value::String(text) => Self::Text(text),
            Value::Number(n) => match n.as_i64() {
                Some(code) => Self::Epsg(code),
                None => Self::Unsupported("float"),
            },
            other => Self::Unsupported(json_kind(&other)),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CrsMapping;
    use crate::engine::ReferenceEngine;

    #[test]
    fn test_classify_order() {
        assert_eq!(classify(""), InputGrammar::Empty);
        assert_eq!(classify(" \t\n"), InputGrammar::Wkt);
        assert_eq!(classify("EPSG:4326"), InputGrammar::Epsg);
        assert_eq!(classify("  epsg:4326 "), InputGrammar::Epsg);
        // EPSG 优先于 JSON
        assert_eq!(classify("EPSG:{"), InputGrammar::Epsg);
        // JSON 优先于 PROJ4
        assert_eq!(classify(r#"{"proj": "+a=b"}"#), InputGrammar::Json);
        assert_eq!(classify("+proj=longlat"), InputGrammar::Proj4);
        assert_eq!(classify("+proj"), InputGrammar::Wkt);
        assert_eq!(classify("proj=longlat"), InputGrammar::Wkt);
        assert_eq!(classify("GEOGCS[\"x\"]"), InputGrammar::Wkt);
    }

    #[test]
    fn test_relax_json_control_chars() {
        assert!(matches!(relax_json(r#"{"a": 1}"#), Cow::Borrowed(_)));
        let relaxed = relax_json("{\"a\": \"x\ty\"}\n");
        assert_eq!(relaxed, "{\"a\": \"x\\u0009y\"}\n");
    }

    #[test]
    fn test_relax_json_non_finite_outside_strings_only() {
        let relaxed = relax_json(r#"{"a": NaN, "b": "NaN", "c": [-Infinity, 1]}"#);
        assert_eq!(
            relaxed,
            r#"{"a": "\u0000non-finite:NaN", "b": "NaN", "c": ["\u0000non-finite:-Infinity", 1]}"#
        );
        assert!(non_finite_literal("NaNx").is_none());
        assert_eq!(non_finite_literal("Infinity}"), Some("Infinity"));
    }

    #[test]
    fn test_from_string_json_non_finite_numbers() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string(
            r#"{"proj": "longlat", "lon_wrap": NaN, "a": Infinity, "b": -Infinity, "datum": "NaN"}"#,
            &engine,
        )
        .expect("from_string");
        assert!(crs["lon_wrap"].as_f64().is_some_and(f64::is_nan));
        assert_eq!(crs["a"], ParamValue::Float(f64::INFINITY));
        assert_eq!(crs["b"], ParamValue::Float(f64::NEG_INFINITY));
        assert_eq!(crs["datum"], ParamValue::from("NaN"));

        let err = Crs::from_string(r#"{"proj": NaNa}"#, &engine).expect_err("应当失败");
        assert!(err.message().contains("appears to be JSON but is not valid"));
    }

    #[test]
    fn test_from_string_whitespace_only_goes_to_wkt() {
        let engine = ReferenceEngine::new();
        let err = Crs::from_string("   ", &engine).expect_err("应当失败");
        assert!(err.message().starts_with("The WKT could not be parsed."), "{err}");
        let err = Crs::from_string("", &engine).expect_err("应当失败");
        assert!(err.message().contains("CRS is empty or invalid"));
    }

    #[test]
    fn test_from_string_epsg() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string(" epsg: 32650 ", &engine).expect("from_string");
        assert_eq!(crs.get("init"), Some(&ParamValue::from("epsg:32650")));

        for bad in ["EPSG:", "EPSG:   "] {
            let err = Crs::from_string(bad, &engine).expect_err("应当失败");
            assert!(err.message().contains("CRS is empty or invalid"), "{bad:?}: {err}");
        }
        for bad in ["EPSG:abc", "EPSG:0", "EPSG:-4326", "EPSG:4326.5"] {
            let err = Crs::from_string(bad, &engine).expect_err("应当失败");
            assert!(err.message().contains("EPSG codes are positive integers"), "{bad:?}: {err}");
        }
    }

    #[test]
    fn test_from_string_json_value_with_space_kept_out_of_canonical() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string(r#"{"proj": "longlat", "datum": "WGS 84"}"#, &engine).expect("from_string");
        assert_eq!(crs["datum"], ParamValue::from("WGS 84"));
        assert_eq!(crs.canonical_string(), "+proj=longlat");
    }

    #[test]
    fn test_from_string_json_keeps_unknown_keys() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string(r#"{"proj": "longlat", "custom": 1, "datum": "WGS84"}"#, &engine)
            .expect("from_string");
        let keys: Vec<_> = crs.keys().map(String::as_str).collect();
        assert_eq!(keys, ["proj", "custom", "datum"]);
        assert_eq!(crs.to_proj4_string(), "+proj=longlat +datum=WGS84");
    }

    #[test]
    fn test_from_string_json_values() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string(
            r#"{"proj": "tmerc", "k_0": 0.9996, "x_0": 500000, "no_defs": true, "towgs84": [0, 0, 0.5]}"#,
            &engine,
        )
        .expect("from_string");
        assert_eq!(crs["k_0"], ParamValue::Float(0.9996));
        assert_eq!(crs["x_0"], ParamValue::Int(500_000));
        assert_eq!(crs["no_defs"], ParamValue::Bool(true));
        assert_eq!(crs["towgs84"], ParamValue::from("0,0,0.5"));
    }

    #[test]
    fn test_from_string_json_errors() {
        let engine = ReferenceEngine::new();
        let err = Crs::from_string("{}", &engine).expect_err("空 JSON");
        assert_eq!(err.message(), "CRS is empty JSON");

        for bad in ["not json {", "[{}]", r#"{"proj": null}"#, r#"{"proj": {"a": 1}}"#, r#"{"x": [[1]]}"#] {
            let err = Crs::from_string(bad, &engine).expect_err("应当失败");
            assert!(err.message().contains("appears to be JSON but is not valid"), "{bad:?}: {err}");
        }
    }

    #[test]
    fn test_from_string_json_lenient_control_chars() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string("{\"proj\": \"long\tlat\"}", &engine).expect("from_string");
        assert_eq!(crs["proj"], ParamValue::from("long\tlat"));
    }

    #[test]
    fn test_from_string_proj4_and_wkt() {
        let engine = ReferenceEngine::new();
        let crs = Crs::from_string("+proj=longlat +datum=WGS84 +no_defs +bogus_key=5", &engine).expect("proj4");
        assert_eq!(crs.len(), 3);
        assert!(!crs.contains_key("bogus_key"));

        let err = Crs::from_string("+bogus=1", &engine).expect_err("过滤后为空");
        assert!(err.message().contains("CRS is empty or invalid"));

        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;
        let crs = Crs::from_string(wkt, &engine).expect("wkt");
        assert_eq!(crs.cached_wkt(), Some(wkt));

        let err = Crs::from_string("nonsense", &engine).expect_err("无法解析");
        assert!(err.message().starts_with("The WKT could not be parsed."));
    }

    #[test]
    fn test_from_user_input_variants() {
        let engine = ReferenceEngine::new();
        let original = Crs::from_epsg(4326).expect("from_epsg");
        let same = Crs::from_user_input(&original, &engine).expect("crs");
        assert_eq!(same.data(), original.data());

        let by_code = Crs::from_user_input(4326, &engine).expect("int");
        assert_eq!(by_code.data(), original.data());
        assert!(Crs::from_user_input(0, &engine).is_err());

        let by_text = Crs::from_user_input("EPSG:4326", &engine).expect("str");
        assert_eq!(by_text.data(), original.data());

        let mut params = ParamMap::new();
        params.insert("proj".into(), "longlat".into());
        params.insert("bogus".into(), 1.into());
        let by_map = Crs::from_user_input(params, &engine).expect("map");
        assert_eq!(by_map.len(), 1);
    }

    #[test]
    fn test_from_user_input_json_values() {
        let engine = ReferenceEngine::new();
        let by_object =
            Crs::from_user_input(serde_json::json!({"proj": "longlat", "bogus": 1}), &engine).expect("object");
        assert_eq!(by_object.len(), 1);
        assert!(Crs::from_user_input(serde_json::json!(4326), &engine).is_ok());

        for unsupported in [serde_json::json!(null), serde_json::json!(1.5), serde_json::json!([4326])] {
            let err = Crs::from_user_input(unsupported, &engine).expect_err("不支持");
            assert!(err.message().starts_with("CRS is invalid"), "{err}");
        }
    }
}
