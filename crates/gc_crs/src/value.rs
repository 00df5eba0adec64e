// crates/gc_crs/src/value.rs

//! CRS 参数值
//!
//! 参数值只有四种标量形态：布尔、整数、浮点、字符串，从不出现复合类型。
//! 字符串到值的强制转换规则见 [`ParamValue::coerce`]。

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 有序参数映射（键唯一，保留插入顺序）
pub type ParamMap = IndexMap<String, ParamValue>;

/// CRS 参数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// 布尔标志（如 `+no_defs`）
    Bool(bool),
    /// 整数（如 `+zone=50`）
    Int(i64),
    /// 浮点数（如 `+k_0=0.9996`）
    Float(f64),
    /// 原样字符串（如 `+datum=WGS84`）
    Str(String),
}

impl ParamValue {
    /// 按固定顺序强制转换原始字符串
    ///
    /// 布尔字面量（仅 `true`/`True`/`false`/`False` 四种拼写）→ 整数 → 浮点 → 原串
    ///
    /// # 示例
    ///
    /// ```
    /// use gc_crs::ParamValue;
    ///
    /// assert_eq!(ParamValue::coerce("True"), ParamValue::Bool(true));
    /// assert_eq!(ParamValue::coerce("50"), ParamValue::Int(50));
    /// assert_eq!(ParamValue::coerce("0.9996"), ParamValue::Float(0.9996));
    /// assert_eq!(ParamValue::coerce("TRUE"), ParamValue::Str("TRUE".into()));
    /// ```
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" | "True" => return Self::Bool(true),
            "false" | "False" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Self::Float(f);
        }
        Self::Str(raw.to_owned())
    }

    /// 布尔值（仅 `Bool` 变体）
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 整数值（仅 `Int` 变体）
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// 数值（`Int` 或 `Float`）
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// 字符串值（仅 `Str` 变体）
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// 变体名称
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            // 整数值的浮点保留小数点，重新分词后仍为 Float
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
