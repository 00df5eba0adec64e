// crates/gc_crs/src/proj4.rs

//! PROJ4 参数串分词与回写
//!
//! 分词规则：
//! 1. 按空白切分，去掉每个记号开头的一个 `+`
//! 2. 在第一个 `=` 处切分；没有 `=` 的记号为布尔标志 `true`
//! 3. 值按 [`ParamValue::coerce`] 强制转换
//! 4. 丢弃注册表之外的键
//! 5. 重复键：后值覆盖前值，位置保持首次出现处
//!
//! [`render`] 是分词的逆：对同一映射先回写再分词得到过滤后的原映射。
//!
//! # 示例
//!
//! ```
//! use gc_crs::proj4;
//! use gc_crs::ParamValue;
//!
//! let params = proj4::tokenize("+proj=longlat +datum=WGS84 +no_defs");
//! assert_eq!(params["no_defs"], ParamValue::Bool(true));
//! assert_eq!(proj4::render(&params), "+proj=longlat +datum=WGS84 +no_defs");
//! ```

use crate::registry;
use crate::value::{ParamMap, ParamValue};

/// 拆分为未过滤的 `(键, 值)` 序列
pub fn pairs(s: &str) -> impl Iterator<Item = (&str, ParamValue)> {
    s.split_whitespace().map(|token| {
        let token = token.strip_prefix('+').unwrap_or(token);
        match token.split_once('=') {
            Some((key, raw)) => (key, ParamValue::coerce(raw)),
            None => (token, ParamValue::Bool(true)),
        }
    })
}

/// 分词并按注册表过滤
#[must_use]
pub fn tokenize(s: &str) -> ParamMap {
    let mut params = ParamMap::new();
    for (key, value) in pairs(s) {
        if !registry::is_recognized(key) {
            log::trace!("丢弃未识别的参数: {key}={value}");
            continue;
        }
        // IndexMap::insert 覆盖值时保留原位置
        params.insert(key.to_owned(), value);
    }
    params
}

/// 把参数映射回写为 PROJ4 串（映射顺序）
///
/// `true` 标志写作 `+key`，`false` 标志省略，未识别的键省略。
/// 含空白的值无法成为单个记号，记录警告后省略。
pub fn render<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
{
    let mut tokens = Vec::new();
    for (key, value) in params {
        if !registry::is_recognized(key) {
            continue;
        }
        match value {
            ParamValue::Bool(true) => tokens.push(format!("+{key}")),
            ParamValue::Bool(false) => {}
            ParamValue::Str(text) if text.contains(char::is_whitespace) => {
                log::warn!("参数 {key} 的值 {text:?} 含空白，回写时省略");
            }
            other => tokens.push(format!("+{key}={other}")),
        }
    }
    tokens.join(" ")
}
