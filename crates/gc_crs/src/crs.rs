// crates/gc_crs/src/crs.rs

//! 坐标参考系统 (CRS) 值对象
//!
//! `Crs` 持有两种互为替代的表示之一：
//!
//! - 显式参数映射（EPSG、PROJ4、JSON、映射构造）
//! - 缓存的 WKT 原文（WKT 构造）
//!
//! 两者都不会由另一方预先派生。需要几何知识的查询（WKT 导出、EPSG 识别、
//! 地理/投影判定、等价比较）全部通过 [`GeodeticEngine`] 完成，每次调用自行获取并释放句柄。
//!
//! # 示例
//!
//! ```
//! use gc_crs::{Crs, CrsMapping, ParamValue, ReferenceEngine};
//!
//! let engine = ReferenceEngine::new();
//! let wgs84 = Crs::from_epsg(4326).unwrap();
//! assert!(wgs84.is_geographic(&engine).unwrap());
//! assert_eq!(wgs84.to_epsg(&engine).unwrap(), Some(4326));
//! assert_eq!(wgs84.get("no_defs"), Some(&ParamValue::Bool(true)));
//!
//! let proj = Crs::from_proj4("+proj=longlat +datum=WGS84 +no_defs").unwrap();
//! assert!(wgs84.with_engine(&engine) == proj.with_engine(&engine));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::engine::{EngineResult, GeodeticEngine};
use crate::error::{CrsError, CrsResult};
use crate::proj4;
use crate::registry;
use crate::value::{ParamMap, ParamValue};

// ============================================================================
// 映射抽象
// ============================================================================

/// 参数映射迭代器（插入顺序）
pub type Iter<'a> = indexmap::map::Iter<'a, String, ParamValue>;

/// 只读参数映射
///
/// 以插入顺序提供键查询、遍历与长度，由 [`Crs`] 实现
pub trait CrsMapping {
    /// 按键取值
    fn get(&self, key: &str) -> Option<&ParamValue>;

    /// 按插入顺序遍历
    fn iter(&self) -> Iter<'_>;

    /// 键数量
    fn len(&self) -> usize;

    /// 是否包含键
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 是否没有任何键
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按插入顺序遍历键
    fn keys(&self) -> indexmap::map::Keys<'_, String, ParamValue>;
}

// ============================================================================
// 坐标参考系统
// ============================================================================

/// 坐标参考系统
///
/// 构造后不可变。`Default` 为空 CRS（“无坐标系”），是合法的特殊状态。
#[derive(Debug, Clone, Default)]
pub struct Crs {
    /// 显式参数映射（插入顺序）
    parameters: ParamMap,
    /// WKT 构造时的原文
    cached_wkt: Option<String>,
}

impl Crs {
    // ========================================================================
    // 构造方法
    // ========================================================================

    /// 空 CRS
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从 EPSG 代码创建
    ///
    /// 不查询任何数据库，只记录 `+init=epsg:<code> +no_defs`，由引擎在需要时解析。
    ///
    /// # Errors
    /// 代码不是正整数时返回错误
    pub fn from_epsg(code: i64) -> CrsResult<Self> {
        if code <= 0 {
            return Err(CrsError::non_positive_epsg(code));
        }
        let mut parameters = ParamMap::with_capacity(2);
        parameters.insert("init".to_owned(), ParamValue::Str(format!("epsg:{code}")));
        parameters.insert("no_defs".to_owned(), ParamValue::Bool(true));
        Ok(Self::from_parameters(parameters))
    }

    /// 从键值对直接创建
    ///
    /// 注册表之外的键被丢弃；重复键后值覆盖前值，位置保持首次出现处
    pub fn from_dict<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut parameters = ParamMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if registry::is_recognized(&key) {
                parameters.insert(key, value.into());
            } else {
                log::trace!("映射构造丢弃未识别的键: {key}");
            }
        }
        Self::from_parameters(parameters)
    }

    /// 从 PROJ4 参数串创建（仅分词，不经引擎）
    ///
    /// # Errors
    /// 过滤后没有任何参数时返回错误
    pub fn from_proj4(text: &str) -> CrsResult<Self> {
        let parameters = proj4::tokenize(text);
        if parameters.is_empty() {
            return Err(CrsError::empty_or_invalid(text));
        }
        Ok(Self::from_parameters(parameters))
    }

    /// 从 WKT 创建
    ///
    /// 引擎解释文本、做 ESRI 规范化并试导出 PROJ4 作为校验；成功后原文原样缓存，
    /// 参数映射为空。句柄在所有路径上释放。
    ///
    /// # Errors
    /// 引擎无法解析、规范化或导出时返回 "The WKT could not be parsed" 错误
    pub fn from_wkt<E: GeodeticEngine>(text: &str, engine: &E) -> CrsResult<Self> {
        let validate = || -> EngineResult<()> {
            let handle = engine.interpret_normalized(text)?;
            let exported = engine.export_proj4(&handle);
            engine.release(handle);
            exported.map(drop)
        };
        validate().map_err(CrsError::wkt_parse_failed)?;
        Ok(Self {
            parameters: ParamMap::new(),
            cached_wkt: Some(text.to_owned()),
        })
    }

    /// 未经过滤的参数映射（JSON 输入路径）
    pub(crate) fn from_parameters(parameters: ParamMap) -> Self {
        Self {
            parameters,
            cached_wkt: None,
        }
    }

    // ========================================================================
    // 表示
    // ========================================================================

    /// 是否为空 CRS
    #[must_use]
    pub fn is_empty_crs(&self) -> bool {
        self.parameters.is_empty() && self.cached_wkt.is_none()
    }

    /// 显式参数映射
    #[must_use]
    pub fn data(&self) -> &ParamMap {
        &self.parameters
    }

    /// WKT 构造时缓存的原文
    #[must_use]
    pub fn cached_wkt(&self) -> Option<&str> {
        self.cached_wkt.as_deref()
    }

    /// 参数映射回写的 PROJ4 串（映射顺序，过滤未识别的键）
    #[must_use]
    pub fn to_proj4_string(&self) -> String {
        proj4::render(&self.parameters)
    }

    /// 交给引擎的规范字符串：缓存的 WKT，否则为 PROJ4 回写
    #[must_use]
    pub fn canonical_string(&self) -> Cow<'_, str> {
        match &self.cached_wkt {
            Some(wkt) => Cow::Borrowed(wkt),
            None => Cow::Owned(self.to_proj4_string()),
        }
    }

    // ========================================================================
    // 引擎查询
    // ========================================================================

    /// 解释规范字符串（含 ESRI 规范化）后在句柄上执行 `query`，然后释放句柄
    fn query<E, T>(
        &self,
        engine: &E,
        operation: &str,
        query: impl FnOnce(&mut E::Handle) -> EngineResult<T>,
    ) -> CrsResult<T>
    where
        E: GeodeticEngine,
    {
        if self.is_empty_crs() {
            return Err(CrsError::empty_crs(operation));
        }
        let mut handle = engine.interpret_normalized(&self.canonical_string())?;
        let result = query(&mut handle);
        engine.release(handle);
        Ok(result?)
    }

    /// WKT 表示
    ///
    /// # Errors
    /// 空 CRS，或引擎解析/导出失败
    pub fn wkt<E: GeodeticEngine>(&self, engine: &E) -> CrsResult<String> {
        if let Some(wkt) = &self.cached_wkt {
            return Ok(wkt.clone());
        }
        self.query(engine, "WKT", |handle| engine.export_wkt(handle))
    }

    /// 参数映射
    ///
    /// 有显式映射时返回其副本；WKT 构造的 CRS 由引擎导出 PROJ4 后重新分词，
    /// 每次调用都重新派生，不缓存。空 CRS 返回空映射。
    ///
    /// # Errors
    /// 引擎解析/导出失败
    pub fn to_dict<E: GeodeticEngine>(&self, engine: &E) -> CrsResult<ParamMap> {
        if !self.parameters.is_empty() || self.cached_wkt.is_none() {
            return Ok(self.parameters.clone());
        }
        let exported = self.query(engine, "parameters", |handle| engine.export_proj4(handle))?;
        Ok(proj4::tokenize(&exported))
    }

    /// 识别 EPSG 代码；识别不出时为 `Ok(None)`，空 CRS 同样为 `Ok(None)`
    ///
    /// # Errors
    /// 引擎无法解析规范字符串
    pub fn to_epsg<E: GeodeticEngine>(&self, engine: &E) -> CrsResult<Option<u32>> {
        if self.is_empty_crs() {
            return Ok(None);
        }
        self.query(engine, "EPSG code", |handle| Ok(engine.autodetect_epsg(handle)))
    }

    /// 是否为地理坐标系
    ///
    /// # Errors
    /// 空 CRS，或引擎无法解析
    pub fn is_geographic<E: GeodeticEngine>(&self, engine: &E) -> CrsResult<bool> {
        self.query(engine, "geographic classification", |handle| Ok(engine.is_geographic(handle)))
    }

    /// 是否为投影坐标系
    ///
    /// # Errors
    /// 空 CRS，或引擎无法解析
    pub fn is_projected<E: GeodeticEngine>(&self, engine: &E) -> CrsResult<bool> {
        self.query(engine, "projected classification", |handle| Ok(engine.is_projected(handle)))
    }

    // ========================================================================
    // 等价
    // ========================================================================

    /// 几何等价
    ///
    /// 任一方为空时，当且仅当双方都为空才等价，不调用引擎。
    /// 否则双方各自解释为句柄，由引擎判定；两个句柄在所有路径上释放。
    ///
    /// # Errors
    /// 引擎无法解析任一方
    pub fn equivalent<E: GeodeticEngine>(&self, other: &Self, engine: &E) -> CrsResult<bool> {
        match (self.is_empty_crs(), other.is_empty_crs()) {
            (true, true) => return Ok(true),
            (true, false) | (false, true) => return Ok(false),
            (false, false) => {}
        }
        let lhs = engine.interpret_normalized(&self.canonical_string())?;
        let rhs = match engine.interpret_normalized(&other.canonical_string()) {
            Ok(handle) => handle,
            Err(err) => {
                engine.release(lhs);
                return Err(err.into());
            }
        };
        let same = engine.compare_equivalent(&lhs, &rhs);
        engine.release(lhs);
        engine.release(rhs);
        Ok(same)
    }

    /// 绑定引擎，得到可用 `==` 比较的视图
    #[must_use]
    pub fn with_engine<'a, E: GeodeticEngine>(&'a self, engine: &'a E) -> CrsView<'a, E> {
        CrsView { crs: self, engine }
    }

    /// 两者的表示是否逐字相同
    fn same_representation(&self, other: &Self) -> bool {
        self.cached_wkt == other.cached_wkt && self.parameters == other.parameters
    }
}

// ============================================================================
// 绑定引擎的视图
// ============================================================================

/// 绑定了引擎的 CRS 视图
///
/// `==` 委托给 [`Crs::equivalent`]。引擎报错时记录警告并退回到表示是否逐字相同，
/// 因此对任何 CRS 都保持自反。
#[derive(Debug)]
pub struct CrsView<'a, E> {
    crs: &'a Crs,
    engine: &'a E,
}

impl<E> Clone for CrsView<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for CrsView<'_, E> {}

impl<'a, E> CrsView<'a, E> {
    /// 所绑定的 CRS
    #[must_use]
    pub fn crs(&self) -> &'a Crs {
        self.crs
    }
}

impl<E: GeodeticEngine> PartialEq for CrsView<'_, E> {
    fn eq(&self, other: &Self) -> bool {
        match self.crs.equivalent(other.crs, self.engine) {
            Ok(same) => same,
            Err(err) => {
                log::warn!("{} 引擎无法比较 CRS，按表示比较: {err}", self.engine.name());
                self.crs.same_representation(other.crs)
            }
        }
    }
}

// ============================================================================
// 映射协议与格式化
// ============================================================================

impl CrsMapping for Crs {
    fn get(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    fn iter(&self) -> Iter<'_> {
        self.parameters.iter()
    }

    fn len(&self) -> usize {
        self.parameters.len()
    }

    fn keys(&self) -> indexmap::map::Keys<'_, String, ParamValue> {
        self.parameters.keys()
    }
}

impl<'a> IntoIterator for &'a Crs {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl Index<&str> for Crs {
    type Output = ParamValue;

    /// # Panics
    /// 键不存在时 panic，与 `IndexMap` 一致
    fn index(&self, key: &str) -> &ParamValue {
        &self.parameters[key]
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_crs() {
            f.write_str("<empty CRS>")
        } else {
            f.write_str(&self.canonical_string())
        }
    }
}

impl Serialize for Crs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.cached_wkt {
            Some(wkt) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("wkt", wkt)?;
                map.end()
            }
            None => self.parameters.serialize(serializer),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
