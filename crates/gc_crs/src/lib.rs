// crates/gc_crs/src/lib.rs
//! 坐标参考系统 (CRS) 值类型
//!
//! 从 EPSG 代码、PROJ4 参数串、WKT、JSON 对象等异构描述构造 CRS，
//! 并提供导出、分类与等价比较。几何计算全部委托给几何参考引擎。
//!
//! # 模块
//!
//! - `registry`: 参数键注册表（进程级白名单）
//! - `value`: 参数值与有序参数映射
//! - `proj4`: PROJ4 参数串分词与回写
//! - `input`: 输入语法识别与分派
//! - `crs`: CRS 值对象与映射协议
//! - `engine`: 几何参考引擎接口及实现
//!
//! # 示例
//!
//! ```
//! use gc_crs::prelude::*;
//!
//! let engine = ReferenceEngine::new();
//!
//! let crs = Crs::from_string("+proj=longlat +datum=WGS84 +no_defs", &engine).unwrap();
//! assert_eq!(crs.len(), 3);
//! assert!(crs.is_geographic(&engine).unwrap());
//! assert_eq!(crs.to_epsg(&engine).unwrap(), Some(4326));
//!
//! let utm = Crs::from_user_input("EPSG:32650", &engine).unwrap();
//! assert!(utm.is_projected(&engine).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod crs;
pub mod engine;
pub mod error;
pub mod input;
pub mod proj4;
pub mod registry;
pub mod value;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::{Crs, CrsMapping, CrsView};
    pub use crate::engine::{GeodeticEngine, ReferenceEngine};
    pub use crate::error::{CrsError, CrsResult};
    pub use crate::input::{CrsInput, InputGrammar};
    pub use crate::value::{ParamMap, ParamValue};
}

// 重导出常用类型
pub use crs::{Crs, CrsMapping, CrsView};
pub use engine::{EngineError, EngineResult, GeodeticEngine, ReferenceEngine};
pub use error::{CrsError, CrsResult};
pub use input::{classify, CrsInput, InputGrammar};
pub use value::{ParamMap, ParamValue};

#[cfg(feature = "gdal")]
pub use engine::GdalEngine;
