// crates/gc_crs/src/engine/reference/ellipsoid.rs

//! 椭球体定义
//!
//! 参考引擎使用的椭球体参数，以及与 PROJ 名称、WKT 名称之间的对应关系。

use std::fmt;

/// 长半轴比较容差 (m)
const AXIS_TOLERANCE: f64 = 1e-3;

/// 扁率比较容差
const FLATTENING_TOLERANCE: f64 = 1e-12;

/// 地球椭球体
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// 长半轴 (m)
    pub a: f64,
    /// 扁率 (flattening)，球体为 0
    pub f: f64,
}

impl Ellipsoid {
    // ========================================================================
    // 预定义椭球体
    // ========================================================================

    /// WGS84 椭球体 (EPSG:7030)
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 椭球体 (EPSG:7019)，CGCS2000 与 ETRS89 亦采用
    pub const GRS80: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// WGS72 椭球体 (EPSG:7043)
    pub const WGS72: Self = Self {
        a: 6_378_135.0,
        f: 1.0 / 298.26,
    };

    /// Clarke 1866 椭球体 (EPSG:7008)，NAD27 采用
    pub const CLARKE_1866: Self = Self {
        a: 6_378_206.4,
        f: 1.0 / 294.978_698_213_898,
    };

    /// 克拉索夫斯基椭球体 (EPSG:7024)
    pub const KRASSOVSKY: Self = Self {
        a: 6_378_245.0,
        f: 1.0 / 298.3,
    };

    /// 国际椭球体 1924 (EPSG:7022)
    pub const INTERNATIONAL_1924: Self = Self {
        a: 6_378_388.0,
        f: 1.0 / 297.0,
    };

    /// Bessel 1841 椭球体 (EPSG:7004)
    pub const BESSEL_1841: Self = Self {
        a: 6_377_397.155,
        f: 1.0 / 299.152_812_8,
    };

    /// 伪墨卡托使用的球体
    pub const WEB_MERCATOR_SPHERE: Self = Self::sphere(6_378_137.0);

    /// PROJ 椭球体名称表 `(PROJ 名称, WKT 名称, 椭球体)`
    const NAMED: &'static [(&'static str, &'static str, Self)] = &[
        ("WGS84", "WGS 84", Self::WGS84),
        ("GRS80", "GRS 1980", Self::GRS80),
        ("WGS72", "WGS 72", Self::WGS72),
        ("clrk66", "Clarke 1866", Self::CLARKE_1866),
        ("krass", "Krassowsky 1940", Self::KRASSOVSKY),
        ("intl", "International 1924", Self::INTERNATIONAL_1924),
        ("bessel", "Bessel 1841", Self::BESSEL_1841),
    ];

    // ========================================================================
    // 构造方法
    // ========================================================================

    /// 从长半轴和扁率创建椭球体
    #[must_use]
    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// 球体
    #[must_use]
    pub const fn sphere(radius: f64) -> Self {
        Self { a: radius, f: 0.0 }
    }

    /// 从长半轴和反扁率创建；反扁率为 0 表示球体（WKT 约定）
    #[must_use]
    pub fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        if rf == 0.0 {
            Self::sphere(a)
        } else {
            Self { a, f: 1.0 / rf }
        }
    }

    /// 从长半轴和短半轴创建椭球体
    #[must_use]
    pub fn from_semi_axes(a: f64, b: f64) -> Self {
        let f = (a - b) / a;
        Self { a, f }
    }

    /// 按 PROJ 名称（`+ellps=`）查找
    #[must_use]
    pub fn from_proj_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(proj, _, _)| proj.eq_ignore_ascii_case(name))
            .map(|(_, _, e)| *e)
    }

    // ========================================================================
    // 派生参数
    // ========================================================================

    /// 短半轴 b = a(1-f)
    #[inline]
    #[must_use]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// 反扁率；球体为 0
    #[inline]
    #[must_use]
    pub fn rf(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            1.0 / self.f
        }
    }

    /// 是否为球体
    #[inline]
    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.f == 0.0
    }

    /// 在容差内是否相同
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.a - other.a).abs() < AXIS_TOLERANCE && (self.f - other.f).abs() < FLATTENING_TOLERANCE
    }

    /// PROJ 名称（非命名椭球体为 `None`）
    #[must_use]
    pub fn proj_name(&self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, _, e)| e.approx_eq(self))
            .map(|(proj, _, _)| *proj)
    }

    /// WKT 名称
    #[must_use]
    pub fn wkt_name(&self) -> &'static str {
        Self::NAMED
            .iter()
            .find(|(_, _, e)| e.approx_eq(self))
            .map_or("unknown", |(_, wkt, _)| *wkt)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sphere() {
            write!(f, "Sphere(R={})", self.a)
        } else {
            write!(f, "Ellipsoid(a={}, f=1/{:.6})", self.a, self.rf())
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
