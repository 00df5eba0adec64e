// crates/gc_crs/src/registry.rs

//! 参数键注册表
//!
//! 进程级的 PROJ 参数白名单，首次访问时由固定参考表构建一次，之后只读。
//! 参考表中的重复条目合并为一个键，构建结果与表的遍历顺序无关。
//!
//! # 示例
//!
//! ```
//! use gc_crs::registry;
//!
//! assert!(registry::is_recognized("lat_0"));
//! assert!(!registry::is_recognized("bogus_key"));
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 为兼容后续 PROJ 版本预留的附加键
pub const RESERVED_KEY: &str = "no_mayo";

/// PROJ 通用参数参考表 `(键, 说明)`
///
/// 椭球体、基准面、投影、单位参数；部分键重复出现，说明为空表示表中未给出
const PARAMETER_TABLE: &[(&str, &str)] = &[
    // 通用参数
    ("a", "Semimajor radius of the ellipsoid axis"),
    ("alpha", "Azimuth of the centre line, used with Oblique Mercator"),
    ("axis", "Axis orientation"),
    ("b", "Semiminor radius of the ellipsoid axis"),
    ("datum", "Datum name (see `proj -ld`)"),
    ("ellps", "Ellipsoid name (see `proj -le`)"),
    ("init", "Initialize from a named CRS"),
    ("k", "Scaling factor (old name)"),
    ("k_0", "Scaling factor (new name)"),
    ("lat_0", "Latitude of origin"),
    ("lat_1", "Latitude of first standard parallel"),
    ("lat_2", "Latitude of second standard parallel"),
    ("lat_ts", "Latitude of true scale"),
    ("lon_0", "Central meridian"),
    ("lonc", "Longitude of the centre line, used with Oblique Mercator"),
    ("lon_wrap", "Center longitude to use for wrapping"),
    ("nadgrids", "Filename of NTv2 grid file to use for datum transforms"),
    ("geoidgrids", "Filename of vertical grid file"),
    ("no_defs", "Don't use the proj_def.dat defaults file"),
    ("over", "Allow longitude output outside -180 to 180 range"),
    ("pm", "Alternate prime meridian (typically a city name)"),
    ("proj", "Projection name (see `proj -l`)"),
    ("south", "Denotes southern hemisphere UTM zone"),
    ("to_meter", "Multiplier to convert map units to 1.0m"),
    ("towgs84", "3 or 7 term datum transform parameters"),
    ("units", "meters, US survey feet, etc."),
    ("vto_meter", "Vertical conversion to meters"),
    ("vunits", "Vertical units"),
    ("x_0", "False easting"),
    ("y_0", "False northing"),
    ("zone", "UTM zone"),
    // 椭球体参数
    ("a", "Semimajor radius of the ellipsoid axis"),
    ("b", "Semiminor radius of the ellipsoid axis"),
    ("e", "Eccentricity of the ellipsoid = sqrt(1 - b^2/a^2)"),
    ("es", "Eccentricity of the ellipsoid squared"),
    ("f", "Flattening of the ellipsoid = 1-sqrt(1-e^2)"),
    ("rf", "Reciprocal of the ellipsoid flattening term (e.g. 298)"),
    ("R", "Radius of the sphere"),
    ("R_A", "Radius of a sphere with the same area as the ellipsoid"),
    ("R_V", "Radius of a sphere with the same volume as the ellipsoid"),
    ("R_a", "Arithmetic mean of the major and minor axis"),
    ("R_g", "Geometric mean of the major and minor axis"),
    ("R_h", "Harmonic mean of the major and minor axis"),
    ("R_lat_a", "Arithmetic mean of the radii at the given latitude"),
    ("R_lat_g", "Geometric mean of the radii at the given latitude"),
    ("ellps", "Ellipsoid name (see `proj -le`)"),
    // 投影专用参数
    ("azi", ""),
    ("belgium", ""),
    ("beta", ""),
    ("czech", "Reverse the sign of the output coordinates (Krovak)"),
    ("gamma", "Rectified grid angle"),
    ("geoc", "Use geocentric latitude"),
    ("guam", "Use Guam ellipsoidal formulas (aeqd)"),
    ("h", "Height of the view point (nsper, tpers)"),
    ("K", ""),
    ("lat_b", ""),
    ("lat_t", ""),
    ("lon_1", ""),
    ("lon_2", ""),
    ("lsat", "Landsat satellite number"),
    ("m", ""),
    ("M", ""),
    ("n", ""),
    ("no_cut", ""),
    ("no_off", "No offset"),
    ("no_rot", "No rectification (omerc)"),
    ("no_uoff", "No offset of the u coordinate (omerc)"),
    ("ns", ""),
    ("o_alpha", ""),
    ("o_lat_1", ""),
    ("o_lat_2", ""),
    ("o_lat_c", ""),
    ("o_lat_p", "Latitude of the North pole of the unrotated source CRS"),
    ("o_lon_1", ""),
    ("o_lon_2", ""),
    ("o_lon_c", ""),
    ("o_lon_p", "Longitude of the North pole of the unrotated source CRS"),
    ("o_proj", "Oblique projection"),
    ("p", ""),
    ("path", "Landsat path number"),
    ("q", ""),
    ("rot", ""),
    ("s", ""),
    ("sym", ""),
    ("t", ""),
    ("theta", ""),
    ("tilt", "Angle of the camera tilt (tpers)"),
    ("vopt", ""),
    ("W", ""),
    ("westo", ""),
    ("wktext", "Preserve the PROJ string verbatim in exported WKT"),
    ("x_0", "False easting"),
    ("y_0", "False northing"),
    ("zone", "UTM zone"),
    ("lat_0", "Latitude of origin"),
    ("lon_0", "Central meridian"),
    ("k_0", "Scaling factor (new name)"),
    ("lat_1", "Latitude of first standard parallel"),
    ("lat_2", "Latitude of second standard parallel"),
    ("lat_ts", "Latitude of true scale"),
    ("lonc", ""),
    ("alpha", ""),
    ("south", "Denotes southern hemisphere UTM zone"),
    ("to_meter", "Multiplier to convert map units to 1.0m"),
    ("units", "meters, US survey feet, etc."),
    ("proj", "Projection name (see `proj -l`)"),
    ("over", ""),
    ("pm", ""),
    // 坐标轴与网格
    ("approx", "Use the faster, less accurate tmerc algorithm"),
    ("algo", "Transverse Mercator algorithm selection"),
    ("bgreenwich", ""),
    ("datum_params", ""),
    ("dx", "X-axis translation (helmert)"),
    ("dy", "Y-axis translation (helmert)"),
    ("dz", "Z-axis translation (helmert)"),
    ("rx", "X-axis rotation (helmert)"),
    ("ry", "Y-axis rotation (helmert)"),
    ("rz", "Z-axis rotation (helmert)"),
    ("convention", "Rotation convention (helmert)"),
    ("hgridshift", ""),
    ("vgridshift", ""),
    ("grids", "Grid files to use"),
    ("inv", "Run the operation in reverse"),
    ("lat_c", ""),
    ("lon_c", ""),
    ("mode", ""),
    ("no_uoff", ""),
    ("orient", ""),
    ("omit_fwd", ""),
    ("omit_inv", ""),
    ("pconvert", ""),
    ("phdg_0", ""),
    ("plat_0", ""),
    ("plon_0", ""),
    ("proj_obs", ""),
    ("sweep", "Sweep angle axis of the viewing instrument (geos)"),
    ("type", "Object type, e.g. crs"),
    ("xy_in", ""),
    ("xy_out", ""),
    ("z_in", ""),
    ("z_out", ""),
    ("zone_1", ""),
    ("zone_2", ""),
    ("a_0", ""),
    ("b_0", ""),
    ("e_0", ""),
    ("n_0", ""),
    ("north_square", ""),
    ("south_square", ""),
    ("variant_c", ""),
    ("hh", ""),
    ("hvo", ""),
    // 多点投影与离散全球格网
    ("lat_3", "Latitude of the third control point (chamb)"),
    ("lon_3", "Longitude of the third control point (chamb)"),
    ("aperture", "Aperture of the discrete global grid (isea)"),
    ("resolution", "Resolution of the discrete global grid (isea)"),
    // 时变七参数（helmert）
    ("x", "X-axis translation"),
    ("y", "Y-axis translation"),
    ("z", "Z-axis translation"),
    ("ds", "Scale rate"),
    ("ddx", "X-axis translation rate"),
    ("ddy", "Y-axis translation rate"),
    ("ddz", "Z-axis translation rate"),
    ("drx", "X-axis rotation rate"),
    ("dry", "Y-axis rotation rate"),
    ("drz", "Z-axis rotation rate"),
    ("t_epoch", "Central epoch of the transformation"),
    ("t_obs", "Observation time"),
    ("exact", "Use exact rotation matrix"),
    ("transpose", "Transpose the rotation matrix"),
];

static REGISTRY: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut keys: BTreeMap<&'static str, &'static str> = BTreeMap::new();
    for &(key, description) in PARAMETER_TABLE {
        let slot = keys.entry(key).or_insert(description);
        // 重复键：保留非空说明中字典序最小者，与表内顺序无关
        if !description.is_empty() && (slot.is_empty() || description < *slot) {
            *slot = description;
        }
    }
    keys.entry(RESERVED_KEY).or_insert("");
    log::trace!("参数键注册表已构建: {} 个键", keys.len());
    keys
});

/// 键是否为已识别的 PROJ 参数
#[inline]
#[must_use]
pub fn is_recognized(key: &str) -> bool {
    REGISTRY.contains_key(key)
}

/// 已识别参数的说明（表中未给出说明时为空串）
#[must_use]
pub fn description(key: &str) -> Option<&'static str> {
    REGISTRY.get(key).copied()
}

/// 已识别键的数量
#[must_use]
pub fn len() -> usize {
    REGISTRY.len()
}

/// 按字典序遍历所有已识别键及其说明
pub fn entries() -> impl Iterator<Item = (&'static str, &'static str)> {
    REGISTRY.iter().map(|(k, d)| (*k, *d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_common_keys_recognized() {
        for key in ["proj", "datum", "ellps", "lat_0", "lon_0", "towgs84", "no_defs", "init"] {
            assert!(is_recognized(key), "{key} 应被识别");
        }
    }

    #[test]
    fn test_reserved_key_recognized() {
        assert!(is_recognized(RESERVED_KEY));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(!is_recognized("bogus_key"));
        assert!(!is_recognized(""));
        assert!(!is_recognized("+proj"));
        // 区分大小写
        assert!(!is_recognized("PROJ"));
        assert!(is_recognized("R"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let distinct: BTreeSet<&str> = PARAMETER_TABLE.iter().map(|(k, _)| *k).collect();
        assert!(distinct.len() < PARAMETER_TABLE.len());
        // 去重后的表键 + 预留键
        assert_eq!(len(), distinct.len() + 1);
        assert!(len() >= 140);
    }

    #[test]
    fn test_description_lookup() {
        assert_eq!(description("lat_ts"), Some("Latitude of true scale"));
        assert_eq!(description("azi"), Some(""));
        assert_eq!(description("bogus_key"), None);
    }

    #[test]
    fn test_entries_sorted() {
        let keys: Vec<&str> = entries().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_concurrent_first_use() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (is_recognized("proj"), len())))
            .collect();
        for h in handles {
            let (ok, n) = h.join().expect("线程失败");
            assert!(ok);
            assert_eq!(n, len());
        }
    }
}
