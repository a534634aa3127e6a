// Geodesy module - coordinate transformations on the WGS84 ellipsoid
//
// Provides conversions from:
// - LLH (Latitude/Longitude/Height) in degrees and meters to ECEF
// - Latitude/Longitude to UTM easting/northing for a fixed zone
//
// Plus UTM zone selection and grid convergence helpers.

use crate::constants::{
    DTOR, UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_K0, WGS84_A, WGS84_E,
};

/// WGS84 ellipsoid flattening factor
const WGS84_F: f64 = 1.0 / 298.257223563;

/// WGS84 ellipsoid semi-minor axis (polar radius) in meters
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// WGS84 ellipsoid eccentricity squared
const WGS84_ECC_SQ: f64 = 1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A);

/// Converts from WGS84 lat/lon/height to ellipsoid-earth ECEF coordinates
///
/// # Arguments
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
/// * `alt` - Altitude in meters above WGS84 ellipsoid
///
/// # Returns
/// ECEF coordinates (x, y, z) in meters
pub fn llh2ecef(lat: f64, lon: f64, alt: f64) -> (f64, f64, f64) {
    let lat_rad = lat * DTOR;
    let lon_rad = lon * DTOR;

    let slat = lat_rad.sin();
    let slon = lon_rad.sin();
    let clat = lat_rad.cos();
    let clon = lon_rad.cos();

    // Radius of curvature in prime vertical
    let d = (1.0 - (slat * slat * WGS84_ECC_SQ)).sqrt();
    let rn = WGS84_A / d;

    let x = (rn + alt) * clat * clon;
    let y = (rn + alt) * clat * slon;
    let z = (rn * (1.0 - WGS84_ECC_SQ) + alt) * slat;

    (x, y, z)
}

/// Normalize a longitude into [-180, 180)
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Selects the UTM zone for a position
///
/// Standard 6 degree zones with the Norway (zone 32) and Svalbard
/// (zones 31/33/35/37) exceptions.
pub fn select_utm_zone(lat: f64, lon: f64) -> u8 {
    let lon = normalize_longitude(lon);

    let mut zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;

    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        zone = 32;
    }

    // Svalbard
    if (72.0..84.0).contains(&lat) {
        if (0.0..9.0).contains(&lon) {
            zone = 31;
        } else if (9.0..21.0).contains(&lon) {
            zone = 33;
        } else if (21.0..33.0).contains(&lon) {
            zone = 35;
        } else if (33.0..42.0).contains(&lon) {
            zone = 37;
        }
    }

    zone
}

/// Central meridian of a UTM zone in degrees (0 for zone 0)
#[inline]
pub fn central_meridian(zone: u8) -> f64 {
    if zone == 0 {
        0.0
    } else {
        (zone as f64 - 1.0) * 6.0 - 177.0
    }
}

/// UTM latitude band letter, 'Z' outside 80S..84N
pub fn utm_letter_designator(lat: f64) -> char {
    const BANDS: &[u8] = b"CDEFGHJKLMNPQRSTUVWX";

    if !(-80.0..=84.0).contains(&lat) {
        return 'Z';
    }
    // Band X spans 72..84
    let index = (((lat + 80.0) / 8.0).floor() as usize).min(BANDS.len() - 1);
    BANDS[index] as char
}

/// Projects lat/lon onto the given UTM zone
///
/// Transverse Mercator series from USGS Bulletin 1532. The zone is fixed by
/// the caller so points near a zone edge stay in the origin's zone.
///
/// # Returns
/// (easting, northing) in meters
pub fn project_to_utm(lat: f64, lon: f64, zone: u8) -> (f64, f64) {
    let a = WGS84_A;
    let ecc_sq = WGS84_E * WGS84_E;
    let k0 = UTM_K0;

    let lat_rad = lat * DTOR;
    let lon_rad = normalize_longitude(lon) * DTOR;
    let lon_origin_rad = central_meridian(zone) * DTOR;

    let ecc_prime_sq = ecc_sq / (1.0 - ecc_sq);

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let tan_lat = lat_rad.tan();

    let n = a / (1.0 - ecc_sq * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ecc_prime_sq * cos_lat * cos_lat;
    let aa = cos_lat * (lon_rad - lon_origin_rad);

    let e4 = ecc_sq * ecc_sq;
    let e6 = e4 * ecc_sq;

    // Meridional arc
    let m = a * ((1.0 - ecc_sq / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
        - (3.0 * ecc_sq / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin());

    let a2 = aa * aa;
    let a3 = a2 * aa;
    let a4 = a3 * aa;
    let a5 = a4 * aa;
    let a6 = a5 * aa;

    let easting = k0 * n
        * (aa + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ecc_prime_sq) * a5 / 120.0)
        + UTM_FALSE_EASTING;

    let mut northing = k0
        * (m + n * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ecc_prime_sq) * a6 / 720.0));

    if lat < 0.0 {
        northing += UTM_FALSE_NORTHING_SOUTH;
    }

    (easting, northing)
}

/// Grid convergence angle in radians: angle between grid north and true north
pub fn convergence_angle(lat: f64, lon: f64, zone: u8) -> f64 {
    let lat_rad = lat * DTOR;
    let lon_rad = lon * DTOR;
    let meridian_rad = central_meridian(zone) * DTOR;

    ((lon_rad - meridian_rad).tan() * lat_rad.sin()).atan()
}

/// Rotates east/north position standard deviations onto the UTM grid axes
///
/// # Returns
/// (std_x, std_y)
pub fn rotate_covariance_to_local_frame(std_east: f64, std_north: f64, lat: f64, lon: f64, zone: u8) -> (f64, f64) {
    let gamma = convergence_angle(lat, lon, zone);
    let (sin_g, cos_g) = gamma.sin_cos();

    let std_x = std_north * cos_g - std_east * sin_g;
    let std_y = std_north * sin_g + std_east * cos_g;

    (std_x, std_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_llh2ecef_equator() {
        let (x, y, z) = llh2ecef(0.0, 0.0, 0.0);
        assert!((x - WGS84_A).abs() < EPSILON);
        assert!(y.abs() < EPSILON);
        assert!(z.abs() < EPSILON);
    }

    #[test]
    fn test_llh2ecef_north_pole() {
        let (x, y, z) = llh2ecef(90.0, 0.0, 0.0);
        assert!(x.abs() < EPSILON);
        assert!(y.abs() < EPSILON);
        assert!((z - WGS84_B).abs() < 1.0);
    }

    #[test]
    fn test_llh2ecef_altitude() {
        let (x, _, _) = llh2ecef(0.0, 0.0, 1000.0);
        assert!((x - WGS84_A - 1000.0).abs() < EPSILON);
    }

    #[test]
    fn test_select_zone_standard() {
        assert_eq!(select_utm_zone(0.0, -177.0), 1);
        assert_eq!(select_utm_zone(45.0, 7.0), 32);
        assert_eq!(select_utm_zone(51.5, -0.1), 30);
        assert_eq!(select_utm_zone(40.7, -74.0), 18);
        assert_eq!(select_utm_zone(-33.9, 151.2), 56);
        assert_eq!(select_utm_zone(0.0, 179.9), 60);
    }

    #[test]
    fn test_select_zone_normalizes_longitude() {
        assert_eq!(select_utm_zone(0.0, 180.0), 1);
        assert_eq!(select_utm_zone(0.0, 183.0), 1);
        assert_eq!(select_utm_zone(0.0, -183.0), 60);
    }

    #[test]
    fn test_select_zone_norway() {
        // Bergen, 5.3E, would be zone 31 by the formula
        assert_eq!(select_utm_zone(60.4, 5.3), 32);
        assert_eq!(select_utm_zone(60.4, 2.9), 31);
        assert_eq!(select_utm_zone(64.0, 5.3), 31);
    }

    #[test]
    fn test_select_zone_svalbard() {
        assert_eq!(select_utm_zone(75.0, 10.0), 33);
        assert_eq!(select_utm_zone(78.2, 8.9), 31);
        assert_eq!(select_utm_zone(78.2, 15.6), 33);
        assert_eq!(select_utm_zone(78.2, 25.0), 35);
        assert_eq!(select_utm_zone(78.2, 40.0), 37);
        // Outside the sub-bands falls back to the standard formula
        assert_eq!(select_utm_zone(78.2, 45.0), 38);
        assert_eq!(select_utm_zone(78.2, -10.0), 29);
    }

    #[test]
    fn test_project_central_meridian_equator() {
        for zone in [1u8, 18, 31, 32, 60] {
            let (e, n) = project_to_utm(0.0, central_meridian(zone), zone);
            assert!((e - 500000.0).abs() < 1e-3, "zone {} easting {}", zone, e);
            assert!(n.abs() < 1e-3, "zone {} northing {}", zone, n);
        }
    }

    #[test]
    fn test_project_known_point() {
        // Eiffel Tower, zone 31U
        let (e, n) = project_to_utm(48.8583, 2.2945, 31);
        assert!((e - 448252.0).abs() < 5.0, "easting {}", e);
        assert!((n - 5411943.8).abs() < 5.0, "northing {}", n);
    }

    #[test]
    fn test_project_southern_hemisphere() {
        let (_, n) = project_to_utm(-0.000001, central_meridian(33), 33);
        assert!((n - UTM_FALSE_NORTHING_SOUTH).abs() < 1.0);
    }

    #[test]
    fn test_project_is_deterministic() {
        let a = project_to_utm(37.7749, -122.4194, 10);
        let b = project_to_utm(37.7749, -122.4194, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_central_meridian() {
        assert_eq!(central_meridian(0), 0.0);
        assert_eq!(central_meridian(1), -177.0);
        assert_eq!(central_meridian(31), 3.0);
        assert_eq!(central_meridian(60), 177.0);
    }

    #[test]
    fn test_letter_designator() {
        assert_eq!(utm_letter_designator(48.8), 'U');
        assert_eq!(utm_letter_designator(0.0), 'N');
        assert_eq!(utm_letter_designator(-0.1), 'M');
        assert_eq!(utm_letter_designator(78.0), 'X');
        assert_eq!(utm_letter_designator(84.0), 'X');
        assert_eq!(utm_letter_designator(-80.0), 'C');
        assert_eq!(utm_letter_designator(85.0), 'Z');
        assert_eq!(utm_letter_designator(-81.0), 'Z');
    }

    #[test]
    fn test_covariance_rotation_on_central_meridian() {
        let (sx, sy) = rotate_covariance_to_local_frame(1.5, 2.5, 45.0, central_meridian(32), 32);
        assert!((sx - 2.5).abs() < 1e-12);
        assert!((sy - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_rotation_off_meridian() {
        // 3 degrees east of the central meridian at 60N
        let gamma = convergence_angle(60.0, 12.0, 32);
        let expected = ((3.0 * DTOR).tan() * (60.0 * DTOR).sin()).atan();
        assert!((gamma - expected).abs() < 1e-12);

        let (sx, sy) = rotate_covariance_to_local_frame(1.0, 1.0, 60.0, 12.0, 32);
        // Rotation preserves the combined magnitude
        assert!(((sx * sx + sy * sy) - 2.0).abs() < 1e-9);
        assert!((sx - (gamma.cos() - gamma.sin())).abs() < 1e-12);
    }
}
