// Local planar frame anchored on a latched UTM origin

use serde::Serialize;
use tracing::info;

use crate::geodesy::{project_to_utm, rotate_covariance_to_local_frame, select_utm_zone, utm_letter_designator};

/// UTM origin of the local frame. `zone == 0` means not yet latched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LocalOrigin {
    pub easting: f64,
    pub northing: f64,
    pub altitude: f64,
    pub zone: u8,
}

impl LocalOrigin {
    pub fn is_set(&self) -> bool {
        self.zone != 0
    }
}

/// Geodetic projection engine
///
/// Every planar position it reports is relative to the single origin latched
/// by [`Projector::initialize_origin`].
#[derive(Debug, Default)]
pub struct Projector {
    origin: LocalOrigin,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> &LocalOrigin {
        &self.origin
    }

    pub fn is_initialized(&self) -> bool {
        self.origin.is_set()
    }

    /// Latch the local origin at the given position.
    ///
    /// Callers check [`Projector::is_initialized`] first; this routine does
    /// not guard against re-latching.
    pub fn initialize_origin(&mut self, lat: f64, lon: f64, altitude: f64) -> LocalOrigin {
        let zone = select_utm_zone(lat, lon);
        let (easting, northing) = project_to_utm(lat, lon, zone);

        self.origin = LocalOrigin {
            easting,
            northing,
            altitude,
            zone,
        };

        info!(
            "Local origin initialized from lat:{:.7} lon:{:.7} UTM zone {}{}: easting:{:.3}m ({}km) northing:{:.3}m ({}km)",
            lat,
            lon,
            zone,
            utm_letter_designator(lat),
            easting,
            (easting as i64) / 1000,
            northing,
            (northing as i64) / 1000
        );

        self.origin
    }

    /// Position relative to the origin, in the origin's UTM zone
    ///
    /// # Returns
    /// [easting offset, northing offset, altitude offset] in meters
    pub fn local_planar_position(&self, lat: f64, lon: f64, altitude: f64) -> [f64; 3] {
        let (easting, northing) = project_to_utm(lat, lon, self.origin.zone);

        [
            easting - self.origin.easting,
            northing - self.origin.northing,
            altitude - self.origin.altitude,
        ]
    }

    /// Rotate east/north standard deviations onto the origin zone's grid
    pub fn rotate_covariance(&self, std_east: f64, std_north: f64, lat: f64, lon: f64) -> (f64, f64) {
        rotate_covariance_to_local_frame(std_east, std_north, lat, lon, self.origin.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::central_meridian;

    #[test]
    fn test_uninitialized() {
        let p = Projector::new();
        assert!(!p.is_initialized());
        assert_eq!(p.origin().zone, 0);
    }

    #[test]
    fn test_latching_point_is_zero() {
        let mut p = Projector::new();
        let (lat, lon, alt) = (48.8583, 2.2945, 35.0);

        p.initialize_origin(lat, lon, alt);
        assert!(p.is_initialized());
        assert_eq!(p.origin().zone, 31);

        let pos = p.local_planar_position(lat, lon, alt);
        assert_eq!(pos, [0.0, 0.0, 0.0]);

        // Same point again after the latch
        assert_eq!(p.local_planar_position(lat, lon, alt), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_local_axes() {
        let mut p = Projector::new();
        p.initialize_origin(45.0, 9.0, 100.0);

        // ~111 m north
        let north = p.local_planar_position(45.001, 9.0, 100.0);
        assert!(north[0].abs() < 1.0, "x {}", north[0]);
        assert!((north[1] - 111.1).abs() < 1.0, "y {}", north[1]);

        // ~79 m east
        let east = p.local_planar_position(45.0, 9.001, 90.0);
        assert!((east[0] - 78.8).abs() < 1.0, "x {}", east[0]);
        assert!(east[1].abs() < 1.0, "y {}", east[1]);
        assert!((east[2] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_origin_zone_is_kept_across_zone_edge() {
        let mut p = Projector::new();
        p.initialize_origin(45.0, 5.9999, 0.0);
        assert_eq!(p.origin().zone, 31);

        // The next point is in zone 32 but still projected on zone 31
        let pos = p.local_planar_position(45.0, 6.0009, 0.0);
        assert!((pos[0] - 78.8).abs() < 1.0, "x {}", pos[0]);
    }

    #[test]
    fn test_rotate_covariance_uses_origin_zone() {
        let mut p = Projector::new();
        p.initialize_origin(10.0, central_meridian(20), 0.0);
        let (sx, sy) = p.rotate_covariance(0.5, 0.8, 10.0, central_meridian(20));
        assert!((sx - 0.8).abs() < 1e-12);
        assert!((sy - 0.5).abs() < 1e-12);
    }
}
