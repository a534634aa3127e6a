// Shared constants for projection and time conversion

use std::f64::consts::PI;

/// Degrees to radians conversion factor
pub const DTOR: f64 = PI / 180.0;

/// WGS84 semi-major axis (m)
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 first eccentricity, as used by the UTM series
pub const WGS84_E: f64 = 0.0818191908;

/// UTM central scale factor
pub const UTM_K0: f64 = 0.9996;

/// UTM false easting (m)
pub const UTM_FALSE_EASTING: f64 = 500000.0;

/// UTM false northing applied in the southern hemisphere (m)
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Nanoseconds per second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds per device clock tick (the device clock counts microseconds)
pub const NANOS_PER_DEVICE_TICK: u64 = 1_000;
