// Axis convention handling (NED <-> ENU)
//
// Device data is natively North-East-Down. Under the ENU convention:
// - body-referenced vectors (accelerometer, gyro, delta angle/velocity,
//   magnetometer) become (x, -y, -z)
// - nav-frame vectors (velocity) become (y, x, -z)
// - nav-frame accuracies are only permuted, (y, x, z)
// - headings become wrap(90 - h), pitch is negated
//
// Every transform here is its own inverse.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

/// Axis convention of every vector and angle in the output records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AxisConvention {
    #[default]
    Ned,
    Enu,
}

/// Quaternion in output (x, y, z, w) layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl AxisConvention {
    /// Body-referenced 3-axis vector
    pub fn body_vector(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            AxisConvention::Ned => v,
            AxisConvention::Enu => [v[0], -v[1], -v[2]],
        }
    }

    /// Nav-frame 3-axis vector (velocity)
    pub fn nav_vector(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            AxisConvention::Ned => v,
            AxisConvention::Enu => [v[1], v[0], -v[2]],
        }
    }

    /// Nav-frame standard deviations: permuted, never negated
    pub fn nav_accuracy(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            AxisConvention::Ned => v,
            AxisConvention::Enu => [v[1], v[0], v[2]],
        }
    }

    /// Euler angles (roll, pitch, yaw) in radians
    pub fn euler(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            AxisConvention::Ned => v,
            AxisConvention::Enu => [v[0], -v[1], wrap_angle_2pi(FRAC_PI_2 - v[2])],
        }
    }

    /// Heading or course in degrees
    pub fn heading_deg(self, heading: f64) -> f64 {
        match self {
            AxisConvention::Ned => heading,
            AxisConvention::Enu => wrap_angle_360(90.0 - heading),
        }
    }

    pub fn pitch(self, pitch: f64) -> f64 {
        match self {
            AxisConvention::Ned => pitch,
            AxisConvention::Enu => -pitch,
        }
    }

    /// Device quaternion given as (w, x, y, z)
    pub fn quaternion(self, q: [f64; 4]) -> Quat {
        match self {
            AxisConvention::Ned => Quat { x: q[1], y: q[2], z: q[3], w: q[0] },
            AxisConvention::Enu => Quat { x: q[1], y: -q[2], z: -q[3], w: q[0] },
        }
    }
}

/// Wrap an angle in radians into [0, 2π)
pub fn wrap_angle_2pi(angle: f64) -> f64 {
    let mut angle = angle % TAU;
    if angle < 0.0 {
        angle += TAU;
    }
    if angle >= TAU {
        angle -= TAU;
    }
    angle
}

/// Wrap an angle in degrees into [0, 360)
pub fn wrap_angle_360(angle: f64) -> f64 {
    let mut angle = angle % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle >= 360.0 {
        angle -= 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_ned_is_passthrough() {
        let v = [1.0, 2.0, 3.0];
        let c = AxisConvention::Ned;
        assert_eq!(c.body_vector(v), v);
        assert_eq!(c.nav_vector(v), v);
        assert_eq!(c.nav_accuracy(v), v);
        assert_eq!(c.heading_deg(123.0), 123.0);
        assert_eq!(c.pitch(-4.0), -4.0);
    }

    #[test]
    fn test_enu_vectors() {
        let c = AxisConvention::Enu;
        assert_eq!(c.body_vector([1.0, 2.0, 3.0]), [1.0, -2.0, -3.0]);
        assert_eq!(c.nav_vector([1.0, 2.0, 3.0]), [2.0, 1.0, -3.0]);
        assert_eq!(c.nav_accuracy([1.0, 2.0, 3.0]), [2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_enu_transforms_are_involutions() {
        let c = AxisConvention::Enu;
        let v = [0.25, -7.5, 9.81];
        assert_eq!(c.body_vector(c.body_vector(v)), v);
        assert_eq!(c.nav_vector(c.nav_vector(v)), v);
        assert_eq!(c.nav_accuracy(c.nav_accuracy(v)), v);
        assert_eq!(c.pitch(c.pitch(0.3)), 0.3);

        for h in [0.0, 12.5, 90.0, 181.0, 359.5] {
            assert!((c.heading_deg(c.heading_deg(h)) - h).abs() < EPSILON, "heading {}", h);
        }
    }

    #[test]
    fn test_enu_heading() {
        let c = AxisConvention::Enu;
        // North in NED is 90 deg in ENU, east is 0
        assert!((c.heading_deg(0.0) - 90.0).abs() < EPSILON);
        assert!(c.heading_deg(90.0).abs() < EPSILON);
        assert!((c.heading_deg(180.0) - 270.0).abs() < EPSILON);
    }

    #[test]
    fn test_enu_euler() {
        let e = AxisConvention::Enu.euler([0.1, 0.2, 0.0]);
        assert_eq!(e[0], 0.1);
        assert_eq!(e[1], -0.2);
        assert!((e[2] - FRAC_PI_2).abs() < EPSILON);

        let e = AxisConvention::Enu.euler([0.0, 0.0, std::f64::consts::PI]);
        assert!((e[2] - 3.0 * FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_enu_quaternion() {
        let q = AxisConvention::Enu.quaternion([0.5, 0.1, 0.2, 0.3]);
        assert_eq!(q, Quat { x: 0.1, y: -0.2, z: -0.3, w: 0.5 });
    }

    #[test]
    fn test_wrap_angles() {
        assert!((wrap_angle_360(-90.0) - 270.0).abs() < EPSILON);
        assert!((wrap_angle_360(725.0) - 5.0).abs() < EPSILON);
        assert_eq!(wrap_angle_360(360.0), 0.0);
        assert!((wrap_angle_2pi(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPSILON);
        assert!((wrap_angle_2pi(5.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert!(wrap_angle_2pi(TAU).abs() < EPSILON);
    }
}
