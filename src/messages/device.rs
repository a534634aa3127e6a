// Decoded device logs
//
// One struct per log type, as produced by the device protocol decoder. Values
// are in the device's native NED convention, angles in radians unless the
// field says degrees. Every struct accepts missing fields as zero so partial
// captures still parse.

use serde::{Deserialize, Serialize};

/// Device log as read from the input stream: {"log": "ekf_nav", ...}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "log", rename_all = "snake_case")]
pub enum DeviceRecord {
    EkfEuler(EkfEulerLog),
    EkfQuat(EkfQuatLog),
    EkfNav(EkfNavLog),
    Event(EventLog),
    GpsHdt(GpsHdtLog),
    GpsPos(GpsPosLog),
    GpsRaw(GpsRawLog),
    GpsVel(GpsVelLog),
    ImuData(ImuDataLog),
    ImuShort(ImuShortLog),
    Mag(MagLog),
    MagCalib(MagCalibLog),
    OdoVel(OdometerLog),
    ShipMotion(ShipMotionLog),
    Status(StatusLog),
    UtcTime(UtcLog),
    AirData(AirDataLog),
}

impl DeviceRecord {
    /// Log name as it appears in the input
    pub fn name(&self) -> &'static str {
        match self {
            DeviceRecord::EkfEuler(_) => "ekf_euler",
            DeviceRecord::EkfQuat(_) => "ekf_quat",
            DeviceRecord::EkfNav(_) => "ekf_nav",
            DeviceRecord::Event(_) => "event",
            DeviceRecord::GpsHdt(_) => "gps_hdt",
            DeviceRecord::GpsPos(_) => "gps_pos",
            DeviceRecord::GpsRaw(_) => "gps_raw",
            DeviceRecord::GpsVel(_) => "gps_vel",
            DeviceRecord::ImuData(_) => "imu_data",
            DeviceRecord::ImuShort(_) => "imu_short",
            DeviceRecord::Mag(_) => "mag",
            DeviceRecord::MagCalib(_) => "mag_calib",
            DeviceRecord::OdoVel(_) => "odo_vel",
            DeviceRecord::ShipMotion(_) => "ship_motion",
            DeviceRecord::Status(_) => "status",
            DeviceRecord::UtcTime(_) => "utc_time",
            DeviceRecord::AirData(_) => "air_data",
        }
    }

    /// Device clock value (µs), absent for raw GNSS buffers
    pub fn time_stamp(&self) -> Option<u32> {
        let ts = match self {
            DeviceRecord::EkfEuler(log) => log.time_stamp,
            DeviceRecord::EkfQuat(log) => log.time_stamp,
            DeviceRecord::EkfNav(log) => log.time_stamp,
            DeviceRecord::Event(log) => log.time_stamp,
            DeviceRecord::GpsHdt(log) => log.time_stamp,
            DeviceRecord::GpsPos(log) => log.time_stamp,
            DeviceRecord::GpsRaw(_) => return None,
            DeviceRecord::GpsVel(log) => log.time_stamp,
            DeviceRecord::ImuData(log) => log.time_stamp,
            DeviceRecord::ImuShort(log) => log.time_stamp,
            DeviceRecord::Mag(log) => log.time_stamp,
            DeviceRecord::MagCalib(log) => log.time_stamp,
            DeviceRecord::OdoVel(log) => log.time_stamp,
            DeviceRecord::ShipMotion(log) => log.time_stamp,
            DeviceRecord::Status(log) => log.time_stamp,
            DeviceRecord::UtcTime(log) => log.time_stamp,
            DeviceRecord::AirData(log) => log.time_stamp,
        };
        Some(ts)
    }
}

/// EKF attitude as Euler angles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EkfEulerLog {
    pub time_stamp: u32,
    /// Roll, pitch, yaw (rad)
    pub euler: [f64; 3],
    pub euler_std_dev: [f64; 3],
    pub status: u32,
}

/// EKF attitude as a quaternion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EkfQuatLog {
    pub time_stamp: u32,
    /// (w, x, y, z)
    pub quaternion: [f64; 4],
    pub euler_std_dev: [f64; 3],
    pub status: u32,
}

/// EKF navigation solution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EkfNavLog {
    pub time_stamp: u32,
    /// North, east, down (m/s)
    pub velocity: [f64; 3],
    pub velocity_std_dev: [f64; 3],
    /// Latitude (deg), longitude (deg), altitude (m)
    pub position: [f64; 3],
    pub undulation: f64,
    /// Latitude, longitude, altitude standard deviations (m)
    pub position_std_dev: [f64; 3],
    pub status: u32,
}

/// Synchronization input event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLog {
    pub time_stamp: u32,
    pub status: u16,
    pub time_offset_0: u16,
    pub time_offset_1: u16,
    pub time_offset_2: u16,
    pub time_offset_3: u16,
}

/// Dual antenna true heading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsHdtLog {
    pub time_stamp: u32,
    pub status: u16,
    pub time_of_week: u32,
    /// Degrees
    pub heading: f64,
    pub heading_accuracy: f64,
    /// Degrees
    pub pitch: f64,
    pub pitch_accuracy: f64,
    pub baseline: f64,
}

/// GNSS position fix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsPosLog {
    pub time_stamp: u32,
    pub status: u32,
    pub time_of_week: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub undulation: f64,
    pub latitude_accuracy: f64,
    pub longitude_accuracy: f64,
    pub altitude_accuracy: f64,
    pub num_sv_used: u8,
    pub base_station_id: u16,
    pub differential_age: u16,
}

/// Raw GNSS receiver bytes, hex encoded in JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsRawLog {
    #[serde(with = "hex::serde")]
    pub raw_buffer: Vec<u8>,
}

/// GNSS velocity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsVelLog {
    pub time_stamp: u32,
    pub status: u32,
    pub time_of_week: u32,
    /// North, east, down (m/s)
    pub velocity: [f64; 3],
    pub velocity_acc: [f64; 3],
    /// Degrees
    pub course: f64,
    pub course_acc: f64,
}

/// Calibrated IMU sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuDataLog {
    pub time_stamp: u32,
    pub status: u16,
    pub accelerometers: [f64; 3],
    pub gyroscopes: [f64; 3],
    pub temperature: f64,
    pub delta_velocity: [f64; 3],
    pub delta_angle: [f64; 3],
}

/// Short IMU sample (increments only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuShortLog {
    pub time_stamp: u32,
    pub status: u16,
    pub delta_velocity: [f64; 3],
    pub delta_angle: [f64; 3],
    pub temperature: f64,
}

/// Magnetometer sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagLog {
    pub time_stamp: u32,
    pub status: u16,
    pub magnetometers: [f64; 3],
    pub accelerometers: [f64; 3],
}

/// Magnetometer calibration data. Only the timestamp is carried through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagCalibLog {
    pub time_stamp: u32,
}

/// Odometer velocity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdometerLog {
    pub time_stamp: u32,
    pub status: u16,
    pub velocity: f64,
}

/// Heave / surge / sway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipMotionLog {
    pub time_stamp: u32,
    pub status: u16,
    pub heave_period: f64,
    pub ship_motion: [f64; 3],
    pub ship_accel: [f64; 3],
    pub ship_vel: [f64; 3],
}

/// Device status words
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLog {
    pub time_stamp: u32,
    pub general_status: u16,
    pub com_status: u32,
    pub aiding_status: u32,
}

/// Device UTC time and clock status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtcLog {
    pub time_stamp: u32,
    pub status: u16,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nano_second: u32,
    pub gps_time_of_week: u32,
}

/// Barometric air data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirDataLog {
    pub time_stamp: u32,
    pub status: u16,
    pub pressure_abs: f64,
    pub altitude: f64,
    pub pressure_diff: f64,
    pub true_airspeed: f64,
    pub air_temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_record() {
        let json = r#"{"log": "ekf_nav", "time_stamp": 1000, "position": [48.85, 2.29, 35.0], "status": 4}"#;
        let record: DeviceRecord = serde_json::from_str(json).unwrap();

        match &record {
            DeviceRecord::EkfNav(nav) => {
                assert_eq!(nav.time_stamp, 1000);
                assert_eq!(nav.position, [48.85, 2.29, 35.0]);
                assert_eq!(nav.velocity, [0.0; 3]);
                assert_eq!(nav.status, 4);
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(record.name(), "ekf_nav");
        assert_eq!(record.time_stamp(), Some(1000));
    }

    #[test]
    fn test_raw_buffer_is_hex() {
        let json = r#"{"log": "gps_raw", "raw_buffer": "b562010a"}"#;
        let record: DeviceRecord = serde_json::from_str(json).unwrap();

        match &record {
            DeviceRecord::GpsRaw(raw) => assert_eq!(raw.raw_buffer, vec![0xb5, 0x62, 0x01, 0x0a]),
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(record.time_stamp(), None);

        let back = serde_json::to_string(&record).unwrap();
        assert!(back.contains("\"raw_buffer\":\"b562010a\""), "{}", back);
    }

    #[test]
    fn test_unknown_log_is_rejected() {
        let json = r#"{"log": "diag", "time_stamp": 1}"#;
        assert!(serde_json::from_str::<DeviceRecord>(json).is_err());
    }
}
