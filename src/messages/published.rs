// Composed output records
//
// Device-specific records mirror their input log with a header, decoded status
// flags and vectors in the configured axis convention. Standard records
// (imu, odometry, nav_sat_fix, ...) are the generic robotics shapes derived
// from them.

use serde::Serialize;

use crate::frame::Quat;
use crate::status::{
    AirDataStatus, EkfStatus, EventStatus, GpsPosStatus, GpsVelStatus, ImuStatus, MagStatus,
    ShipMotionStatus, StatusAiding, StatusCom, StatusGeneral,
};
use crate::timesync::{Stamp, UtcTime};

/// NavSatFix fix status
pub const NAV_SAT_STATUS_NO_FIX: i8 = -1;
pub const NAV_SAT_STATUS_FIX: i8 = 0;
pub const NAV_SAT_STATUS_SBAS_FIX: i8 = 1;

/// NavSatFix service flags
pub const NAV_SAT_SERVICE_GPS: u16 = 1;
pub const NAV_SAT_SERVICE_GLONASS: u16 = 2;

/// NavSatFix covariance type with known diagonal
pub const COVARIANCE_TYPE_DIAGONAL_KNOWN: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub stamp: Stamp,
    pub frame_id: String,
}

/// Output of composing one device record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Composed {
    pub records: Vec<OutputRecord>,
    pub transforms: Vec<TransformStamped>,
}

/// Every record the composer can emit: {"type": "ekf_nav", ...}
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputRecord {
    EkfEuler(EkfEuler),
    EkfQuat(EkfQuat),
    EkfNav(EkfNav),
    Event(Event),
    GpsHdt(GpsHdt),
    GpsPos(GpsPos),
    GpsRaw(GpsRaw),
    GpsVel(GpsVel),
    ImuData(ImuData),
    ImuShort(ImuShort),
    Mag(Mag),
    MagCalib(MagCalib),
    OdoVel(OdoVel),
    ShipMotion(ShipMotion),
    Status(Status),
    UtcTime(UtcTimeRecord),
    AirData(AirData),
    Imu(Imu),
    Temperature(Temperature),
    MagneticField(MagneticField),
    TwistStamped(TwistStamped),
    PointStamped(PointStamped),
    TimeReference(TimeReference),
    NavSatFix(NavSatFix),
    FluidPressure(FluidPressure),
    Odometry(Odometry),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EkfEuler {
    pub header: Header,
    pub time_stamp: u32,
    pub status: EkfStatus,
    pub angle: [f64; 3],
    pub accuracy: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EkfQuat {
    pub header: Header,
    pub time_stamp: u32,
    pub status: EkfStatus,
    pub quaternion: Quat,
    pub accuracy: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EkfNav {
    pub header: Header,
    pub time_stamp: u32,
    pub status: EkfStatus,
    pub velocity: [f64; 3],
    pub velocity_accuracy: [f64; 3],
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub undulation: f64,
    pub position_accuracy: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub header: Header,
    pub time_stamp: u32,
    #[serde(flatten)]
    pub status: EventStatus,
    pub time_offset_0: u16,
    pub time_offset_1: u16,
    pub time_offset_2: u16,
    pub time_offset_3: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsHdt {
    pub header: Header,
    pub time_stamp: u32,
    pub status: u16,
    pub tow: u32,
    pub true_heading: f64,
    pub true_heading_acc: f64,
    pub pitch: f64,
    pub pitch_acc: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsPos {
    pub header: Header,
    pub time_stamp: u32,
    pub status: GpsPosStatus,
    pub gps_tow: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub undulation: f64,
    pub position_accuracy: [f64; 3],
    pub num_sv_used: u8,
    pub base_station_id: u16,
    pub diff_age: u16,
}

/// Raw receiver bytes; carries no header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsRaw {
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsVel {
    pub header: Header,
    pub time_stamp: u32,
    pub status: GpsVelStatus,
    pub gps_tow: u32,
    pub velocity: [f64; 3],
    pub velocity_accuracy: [f64; 3],
    pub course: f64,
    pub course_acc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImuData {
    pub header: Header,
    pub time_stamp: u32,
    pub imu_status: ImuStatus,
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
    pub temp: f64,
    pub delta_vel: [f64; 3],
    pub delta_angle: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImuShort {
    pub header: Header,
    pub time_stamp: u32,
    pub imu_status: ImuStatus,
    pub delta_velocity: [f64; 3],
    pub delta_angle: [f64; 3],
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mag {
    pub header: Header,
    pub time_stamp: u32,
    pub status: MagStatus,
    pub mag: [f64; 3],
    pub accel: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagCalib {
    pub header: Header,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdoVel {
    pub header: Header,
    pub time_stamp: u32,
    pub status: u16,
    pub vel: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipMotion {
    pub header: Header,
    pub time_stamp: u32,
    pub status: ShipMotionStatus,
    pub ship_motion: [f64; 3],
    pub acceleration: [f64; 3],
    pub velocity: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub header: Header,
    pub time_stamp: u32,
    pub status_general: StatusGeneral,
    pub status_com: StatusCom,
    pub status_aiding: StatusAiding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtcTimeRecord {
    pub header: Header,
    #[serde(flatten)]
    pub utc: UtcTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirData {
    pub header: Header,
    pub time_stamp: u32,
    pub status: AirDataStatus,
    pub pressure_abs: f64,
    pub altitude: f64,
    pub pressure_diff: f64,
    pub true_air_speed: f64,
    pub air_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imu {
    pub header: Header,
    pub orientation: Quat,
    pub orientation_covariance: [[f64; 3]; 3],
    pub angular_velocity: [f64; 3],
    pub angular_velocity_covariance: [[f64; 3]; 3],
    pub linear_acceleration: [f64; 3],
    pub linear_acceleration_covariance: [[f64; 3]; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub header: Header,
    pub temperature: f64,
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagneticField {
    pub header: Header,
    pub magnetic_field: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Twist {
    pub linear: [f64; 3],
    pub angular: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwistStamped {
    pub header: Header,
    pub twist: Twist,
}

/// WGS84 ECEF point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointStamped {
    pub header: Header,
    pub point: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeReference {
    pub header: Header,
    pub time_ref: Stamp,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavSatFix {
    pub header: Header,
    pub status: i8,
    pub service: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub position_covariance: [[f64; 3]; 3],
    pub position_covariance_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluidPressure {
    pub header: Header,
    pub fluid_pressure: f64,
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pose {
    pub position: [f64; 3],
    pub orientation: Quat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: [[f64; 6]; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwistWithCovariance {
    pub twist: Twist,
    pub covariance: [[f64; 6]; 6],
}

/// Local planar pose and velocity of the base frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Odometry {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: PoseWithCovariance,
    pub twist: TwistWithCovariance,
}

/// Frame relationship for the delivery layer to broadcast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub translation: [f64; 3],
    pub rotation: Quat,
    /// Latched once (init -> odom) rather than streamed
    pub is_static: bool,
}

/// Build a covariance matrix from its diagonal
pub fn diagonal<const N: usize>(diag: [f64; N]) -> [[f64; N]; N] {
    let mut m = [[0.0; N]; N];
    for (i, d) in diag.iter().enumerate() {
        m[i][i] = *d;
    }
    m
}
