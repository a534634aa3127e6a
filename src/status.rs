// Device status word decoding
//
// Each device log carries one or more packed status words. These are
// projected onto plain boolean structs, one field per bit of interest.

use serde::{Deserialize, Serialize};

#[inline]
fn bit(word: u32, mask: u32) -> bool {
    word & mask != 0
}

// --- EKF solution status ---

const SOL_MODE_MASK: u32 = 0x0000_000F;
const SOL_ATTITUDE_VALID: u32 = 1 << 4;
const SOL_HEADING_VALID: u32 = 1 << 5;
const SOL_VELOCITY_VALID: u32 = 1 << 6;
const SOL_POSITION_VALID: u32 = 1 << 7;
const SOL_VERT_REF_USED: u32 = 1 << 8;
const SOL_MAG_REF_USED: u32 = 1 << 9;
const SOL_GPS1_VEL_USED: u32 = 1 << 10;
const SOL_GPS1_POS_USED: u32 = 1 << 11;
const SOL_GPS1_COURSE_USED: u32 = 1 << 12;
const SOL_GPS1_HDT_USED: u32 = 1 << 13;
const SOL_GPS2_VEL_USED: u32 = 1 << 14;
const SOL_GPS2_POS_USED: u32 = 1 << 15;
const SOL_GPS2_COURSE_USED: u32 = 1 << 16;
const SOL_GPS2_HDT_USED: u32 = 1 << 17;
const SOL_ODO_USED: u32 = 1 << 18;

/// Fused navigation solution status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EkfStatus {
    /// 0 uninitialized, 1 vertical gyro, 2 AHRS, 3 nav velocity, 4 nav position
    pub solution_mode: u8,
    pub attitude_valid: bool,
    pub heading_valid: bool,
    pub velocity_valid: bool,
    pub position_valid: bool,
    pub vert_ref_used: bool,
    pub mag_ref_used: bool,
    pub gps1_vel_used: bool,
    pub gps1_pos_used: bool,
    pub gps1_course_used: bool,
    pub gps1_hdt_used: bool,
    pub gps2_vel_used: bool,
    pub gps2_pos_used: bool,
    pub gps2_course_used: bool,
    pub gps2_hdt_used: bool,
    pub odo_used: bool,
}

impl EkfStatus {
    pub fn from_bits(status: u32) -> Self {
        EkfStatus {
            solution_mode: (status & SOL_MODE_MASK) as u8,
            attitude_valid: bit(status, SOL_ATTITUDE_VALID),
            heading_valid: bit(status, SOL_HEADING_VALID),
            velocity_valid: bit(status, SOL_VELOCITY_VALID),
            position_valid: bit(status, SOL_POSITION_VALID),
            vert_ref_used: bit(status, SOL_VERT_REF_USED),
            mag_ref_used: bit(status, SOL_MAG_REF_USED),
            gps1_vel_used: bit(status, SOL_GPS1_VEL_USED),
            gps1_pos_used: bit(status, SOL_GPS1_POS_USED),
            gps1_course_used: bit(status, SOL_GPS1_COURSE_USED),
            gps1_hdt_used: bit(status, SOL_GPS1_HDT_USED),
            gps2_vel_used: bit(status, SOL_GPS2_VEL_USED),
            gps2_pos_used: bit(status, SOL_GPS2_POS_USED),
            gps2_course_used: bit(status, SOL_GPS2_COURSE_USED),
            gps2_hdt_used: bit(status, SOL_GPS2_HDT_USED),
            odo_used: bit(status, SOL_ODO_USED),
        }
    }
}

// --- GNSS position / velocity ---

const GNSS_STATUS_MASK: u32 = 0x3F;
const GNSS_TYPE_SHIFT: u32 = 6;
const GNSS_TYPE_MASK: u32 = 0x3F;

const GPS_POS_GPS_L1_USED: u32 = 1 << 12;
const GPS_POS_GPS_L2_USED: u32 = 1 << 13;
const GPS_POS_GPS_L5_USED: u32 = 1 << 14;
const GPS_POS_GLO_L1_USED: u32 = 1 << 15;
const GPS_POS_GLO_L2_USED: u32 = 1 << 16;

/// GNSS position solution types
pub const GPS_POS_TYPE_NO_SOLUTION: u8 = 0;
pub const GPS_POS_TYPE_SBAS: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpsPosStatus {
    pub status: u8,
    /// Solution type (no solution, single, differential, SBAS, RTK, ...)
    pub r#type: u8,
    pub gps_l1_used: bool,
    pub gps_l2_used: bool,
    pub gps_l5_used: bool,
    pub glo_l1_used: bool,
    pub glo_l2_used: bool,
}

impl GpsPosStatus {
    pub fn from_bits(status: u32) -> Self {
        GpsPosStatus {
            status: (status & GNSS_STATUS_MASK) as u8,
            r#type: ((status >> GNSS_TYPE_SHIFT) & GNSS_TYPE_MASK) as u8,
            gps_l1_used: bit(status, GPS_POS_GPS_L1_USED),
            gps_l2_used: bit(status, GPS_POS_GPS_L2_USED),
            gps_l5_used: bit(status, GPS_POS_GPS_L5_USED),
            glo_l1_used: bit(status, GPS_POS_GLO_L1_USED),
            glo_l2_used: bit(status, GPS_POS_GLO_L2_USED),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpsVelStatus {
    pub vel_status: u8,
    pub vel_type: u8,
}

impl GpsVelStatus {
    pub fn from_bits(status: u32) -> Self {
        GpsVelStatus {
            vel_status: (status & GNSS_STATUS_MASK) as u8,
            vel_type: ((status >> GNSS_TYPE_SHIFT) & GNSS_TYPE_MASK) as u8,
        }
    }
}

// --- IMU ---

const IMU_COM_OK: u32 = 1 << 0;
const IMU_STATUS_BIT: u32 = 1 << 1;
const IMU_ACCEL_X_BIT: u32 = 1 << 2;
const IMU_ACCEL_Y_BIT: u32 = 1 << 3;
const IMU_ACCEL_Z_BIT: u32 = 1 << 4;
const IMU_GYRO_X_BIT: u32 = 1 << 5;
const IMU_GYRO_Y_BIT: u32 = 1 << 6;
const IMU_GYRO_Z_BIT: u32 = 1 << 7;
const IMU_ACCELS_IN_RANGE: u32 = 1 << 8;
const IMU_GYROS_IN_RANGE: u32 = 1 << 9;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImuStatus {
    pub imu_com: bool,
    pub imu_status: bool,
    pub imu_accel_x: bool,
    pub imu_accel_y: bool,
    pub imu_accel_z: bool,
    pub imu_gyro_x: bool,
    pub imu_gyro_y: bool,
    pub imu_gyro_z: bool,
    pub imu_accels_in_range: bool,
    pub imu_gyros_in_range: bool,
}

impl ImuStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        ImuStatus {
            imu_com: bit(status, IMU_COM_OK),
            imu_status: bit(status, IMU_STATUS_BIT),
            imu_accel_x: bit(status, IMU_ACCEL_X_BIT),
            imu_accel_y: bit(status, IMU_ACCEL_Y_BIT),
            imu_accel_z: bit(status, IMU_ACCEL_Z_BIT),
            imu_gyro_x: bit(status, IMU_GYRO_X_BIT),
            imu_gyro_y: bit(status, IMU_GYRO_Y_BIT),
            imu_gyro_z: bit(status, IMU_GYRO_Z_BIT),
            imu_accels_in_range: bit(status, IMU_ACCELS_IN_RANGE),
            imu_gyros_in_range: bit(status, IMU_GYROS_IN_RANGE),
        }
    }
}

// --- Magnetometer ---

const MAG_MAG_X_BIT: u32 = 1 << 0;
const MAG_MAG_Y_BIT: u32 = 1 << 1;
const MAG_MAG_Z_BIT: u32 = 1 << 2;
const MAG_ACCEL_X_BIT: u32 = 1 << 3;
const MAG_ACCEL_Y_BIT: u32 = 1 << 4;
const MAG_ACCEL_Z_BIT: u32 = 1 << 5;
const MAG_MAGS_IN_RANGE: u32 = 1 << 6;
const MAG_ACCELS_IN_RANGE: u32 = 1 << 7;
const MAG_CALIBRATION_OK: u32 = 1 << 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagStatus {
    pub mag_x: bool,
    pub mag_y: bool,
    pub mag_z: bool,
    pub accel_x: bool,
    pub accel_y: bool,
    pub accel_z: bool,
    pub mags_in_range: bool,
    pub accels_in_range: bool,
    pub calibration: bool,
}

impl MagStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        MagStatus {
            mag_x: bit(status, MAG_MAG_X_BIT),
            mag_y: bit(status, MAG_MAG_Y_BIT),
            mag_z: bit(status, MAG_MAG_Z_BIT),
            accel_x: bit(status, MAG_ACCEL_X_BIT),
            accel_y: bit(status, MAG_ACCEL_Y_BIT),
            accel_z: bit(status, MAG_ACCEL_Z_BIT),
            mags_in_range: bit(status, MAG_MAGS_IN_RANGE),
            accels_in_range: bit(status, MAG_ACCELS_IN_RANGE),
            calibration: bit(status, MAG_CALIBRATION_OK),
        }
    }
}

// --- Ship motion ---

const HEAVE_VALID: u32 = 1 << 0;
const HEAVE_VEL_AIDED: u32 = 1 << 1;
const HEAVE_PERIOD_INCLUDED: u32 = 1 << 3;
const HEAVE_PERIOD_VALID: u32 = 1 << 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipMotionStatus {
    pub heave_valid: bool,
    pub heave_vel_aided: bool,
    pub period_available: bool,
    pub period_valid: bool,
}

impl ShipMotionStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        ShipMotionStatus {
            heave_valid: bit(status, HEAVE_VALID),
            heave_vel_aided: bit(status, HEAVE_VEL_AIDED),
            period_available: bit(status, HEAVE_PERIOD_INCLUDED),
            period_valid: bit(status, HEAVE_PERIOD_VALID),
        }
    }
}

// --- Device status: general / com / aiding ---

const GENERAL_MAIN_POWER_OK: u32 = 1 << 0;
const GENERAL_IMU_POWER_OK: u32 = 1 << 1;
const GENERAL_GPS_POWER_OK: u32 = 1 << 2;
const GENERAL_SETTINGS_OK: u32 = 1 << 3;
const GENERAL_TEMPERATURE_OK: u32 = 1 << 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGeneral {
    pub main_power: bool,
    pub imu_power: bool,
    pub gps_power: bool,
    pub settings: bool,
    pub temperature: bool,
}

impl StatusGeneral {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        StatusGeneral {
            main_power: bit(status, GENERAL_MAIN_POWER_OK),
            imu_power: bit(status, GENERAL_IMU_POWER_OK),
            gps_power: bit(status, GENERAL_GPS_POWER_OK),
            settings: bit(status, GENERAL_SETTINGS_OK),
            temperature: bit(status, GENERAL_TEMPERATURE_OK),
        }
    }
}

const PORTA_VALID: u32 = 1 << 0;
const PORTB_VALID: u32 = 1 << 1;
const PORTC_VALID: u32 = 1 << 2;
const PORTD_VALID: u32 = 1 << 3;
const PORTE_VALID: u32 = 1 << 4;
const PORTA_RX_OK: u32 = 1 << 5;
const PORTA_TX_OK: u32 = 1 << 6;
const PORTB_RX_OK: u32 = 1 << 7;
const PORTB_TX_OK: u32 = 1 << 8;
const PORTC_RX_OK: u32 = 1 << 9;
const PORTC_TX_OK: u32 = 1 << 10;
const PORTD_RX_OK: u32 = 1 << 11;
const PORTD_TX_OK: u32 = 1 << 12;
const PORTE_RX_OK: u32 = 1 << 13;
const PORTE_TX_OK: u32 = 1 << 14;
const CAN_VALID: u32 = 1 << 25;
const CAN_RX_OK: u32 = 1 << 26;
const CAN_TX_OK: u32 = 1 << 27;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCom {
    pub port_a: bool,
    pub port_b: bool,
    pub port_c: bool,
    pub port_d: bool,
    pub port_e: bool,
    pub port_a_rx: bool,
    pub port_a_tx: bool,
    pub port_b_rx: bool,
    pub port_b_tx: bool,
    pub port_c_rx: bool,
    pub port_c_tx: bool,
    pub port_d_rx: bool,
    pub port_d_tx: bool,
    pub port_e_rx: bool,
    pub port_e_tx: bool,
    pub can_rx: bool,
    pub can_tx: bool,
    pub can_status: bool,
}

impl StatusCom {
    pub fn from_bits(status: u32) -> Self {
        StatusCom {
            port_a: bit(status, PORTA_VALID),
            port_b: bit(status, PORTB_VALID),
            port_c: bit(status, PORTC_VALID),
            port_d: bit(status, PORTD_VALID),
            port_e: bit(status, PORTE_VALID),
            port_a_rx: bit(status, PORTA_RX_OK),
            port_a_tx: bit(status, PORTA_TX_OK),
            port_b_rx: bit(status, PORTB_RX_OK),
            port_b_tx: bit(status, PORTB_TX_OK),
            port_c_rx: bit(status, PORTC_RX_OK),
            port_c_tx: bit(status, PORTC_TX_OK),
            port_d_rx: bit(status, PORTD_RX_OK),
            port_d_tx: bit(status, PORTD_TX_OK),
            port_e_rx: bit(status, PORTE_RX_OK),
            port_e_tx: bit(status, PORTE_TX_OK),
            can_rx: bit(status, CAN_RX_OK),
            can_tx: bit(status, CAN_TX_OK),
            can_status: bit(status, CAN_VALID),
        }
    }
}

const AIDING_GPS1_POS_RECV: u32 = 1 << 0;
const AIDING_GPS1_VEL_RECV: u32 = 1 << 1;
const AIDING_GPS1_HDT_RECV: u32 = 1 << 2;
const AIDING_GPS1_UTC_RECV: u32 = 1 << 3;
const AIDING_MAG_RECV: u32 = 1 << 8;
const AIDING_ODO_RECV: u32 = 1 << 9;
const AIDING_DVL_RECV: u32 = 1 << 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAiding {
    pub gps1_pos_recv: bool,
    pub gps1_vel_recv: bool,
    pub gps1_hdt_recv: bool,
    pub gps1_utc_recv: bool,
    pub mag_recv: bool,
    pub odo_recv: bool,
    pub dvl_recv: bool,
}

impl StatusAiding {
    pub fn from_bits(status: u32) -> Self {
        StatusAiding {
            gps1_pos_recv: bit(status, AIDING_GPS1_POS_RECV),
            gps1_vel_recv: bit(status, AIDING_GPS1_VEL_RECV),
            gps1_hdt_recv: bit(status, AIDING_GPS1_HDT_RECV),
            gps1_utc_recv: bit(status, AIDING_GPS1_UTC_RECV),
            mag_recv: bit(status, AIDING_MAG_RECV),
            odo_recv: bit(status, AIDING_ODO_RECV),
            dvl_recv: bit(status, AIDING_DVL_RECV),
        }
    }
}

// --- UTC clock ---

const CLOCK_STABLE_INPUT: u32 = 1 << 0;
const CLOCK_STATUS_SHIFT: u32 = 1;
const CLOCK_STATUS_MASK: u32 = 0x0F;
const CLOCK_UTC_SYNC: u32 = 1 << 5;
const CLOCK_UTC_STATUS_SHIFT: u32 = 6;
const CLOCK_UTC_STATUS_MASK: u32 = 0x0F;

/// Internal clock state reported in UTC logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockStatus {
    #[default]
    Error,
    FreeRunning,
    Steering,
    Valid,
    /// Reserved / unknown code
    Other(u8),
}

impl ClockStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ClockStatus::Error,
            1 => ClockStatus::FreeRunning,
            2 => ClockStatus::Steering,
            3 => ClockStatus::Valid,
            other => ClockStatus::Other(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimeStatus {
    pub clock_stable: bool,
    pub clock_utc_sync: bool,
    pub clock_status: ClockStatus,
    pub clock_utc_status: u8,
}

impl UtcTimeStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        UtcTimeStatus {
            clock_stable: bit(status, CLOCK_STABLE_INPUT),
            clock_utc_sync: bit(status, CLOCK_UTC_SYNC),
            clock_status: ClockStatus::from_code(((status >> CLOCK_STATUS_SHIFT) & CLOCK_STATUS_MASK) as u8),
            clock_utc_status: ((status >> CLOCK_UTC_STATUS_SHIFT) & CLOCK_UTC_STATUS_MASK) as u8,
        }
    }
}

// --- Air data ---

const AIR_DATA_TIME_IS_DELAY: u32 = 1 << 0;
const AIR_DATA_PRESSURE_ABS_VALID: u32 = 1 << 1;
const AIR_DATA_AIRSPEED_VALID: u32 = 1 << 2;
const AIR_DATA_PRESSURE_DIFF_VALID: u32 = 1 << 3;
const AIR_DATA_ALTITUDE_VALID: u32 = 1 << 4;
const AIR_DATA_TEMPERATURE_VALID: u32 = 1 << 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirDataStatus {
    pub is_delay_time: bool,
    pub pressure_valid: bool,
    pub altitude_valid: bool,
    pub pressure_diff_valid: bool,
    pub air_speed_valid: bool,
    pub air_temperature_valid: bool,
}

impl AirDataStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        AirDataStatus {
            is_delay_time: bit(status, AIR_DATA_TIME_IS_DELAY),
            pressure_valid: bit(status, AIR_DATA_PRESSURE_ABS_VALID),
            altitude_valid: bit(status, AIR_DATA_ALTITUDE_VALID),
            pressure_diff_valid: bit(status, AIR_DATA_PRESSURE_DIFF_VALID),
            air_speed_valid: bit(status, AIR_DATA_AIRSPEED_VALID),
            air_temperature_valid: bit(status, AIR_DATA_TEMPERATURE_VALID),
        }
    }
}

// --- Event marker ---

const EVENT_OVERFLOW: u32 = 1 << 0;
const EVENT_OFFSET_0_VALID: u32 = 1 << 1;
const EVENT_OFFSET_1_VALID: u32 = 1 << 2;
const EVENT_OFFSET_2_VALID: u32 = 1 << 3;
const EVENT_OFFSET_3_VALID: u32 = 1 << 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatus {
    pub overflow: bool,
    pub offset_0_valid: bool,
    pub offset_1_valid: bool,
    pub offset_2_valid: bool,
    pub offset_3_valid: bool,
}

impl EventStatus {
    pub fn from_bits(status: u16) -> Self {
        let status = status as u32;
        EventStatus {
            overflow: bit(status, EVENT_OVERFLOW),
            offset_0_valid: bit(status, EVENT_OFFSET_0_VALID),
            offset_1_valid: bit(status, EVENT_OFFSET_1_VALID),
            offset_2_valid: bit(status, EVENT_OFFSET_2_VALID),
            offset_3_valid: bit(status, EVENT_OFFSET_3_VALID),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ekf_status() {
        let s = EkfStatus::from_bits(4 | SOL_ATTITUDE_VALID | SOL_POSITION_VALID | SOL_GPS1_COURSE_USED | SOL_GPS2_COURSE_USED);
        assert_eq!(s.solution_mode, 4);
        assert!(s.attitude_valid);
        assert!(!s.heading_valid);
        assert!(s.position_valid);
        assert!(s.gps1_course_used);
        assert!(!s.gps1_hdt_used);
        assert!(s.gps2_course_used);
        assert!(!s.gps2_pos_used);
    }

    #[test]
    fn test_gps_pos_status() {
        let word = ((GPS_POS_TYPE_SBAS as u32) << GNSS_TYPE_SHIFT) | GPS_POS_GLO_L2_USED;
        let s = GpsPosStatus::from_bits(word);
        assert_eq!(s.status, 0);
        assert_eq!(s.r#type, GPS_POS_TYPE_SBAS);
        assert!(s.glo_l2_used);
        assert!(!s.gps_l1_used);
    }

    #[test]
    fn test_utc_status_valid_clock() {
        let word = (CLOCK_STABLE_INPUT | (3 << CLOCK_STATUS_SHIFT) | CLOCK_UTC_SYNC | (2 << CLOCK_UTC_STATUS_SHIFT)) as u16;
        let s = UtcTimeStatus::from_bits(word);
        assert!(s.clock_stable);
        assert!(s.clock_utc_sync);
        assert_eq!(s.clock_status, ClockStatus::Valid);
        assert_eq!(s.clock_utc_status, 2);
    }

    #[test]
    fn test_clock_status_codes() {
        assert_eq!(ClockStatus::from_code(0), ClockStatus::Error);
        assert_eq!(ClockStatus::from_code(2), ClockStatus::Steering);
        assert_eq!(ClockStatus::from_code(9), ClockStatus::Other(9));
    }

    #[test]
    fn test_status_com_can_bits() {
        let s = StatusCom::from_bits(PORTA_VALID | CAN_VALID | CAN_TX_OK);
        assert!(s.port_a);
        assert!(!s.port_b);
        assert!(s.can_status);
        assert!(s.can_tx);
        assert!(!s.can_rx);
    }

    #[test]
    fn test_empty_words_decode_to_false() {
        assert_eq!(ImuStatus::from_bits(0), ImuStatus::default());
        assert_eq!(MagStatus::from_bits(0), MagStatus::default());
        assert_eq!(AirDataStatus::from_bits(0), AirDataStatus::default());
        assert_eq!(EventStatus::from_bits(0), EventStatus::default());
    }
}
