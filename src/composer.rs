// Record composer - turns decoded device logs into output records
//
// Owns the time engine and the projector, plus the latest records that
// derived outputs are built from. Every device log yields its
// device-specific record; standard records and odometry are derived from the
// latest state when enabled. Transforms are returned, never broadcast.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::debug;

use crate::frame::{AxisConvention, Quat};
use crate::geodesy::llh2ecef;
use crate::messages::device::{
    AirDataLog, DeviceRecord, EkfEulerLog, EkfNavLog, EkfQuatLog, EventLog, GpsHdtLog, GpsPosLog,
    GpsVelLog, ImuDataLog, ImuShortLog, MagLog, OdometerLog, ShipMotionLog, StatusLog, UtcLog,
};
use crate::messages::published::{
    diagonal, AirData, Composed, EkfEuler, EkfNav, EkfQuat, Event, FluidPressure, GpsHdt, GpsPos,
    GpsRaw, GpsVel, Header, Imu, ImuData, ImuShort, Mag, MagCalib, MagneticField, NavSatFix,
    OdoVel, Odometry, OutputRecord, PointStamped, Pose, PoseWithCovariance, ShipMotion, Status,
    Temperature, TimeReference, TransformStamped, Twist, TwistStamped, TwistWithCovariance,
    UtcTimeRecord, COVARIANCE_TYPE_DIAGONAL_KNOWN, NAV_SAT_SERVICE_GLONASS, NAV_SAT_SERVICE_GPS,
    NAV_SAT_STATUS_FIX, NAV_SAT_STATUS_NO_FIX, NAV_SAT_STATUS_SBAS_FIX,
};
use crate::projection::Projector;
use crate::status::{
    AirDataStatus, EkfStatus, EventStatus, GpsPosStatus, GpsVelStatus, ImuStatus, MagStatus,
    ShipMotionStatus, StatusAiding, StatusCom, StatusGeneral, UtcTimeStatus,
    GPS_POS_TYPE_NO_SOLUTION, GPS_POS_TYPE_SBAS,
};
use crate::timesync::{TimeReferenceMode, TimeSync, UtcTime, WallClock};

const TIME_REFERENCE_SOURCE: &str = "UTC time from device converted to Epoch";

const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

/// Composer settings, fixed for the lifetime of a [`Composer`]
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Frame of every device record header, child frame of odometry
    pub frame_id: String,
    pub axis_convention: AxisConvention,
    pub time_reference: TimeReferenceMode,
    /// Also emit the generic imu/temperature/twist/... records
    pub standard_outputs: bool,
    pub odom_enable: bool,
    pub odom_publish_tf: bool,
    pub odom_frame_id: String,
    pub odom_base_frame_id: String,
    pub odom_init_frame_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            frame_id: "imu_link".to_string(),
            axis_convention: AxisConvention::Ned,
            time_reference: TimeReferenceMode::SystemClockOnly,
            standard_outputs: false,
            odom_enable: false,
            odom_publish_tf: false,
            odom_frame_id: "odom".to_string(),
            odom_base_frame_id: "base_link".to_string(),
            odom_init_frame_id: "map".to_string(),
        }
    }
}

/// Stateful record composer
pub struct Composer {
    settings: Settings,
    time: TimeSync,
    projector: Projector,
    last_euler: Option<EkfEuler>,
    last_quat: Option<EkfQuat>,
    last_nav: Option<EkfNav>,
}

impl Composer {
    pub fn new(settings: Settings) -> Self {
        let time = TimeSync::new(settings.time_reference);
        Self::from_parts(settings, time)
    }

    /// Composer reading a custom wall clock
    pub fn with_clock(settings: Settings, clock: Box<dyn WallClock>) -> Self {
        let time = TimeSync::with_clock(settings.time_reference, clock);
        Self::from_parts(settings, time)
    }

    fn from_parts(settings: Settings, time: TimeSync) -> Self {
        Composer {
            settings,
            time,
            projector: Projector::new(),
            last_euler: None,
            last_quat: None,
            last_nav: None,
        }
    }

    pub fn time_sync(&self) -> &TimeSync {
        &self.time
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Compose all output records and transforms for one device log
    pub fn process(&mut self, record: &DeviceRecord) -> Composed {
        let mut out = Composed::default();
        let standard = self.settings.standard_outputs;

        match record {
            DeviceRecord::EkfEuler(log) => {
                let msg = self.ekf_euler(log);
                self.last_euler = Some(msg.clone());
                out.records.push(OutputRecord::EkfEuler(msg));
            }
            DeviceRecord::EkfQuat(log) => {
                let msg = self.ekf_quat(log);
                self.last_quat = Some(msg.clone());
                out.records.push(OutputRecord::EkfQuat(msg));
            }
            DeviceRecord::EkfNav(log) => {
                let msg = self.ekf_nav(log);
                let point = standard.then(|| self.point_stamped(&msg));
                self.last_nav = Some(msg.clone());
                out.records.push(OutputRecord::EkfNav(msg));
                if let Some(point) = point {
                    out.records.push(OutputRecord::PointStamped(point));
                }
            }
            DeviceRecord::Event(log) => {
                out.records.push(OutputRecord::Event(self.event(log)));
            }
            DeviceRecord::GpsHdt(log) => {
                out.records.push(OutputRecord::GpsHdt(self.gps_hdt(log)));
            }
            DeviceRecord::GpsPos(log) => {
                let msg = self.gps_pos(log);
                let fix = standard.then(|| self.nav_sat_fix(&msg));
                out.records.push(OutputRecord::GpsPos(msg));
                if let Some(fix) = fix {
                    out.records.push(OutputRecord::NavSatFix(fix));
                }
            }
            DeviceRecord::GpsRaw(log) => {
                out.records.push(OutputRecord::GpsRaw(GpsRaw {
                    data: log.raw_buffer.clone(),
                }));
            }
            DeviceRecord::GpsVel(log) => {
                out.records.push(OutputRecord::GpsVel(self.gps_vel(log)));
            }
            DeviceRecord::ImuData(log) => {
                let msg = self.imu_data(log);
                out.records.push(OutputRecord::ImuData(msg.clone()));

                if standard {
                    if let Some(quat) = self.last_quat.clone() {
                        out.records.push(OutputRecord::Imu(self.imu(&msg, &quat)));
                    }
                    out.records.push(OutputRecord::Temperature(self.temperature(&msg)));
                    if let Some(twist) = self.twist_stamped(&msg) {
                        out.records.push(OutputRecord::TwistStamped(twist));
                    }
                }

                if self.settings.odom_enable {
                    self.odometry(&msg, &mut out);
                }
            }
            DeviceRecord::ImuShort(log) => {
                out.records.push(OutputRecord::ImuShort(self.imu_short(log)));
            }
            DeviceRecord::Mag(log) => {
                let msg = self.mag(log);
                let field = standard.then(|| MagneticField {
                    header: msg.header.clone(),
                    magnetic_field: msg.mag,
                });
                out.records.push(OutputRecord::Mag(msg));
                if let Some(field) = field {
                    out.records.push(OutputRecord::MagneticField(field));
                }
            }
            DeviceRecord::MagCalib(log) => {
                out.records.push(OutputRecord::MagCalib(MagCalib {
                    header: self.header(log.time_stamp),
                }));
            }
            DeviceRecord::OdoVel(log) => {
                out.records.push(OutputRecord::OdoVel(self.odo_vel(log)));
            }
            DeviceRecord::ShipMotion(log) => {
                out.records.push(OutputRecord::ShipMotion(self.ship_motion(log)));
            }
            DeviceRecord::Status(log) => {
                out.records.push(OutputRecord::Status(self.status(log)));
            }
            DeviceRecord::UtcTime(log) => {
                let msg = self.utc_time(log);
                let time_ref = standard.then(|| self.time_reference(&msg.utc));
                out.records.push(OutputRecord::UtcTime(msg));
                if let Some(time_ref) = time_ref {
                    out.records.push(OutputRecord::TimeReference(time_ref));
                }
            }
            DeviceRecord::AirData(log) => {
                let msg = self.air_data(log);
                let pressure = standard.then(|| FluidPressure {
                    header: msg.header.clone(),
                    fluid_pressure: msg.pressure_abs,
                    variance: 0.0,
                });
                out.records.push(OutputRecord::AirData(msg));
                if let Some(pressure) = pressure {
                    out.records.push(OutputRecord::FluidPressure(pressure));
                }
            }
        }

        out
    }

    fn header(&self, device_timestamp: u32) -> Header {
        Header {
            stamp: self.time.wall_clock_timestamp(device_timestamp),
            frame_id: self.settings.frame_id.clone(),
        }
    }

    fn ekf_euler(&self, log: &EkfEulerLog) -> EkfEuler {
        EkfEuler {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: EkfStatus::from_bits(log.status),
            angle: self.settings.axis_convention.euler(log.euler),
            accuracy: log.euler_std_dev,
        }
    }

    fn ekf_quat(&self, log: &EkfQuatLog) -> EkfQuat {
        EkfQuat {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: EkfStatus::from_bits(log.status),
            quaternion: self.settings.axis_convention.quaternion(log.quaternion),
            accuracy: log.euler_std_dev,
        }
    }

    fn ekf_nav(&self, log: &EkfNavLog) -> EkfNav {
        let convention = self.settings.axis_convention;
        EkfNav {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: EkfStatus::from_bits(log.status),
            velocity: convention.nav_vector(log.velocity),
            velocity_accuracy: convention.nav_accuracy(log.velocity_std_dev),
            latitude: log.position[0],
            longitude: log.position[1],
            altitude: log.position[2],
            undulation: log.undulation,
            position_accuracy: convention.nav_accuracy(log.position_std_dev),
        }
    }

    fn event(&self, log: &EventLog) -> Event {
        Event {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: EventStatus::from_bits(log.status),
            time_offset_0: log.time_offset_0,
            time_offset_1: log.time_offset_1,
            time_offset_2: log.time_offset_2,
            time_offset_3: log.time_offset_3,
        }
    }

    fn gps_hdt(&self, log: &GpsHdtLog) -> GpsHdt {
        let convention = self.settings.axis_convention;
        GpsHdt {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: log.status,
            tow: log.time_of_week,
            true_heading: convention.heading_deg(log.heading),
            true_heading_acc: log.heading_accuracy,
            pitch: convention.pitch(log.pitch),
            pitch_acc: log.pitch_accuracy,
            baseline: log.baseline,
        }
    }

    fn gps_pos(&self, log: &GpsPosLog) -> GpsPos {
        GpsPos {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: GpsPosStatus::from_bits(log.status),
            gps_tow: log.time_of_week,
            latitude: log.latitude,
            longitude: log.longitude,
            altitude: log.altitude,
            undulation: log.undulation,
            position_accuracy: self.settings.axis_convention.nav_accuracy([
                log.latitude_accuracy,
                log.longitude_accuracy,
                log.altitude_accuracy,
            ]),
            num_sv_used: log.num_sv_used,
            base_station_id: log.base_station_id,
            diff_age: log.differential_age,
        }
    }

    fn gps_vel(&self, log: &GpsVelLog) -> GpsVel {
        let convention = self.settings.axis_convention;
        GpsVel {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: GpsVelStatus::from_bits(log.status),
            gps_tow: log.time_of_week,
            velocity: convention.nav_vector(log.velocity),
            velocity_accuracy: convention.nav_accuracy(log.velocity_acc),
            course: convention.heading_deg(log.course),
            course_acc: log.course_acc,
        }
    }

    fn imu_data(&self, log: &ImuDataLog) -> ImuData {
        let convention = self.settings.axis_convention;
        ImuData {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            imu_status: ImuStatus::from_bits(log.status),
            accel: convention.body_vector(log.accelerometers),
            gyro: convention.body_vector(log.gyroscopes),
            temp: log.temperature,
            delta_vel: convention.body_vector(log.delta_velocity),
            delta_angle: convention.body_vector(log.delta_angle),
        }
    }

    fn imu_short(&self, log: &ImuShortLog) -> ImuShort {
        let convention = self.settings.axis_convention;
        ImuShort {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            imu_status: ImuStatus::from_bits(log.status),
            delta_velocity: convention.body_vector(log.delta_velocity),
            delta_angle: convention.body_vector(log.delta_angle),
            temperature: log.temperature,
        }
    }

    fn mag(&self, log: &MagLog) -> Mag {
        let convention = self.settings.axis_convention;
        Mag {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: MagStatus::from_bits(log.status),
            mag: convention.body_vector(log.magnetometers),
            accel: convention.body_vector(log.accelerometers),
        }
    }

    fn odo_vel(&self, log: &OdometerLog) -> OdoVel {
        OdoVel {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: log.status,
            vel: log.velocity,
        }
    }

    fn ship_motion(&self, log: &ShipMotionLog) -> ShipMotion {
        ShipMotion {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: ShipMotionStatus::from_bits(log.status),
            ship_motion: log.ship_motion,
            acceleration: log.ship_accel,
            velocity: log.ship_vel,
        }
    }

    fn status(&self, log: &StatusLog) -> Status {
        Status {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status_general: StatusGeneral::from_bits(log.general_status),
            status_com: StatusCom::from_bits(log.com_status),
            status_aiding: StatusAiding::from_bits(log.aiding_status),
        }
    }

    /// The header is stamped before the record updates the time engine
    fn utc_time(&mut self, log: &UtcLog) -> UtcTimeRecord {
        let header = self.header(log.time_stamp);
        let utc = UtcTime {
            time_stamp: log.time_stamp,
            clock_status: UtcTimeStatus::from_bits(log.status),
            year: log.year,
            month: log.month,
            day: log.day,
            hour: log.hour,
            min: log.minute,
            sec: log.second,
            nanosec: log.nano_second,
            gps_tow: log.gps_time_of_week,
        };

        self.time.ingest_utc(&utc);

        UtcTimeRecord { header, utc }
    }

    fn air_data(&self, log: &AirDataLog) -> AirData {
        AirData {
            header: self.header(log.time_stamp),
            time_stamp: log.time_stamp,
            status: AirDataStatus::from_bits(log.status),
            pressure_abs: log.pressure_abs,
            altitude: log.altitude,
            pressure_diff: log.pressure_diff,
            true_air_speed: log.true_airspeed,
            air_temperature: log.air_temperature,
        }
    }

    /// Generic IMU record on the synced clock
    fn imu(&mut self, imu: &ImuData, quat: &EkfQuat) -> Imu {
        let header = Header {
            stamp: self.time.synced_timestamp(imu.time_stamp),
            frame_id: self.settings.frame_id.clone(),
        };
        let acc = quat.accuracy;

        Imu {
            header,
            orientation: quat.quaternion,
            orientation_covariance: diagonal([acc[0] * acc[0], acc[1] * acc[1], acc[2] * acc[2]]),
            angular_velocity: imu.delta_angle,
            angular_velocity_covariance: [[0.0; 3]; 3],
            linear_acceleration: imu.delta_vel,
            linear_acceleration_covariance: [[0.0; 3]; 3],
        }
    }

    fn temperature(&self, imu: &ImuData) -> Temperature {
        Temperature {
            header: self.header(imu.time_stamp),
            temperature: imu.temp,
            variance: 0.0,
        }
    }

    /// Attitude of the body frame, quaternion preferred
    fn attitude(&self) -> Option<UnitQuaternion<f64>> {
        let from_quat = self.last_quat.as_ref().and_then(|q| {
            let o = q.quaternion;
            UnitQuaternion::try_new(Quaternion::new(o.w, o.x, o.y, o.z), f64::EPSILON)
        });

        from_quat.or_else(|| {
            self.last_euler
                .as_ref()
                .map(|e| UnitQuaternion::from_euler_angles(e.angle[0], e.angle[1], e.angle[2]))
        })
    }

    /// Nav-frame velocity expressed in the body frame
    fn twist_stamped(&self, imu: &ImuData) -> Option<TwistStamped> {
        let nav = self.last_nav.as_ref()?;
        let attitude = self.attitude()?;

        let v = nav.velocity;
        let body = attitude.inverse_transform_vector(&Vector3::new(v[0], v[1], v[2]));

        Some(TwistStamped {
            header: self.header(imu.time_stamp),
            twist: Twist {
                linear: [body.x, body.y, body.z],
                angular: imu.delta_angle,
            },
        })
    }

    fn point_stamped(&self, nav: &EkfNav) -> PointStamped {
        let (x, y, z) = llh2ecef(nav.latitude, nav.longitude, nav.altitude);
        PointStamped {
            header: nav.header.clone(),
            point: [x, y, z],
        }
    }

    /// Host time header with the UTC-derived instant for comparison
    fn time_reference(&self, utc: &UtcTime) -> TimeReference {
        TimeReference {
            header: Header {
                stamp: self.time.now(),
                frame_id: self.settings.frame_id.clone(),
            },
            time_ref: self.time.convert_ins_time(utc.time_stamp),
            source: TIME_REFERENCE_SOURCE.to_string(),
        }
    }

    fn nav_sat_fix(&self, pos: &GpsPos) -> NavSatFix {
        let status = match pos.status.r#type {
            GPS_POS_TYPE_NO_SOLUTION => NAV_SAT_STATUS_NO_FIX,
            GPS_POS_TYPE_SBAS => NAV_SAT_STATUS_SBAS_FIX,
            _ => NAV_SAT_STATUS_FIX,
        };
        let service = if pos.status.glo_l1_used || pos.status.glo_l2_used {
            NAV_SAT_SERVICE_GLONASS
        } else {
            NAV_SAT_SERVICE_GPS
        };
        let acc = pos.position_accuracy;

        NavSatFix {
            header: pos.header.clone(),
            status,
            service,
            latitude: pos.latitude,
            longitude: pos.longitude,
            altitude: pos.altitude + pos.undulation,
            position_covariance: diagonal([acc[0] * acc[0], acc[1] * acc[1], acc[2] * acc[2]]),
            position_covariance_type: COVARIANCE_TYPE_DIAGONAL_KNOWN,
        }
    }

    /// Local planar odometry for the current IMU sample
    ///
    /// Needs a navigation solution and an attitude. The first call latches the
    /// local origin on the current navigation position, whatever its status.
    fn odometry(&mut self, imu: &ImuData, out: &mut Composed) {
        let nav = match &self.last_nav {
            Some(nav) => nav.clone(),
            None => return,
        };

        let (orientation, attitude_acc) = match (&self.last_quat, &self.last_euler) {
            (Some(q), Some(e)) => (q.quaternion, e.accuracy),
            (Some(q), None) => (q.quaternion, q.accuracy),
            (None, Some(e)) => (quat_from_euler(e.angle), e.accuracy),
            (None, None) => return,
        };

        let mut header = self.header(imu.time_stamp);
        header.frame_id = self.settings.odom_frame_id.clone();

        if !self.projector.is_initialized() {
            let origin = self
                .projector
                .initialize_origin(nav.latitude, nav.longitude, nav.altitude);

            if self.settings.odom_publish_tf {
                out.transforms.push(TransformStamped {
                    header: Header {
                        stamp: self.time.now(),
                        frame_id: self.settings.odom_init_frame_id.clone(),
                    },
                    child_frame_id: self.settings.odom_frame_id.clone(),
                    translation: [origin.easting, origin.northing, origin.altitude],
                    rotation: IDENTITY,
                    is_static: true,
                });
            }
        }

        let position = self
            .projector
            .local_planar_position(nav.latitude, nav.longitude, nav.altitude);

        let (std_x, std_y) = self.projector.rotate_covariance(
            nav.position_accuracy[0],
            nav.position_accuracy[1],
            nav.latitude,
            nav.longitude,
        );
        let std_z = nav.position_accuracy[2];
        let pose_covariance = diagonal([
            std_x * std_x,
            std_y * std_y,
            std_z * std_z,
            attitude_acc[0] * attitude_acc[0],
            attitude_acc[1] * attitude_acc[1],
            attitude_acc[2] * attitude_acc[2],
        ]);

        let vel_acc = nav.velocity_accuracy;
        let twist_covariance = diagonal([
            vel_acc[0] * vel_acc[0],
            vel_acc[1] * vel_acc[1],
            vel_acc[2] * vel_acc[2],
            0.0,
            0.0,
            0.0,
        ]);

        debug!(
            "odometry x:{:.3} y:{:.3} z:{:.3} std_x:{:.3} std_y:{:.3}",
            position[0], position[1], position[2], std_x, std_y
        );

        let pose = Pose {
            position,
            orientation,
        };

        if self.settings.odom_publish_tf {
            out.transforms.push(TransformStamped {
                header: Header {
                    stamp: self.time.now(),
                    frame_id: header.frame_id.clone(),
                },
                child_frame_id: self.settings.odom_base_frame_id.clone(),
                translation: pose.position,
                rotation: pose.orientation,
                is_static: false,
            });
        }

        out.records.push(OutputRecord::Odometry(Odometry {
            header,
            child_frame_id: self.settings.frame_id.clone(),
            pose: PoseWithCovariance {
                pose,
                covariance: pose_covariance,
            },
            twist: TwistWithCovariance {
                twist: Twist {
                    linear: nav.velocity,
                    angular: imu.gyro,
                },
                covariance: twist_covariance,
            },
        }));
    }
}

/// Roll/pitch/yaw to a quaternion, angles already in the output convention
fn quat_from_euler(angle: [f64; 3]) -> Quat {
    let q = UnitQuaternion::from_euler_angles(angle[0], angle[1], angle[2]);
    let c = q.quaternion().coords;
    Quat {
        x: c[0],
        y: c[1],
        z: c[2],
        w: c[3],
    }
}
