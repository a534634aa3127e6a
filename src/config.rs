use clap::Parser;

use crate::composer::Settings;
use crate::frame::AxisConvention;
use crate::timesync::TimeReferenceMode;

/// INS bridge configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Read newline-delimited JSON device logs from this file (stdin if omitted).
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<String>,

    /// Write JSON lines of composed records to this file (stdout if omitted).
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<String>,

    /// Also append odometry poses in CSV format to a local file.
    #[arg(long, value_name = "FILE")]
    pub csv_odometry: Option<String>,

    /// Frame id of device records, child frame of odometry.
    #[arg(long, default_value = "imu_link")]
    pub frame_id: String,

    /// Axis convention of every output vector and angle.
    #[arg(long, value_enum, default_value_t = AxisConvention::Ned)]
    pub axis_convention: AxisConvention,

    /// Header time source: host clock only, or device UTC once it is valid.
    #[arg(long, value_enum, default_value_t = TimeReferenceMode::SystemClockOnly)]
    pub time_reference: TimeReferenceMode,

    /// Also emit imu, temperature, twist, nav_sat_fix, ... records.
    #[arg(long, default_value_t = false)]
    pub standard_outputs: bool,

    /// Emit local planar odometry.
    #[arg(long, default_value_t = false)]
    pub odom_enable: bool,

    /// Emit init -> odom and odom -> base transforms along with odometry.
    #[arg(long, default_value_t = false)]
    pub odom_publish_tf: bool,

    #[arg(long, default_value = "odom")]
    pub odom_frame_id: String,

    #[arg(long, default_value = "base_link")]
    pub odom_base_frame_id: String,

    #[arg(long, default_value = "map")]
    pub odom_init_frame_id: String,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Composer settings for this run
    pub fn settings(&self) -> Settings {
        Settings {
            frame_id: self.frame_id.clone(),
            axis_convention: self.axis_convention,
            time_reference: self.time_reference,
            standard_outputs: self.standard_outputs,
            odom_enable: self.odom_enable,
            odom_publish_tf: self.odom_publish_tf,
            odom_frame_id: self.odom_frame_id.clone(),
            odom_base_frame_id: self.odom_base_frame_id.clone(),
            odom_init_frame_id: self.odom_init_frame_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_settings_defaults() {
        let config = Config::parse_from(["ins-bridge"]);
        assert_eq!(config.settings(), Settings::default());
        assert!(config.input.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::parse_from([
            "ins-bridge",
            "--input",
            "capture.jsonl",
            "--axis-convention",
            "enu",
            "--time-reference",
            "ins-unix",
            "--odom-enable",
            "--odom-publish-tf",
            "--frame-id",
            "ins",
        ]);

        let settings = config.settings();
        assert_eq!(config.input.as_deref(), Some("capture.jsonl"));
        assert_eq!(settings.axis_convention, AxisConvention::Enu);
        assert_eq!(settings.time_reference, TimeReferenceMode::InsUnixSynced);
        assert!(settings.odom_enable);
        assert!(settings.odom_publish_tf);
        assert!(!settings.standard_outputs);
        assert_eq!(settings.frame_id, "ins");
    }

    #[test]
    fn test_rejects_unknown_convention() {
        assert!(Config::try_parse_from(["ins-bridge", "--axis-convention", "nwu"]).is_err());
    }
}
