use std::io::Write;

use serde::Serialize;
use tracing::error;

use crate::messages::published::{Composed, Odometry, OutputRecord, TransformStamped};

/// Trait for output handlers
pub trait OutputHandler: Send {
    /// Handle everything composed from one device log
    fn handle(&mut self, composed: &Composed);

    /// Flush buffered output
    fn flush(&mut self) {}
}

/// Transform line in the JSON stream, tagged like the records
#[derive(Serialize)]
#[serde(tag = "type", rename = "transform")]
struct TransformLine<'a> {
    #[serde(flatten)]
    transform: &'a TransformStamped,
}

/// Newline-delimited JSON output of records and transforms
pub struct JsonLinesOutput {
    writer: Box<dyn Write + Send>,
}

impl JsonLinesOutput {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        JsonLinesOutput { writer }
    }

    /// Write to a file, truncating it
    pub fn create(path: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(std::io::BufWriter::new(file))))
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::BufWriter::new(std::io::stdout())))
    }

    pub fn format_record(record: &OutputRecord) -> serde_json::Result<String> {
        serde_json::to_string(record)
    }

    pub fn format_transform(transform: &TransformStamped) -> serde_json::Result<String> {
        serde_json::to_string(&TransformLine { transform })
    }

    fn write_line(&mut self, line: serde_json::Result<String>) {
        let result = line
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.writer, "{}", line));
        if let Err(e) = result {
            error!("Failed to write JSON output: {}", e);
        }
    }
}

impl OutputHandler for JsonLinesOutput {
    fn handle(&mut self, composed: &Composed) {
        for record in &composed.records {
            self.write_line(Self::format_record(record));
        }
        for transform in &composed.transforms {
            self.write_line(Self::format_transform(transform));
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!("Failed to flush JSON output: {}", e);
        }
    }
}

/// CSV track of odometry poses
pub struct CsvOutput {
    writer: std::io::BufWriter<std::fs::File>,
}

impl CsvOutput {
    pub fn new(path: &str) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(CsvOutput {
            writer: std::io::BufWriter::new(file),
        })
    }

    /// Format: stamp,x,y,z,qx,qy,qz,qw,var_x,var_y,var_z
    pub fn format_odometry(odom: &Odometry) -> String {
        let p = odom.pose.pose.position;
        let q = odom.pose.pose.orientation;
        let cov = odom.pose.covariance;
        format!(
            "{}.{:09},{:.3},{:.3},{:.3},{:.6},{:.6},{:.6},{:.6},{:.4},{:.4},{:.4}",
            odom.header.stamp.sec,
            odom.header.stamp.nanosec,
            p[0],
            p[1],
            p[2],
            q.x,
            q.y,
            q.z,
            q.w,
            cov[0][0],
            cov[1][1],
            cov[2][2]
        )
    }
}

impl OutputHandler for CsvOutput {
    fn handle(&mut self, composed: &Composed) {
        for record in &composed.records {
            if let OutputRecord::Odometry(odom) = record {
                if let Err(e) = writeln!(self.writer, "{}", Self::format_odometry(odom)) {
                    error!("Failed to write CSV: {}", e);
                }
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!("Failed to flush CSV: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Quat;
    use crate::messages::published::{
        diagonal, Header, Pose, PoseWithCovariance, Temperature, Twist, TwistWithCovariance,
    };
    use crate::timesync::Stamp;
    use std::sync::{Arc, Mutex};

    /// Writer appending into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn header(frame_id: &str) -> Header {
        Header {
            stamp: Stamp { sec: 1_700_000_000, nanosec: 5_000 },
            frame_id: frame_id.to_string(),
        }
    }

    fn odometry() -> Odometry {
        Odometry {
            header: header("odom"),
            child_frame_id: "imu_link".to_string(),
            pose: PoseWithCovariance {
                pose: Pose {
                    position: [1.5, -2.25, 0.125],
                    orientation: Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
                },
                covariance: diagonal([0.25, 0.64, 2.25, 0.0, 0.0, 0.0]),
            },
            twist: TwistWithCovariance {
                twist: Twist {
                    linear: [0.0; 3],
                    angular: [0.0; 3],
                },
                covariance: [[0.0; 6]; 6],
            },
        }
    }

    #[test]
    fn test_json_lines() {
        let buffer = SharedBuffer::default();
        let mut output = JsonLinesOutput::new(Box::new(buffer.clone()));

        let composed = Composed {
            records: vec![OutputRecord::Temperature(Temperature {
                header: header("imu_link"),
                temperature: 20.0,
                variance: 0.0,
            })],
            transforms: vec![TransformStamped {
                header: header("map"),
                child_frame_id: "odom".to_string(),
                translation: [500000.0, 4980000.0, 10.0],
                rotation: Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
                is_static: true,
            }],
        };
        output.handle(&composed);
        output.flush();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["type"], "temperature");

        let transform: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(transform["type"], "transform");
        assert_eq!(transform["child_frame_id"], "odom");
        assert_eq!(transform["is_static"], true);
        assert_eq!(transform["header"]["frame_id"], "map");
    }

    #[test]
    fn test_csv_odometry_format() {
        let line = CsvOutput::format_odometry(&odometry());
        assert_eq!(
            line,
            "1700000000.000005000,1.500,-2.250,0.125,0.000000,0.000000,0.000000,1.000000,0.2500,0.6400,2.2500"
        );
    }
}
