// Time synchronization - maps the device microsecond clock onto wall-clock time
//
// Two independent schemes:
// - UTC anchored: once the device reports a fully valid UTC solution, every
//   device timestamp is offset from the most recent UTC record.
// - Synced: the first sample latches (wall clock, device clock) and every
//   later sample is offset from that single anchor.

use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{NANOS_PER_DEVICE_TICK, NANOS_PER_SEC};
use crate::status::{ClockStatus, UtcTimeStatus};

/// Wall-clock instant as whole seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Stamp {
    pub sec: i64,
    pub nanosec: u32,
}

impl Stamp {
    /// Seconds since the epoch as a float
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }

    /// Add a (sec, nsec) duration, normalizing the nanosecond part
    fn add_parts(&self, sec: i64, nsec: i64) -> Self {
        let total = self.nanosec as i64 + nsec;
        Stamp {
            sec: self
                .sec
                .saturating_add(sec)
                .saturating_add(total.div_euclid(NANOS_PER_SEC as i64)),
            nanosec: total.rem_euclid(NANOS_PER_SEC as i64) as u32,
        }
    }

    /// Advance by a number of device clock ticks
    fn add_device_ticks(&self, ticks: u32) -> Self {
        let nanos = ticks as u64 * NANOS_PER_DEVICE_TICK;
        self.add_parts((nanos / NANOS_PER_SEC) as i64, (nanos % NANOS_PER_SEC) as i64)
    }
}

/// Source of the current wall-clock time
pub trait WallClock: Send {
    fn now(&self) -> Stamp;
}

/// Host system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> Stamp {
        let now = chrono::Utc::now();
        Stamp {
            sec: now.timestamp(),
            nanosec: now.timestamp_subsec_nanos(),
        }
    }
}

/// How record headers are stamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TimeReferenceMode {
    /// Always stamp with the host clock
    #[default]
    #[value(name = "ros")]
    SystemClockOnly,
    /// Stamp from device UTC once a fully valid UTC record has been seen
    #[value(name = "ins-unix")]
    InsUnixSynced,
}

/// Decoded device UTC record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtcTime {
    /// Device timestamp at capture (µs)
    pub time_stamp: u32,
    pub clock_status: UtcTimeStatus,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub nanosec: u32,
    /// GPS time of week (ms)
    pub gps_tow: u32,
}

/// Reference captured by the first synced sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncAnchor {
    pub wall_clock: Stamp,
    pub device_timestamp: u32,
}

/// Time synchronization engine
///
/// Owns the UTC validation latch, the last UTC record and the synced anchor.
pub struct TimeSync {
    mode: TimeReferenceMode,
    clock: Box<dyn WallClock>,
    validated: bool,
    last_utc: Option<UtcTime>,
    anchor: Option<SyncAnchor>,
}

impl TimeSync {
    /// Create an engine that reads the host system clock
    pub fn new(mode: TimeReferenceMode) -> Self {
        Self::with_clock(mode, Box::new(SystemClock))
    }

    /// Create an engine reading a custom wall clock
    pub fn with_clock(mode: TimeReferenceMode, clock: Box<dyn WallClock>) -> Self {
        TimeSync {
            mode,
            clock,
            validated: false,
            last_utc: None,
            anchor: None,
        }
    }

    /// True once a fully valid UTC record has been observed. Never reverts.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn last_utc(&self) -> Option<&UtcTime> {
        self.last_utc.as_ref()
    }

    pub fn anchor(&self) -> Option<SyncAnchor> {
        self.anchor
    }

    /// Current host time
    pub fn now(&self) -> Stamp {
        self.clock.now()
    }

    /// Record a UTC log. Validity is driven only by the status flags.
    pub fn ingest_utc(&mut self, utc: &UtcTime) {
        if !self.validated {
            let status = &utc.clock_status;
            if status.clock_stable && status.clock_utc_sync && status.clock_status == ClockStatus::Valid {
                self.validated = true;
                info!("A full valid UTC log has been detected, timestamp will be synchronized with the UTC data.");
            }
        }

        self.last_utc = Some(utc.clone());
    }

    /// Header timestamp for a device record
    pub fn wall_clock_timestamp(&self, device_timestamp: u32) -> Stamp {
        if self.validated && self.mode == TimeReferenceMode::InsUnixSynced {
            self.convert_ins_time(device_timestamp)
        } else {
            self.clock.now()
        }
    }

    /// Convert a device timestamp using the last UTC record as the anchor.
    ///
    /// Does not look at the validation latch. Falls back to the host clock
    /// when no UTC record has been seen at all.
    pub fn convert_ins_time(&self, device_timestamp: u32) -> Stamp {
        match &self.last_utc {
            Some(utc) => {
                utc_to_unix(utc).add_device_ticks(device_timestamp.wrapping_sub(utc.time_stamp))
            }
            None => self.clock.now(),
        }
    }

    /// Header timestamp for the high-rate stream that must stay mutually consistent.
    ///
    /// The first call latches the anchor; all calls are relative to it.
    pub fn synced_timestamp(&mut self, device_timestamp: u32) -> Stamp {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                let anchor = SyncAnchor {
                    wall_clock: self.clock.now(),
                    device_timestamp,
                };
                debug!(
                    "Synced clock anchored at {}.{:09} (device {} us)",
                    anchor.wall_clock.sec, anchor.wall_clock.nanosec, device_timestamp
                );
                self.anchor = Some(anchor);
                anchor
            }
        };

        anchor
            .wall_clock
            .add_device_ticks(device_timestamp.wrapping_sub(anchor.device_timestamp))
    }
}

/// Gregorian leap year rule
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: u16) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Days in a 1-based month
pub fn days_in_month(year: u16, month: u8) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Convert a device UTC record to a Unix epoch stamp.
///
/// Calendar fields are taken as-is; out-of-range values are not rejected.
/// Years before 1970 give negative seconds. Every `u16` year fits.
pub fn utc_to_unix(utc: &UtcTime) -> Stamp {
    let mut days: i64 = 0;

    if utc.year >= 1970 {
        for year in 1970..utc.year {
            days += days_in_year(year) as i64;
        }
    } else {
        for year in utc.year..1970 {
            days -= days_in_year(year) as i64;
        }
    }
    for month in 1..utc.month {
        days += days_in_month(utc.year, month) as i64;
    }
    days += utc.day.saturating_sub(1) as i64;

    let mut secs = days * 24 + utc.hour as i64;
    secs = secs * 60 + utc.min as i64;
    secs = secs * 60 + utc.sec as i64;

    Stamp { sec: secs, nanosec: 0 }.add_parts(0, utc.nanosec as i64)
}

/// Clock returning a fixed instant, for deterministic tests
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Stamp);

#[cfg(test)]
impl WallClock for FixedClock {
    fn now(&self) -> Stamp {
        self.0
    }
}
