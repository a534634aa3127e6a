// Device log reader
// Newline-delimited JSON device records from a file or stdin

use std::fmt;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::messages::device::DeviceRecord;

#[derive(Debug)]
pub enum ReadError {
    Io(io::Error),
    /// The line at `line` (1-based) is not a known device record
    Parse { line: usize, source: serde_json::Error },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "read failed: {}", e),
            ReadError::Parse { line, source } => write!(f, "invalid record on line {}: {}", line, source),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            ReadError::Parse { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        ReadError::Io(e)
    }
}

/// Boxed input source
pub type InputStream = Box<dyn AsyncRead + Unpin + Send>;

/// Reads one device record per line
pub struct RecordReader<R> {
    reader: BufReader<R>,
    line_number: usize,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        RecordReader {
            reader: BufReader::new(inner),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next record, `Ok(None)` at end of input. Blank lines are skipped.
    ///
    /// A parse error only affects its own line; reading can continue.
    pub async fn next_record(&mut self) -> Result<Option<DeviceRecord>, ReadError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|source| ReadError::Parse {
                    line: self.line_number,
                    source,
                });
        }
    }
}

/// Open a file, or stdin when no path is given
pub async fn open_input(path: Option<&str>) -> io::Result<RecordReader<InputStream>> {
    let stream: InputStream = match path {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };
    Ok(RecordReader::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_records_and_skips_blank_lines() {
        let input = b"{\"log\": \"odo_vel\", \"time_stamp\": 7, \"velocity\": 1.5}\n\n  \r\n{\"log\": \"mag_calib\", \"time_stamp\": 9}\n";
        let mut reader = RecordReader::new(&input[..]);

        match reader.next_record().await.unwrap() {
            Some(DeviceRecord::OdoVel(odo)) => {
                assert_eq!(odo.time_stamp, 7);
                assert_eq!(odo.velocity, 1.5);
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert!(matches!(reader.next_record().await.unwrap(), Some(DeviceRecord::MagCalib(_))));
        assert_eq!(reader.line_number(), 4);
        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parse_error_carries_line_and_reading_continues() {
        let input = b"{\"log\": \"status\"}\nnot json\n{\"log\": \"event\", \"time_stamp\": 3}";
        let mut reader = RecordReader::new(&input[..]);

        assert!(matches!(reader.next_record().await.unwrap(), Some(DeviceRecord::Status(_))));

        match reader.next_record().await {
            Err(ReadError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }

        // Last line has no trailing newline
        assert!(matches!(reader.next_record().await.unwrap(), Some(DeviceRecord::Event(_))));
        assert!(reader.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file() {
        assert!(open_input(Some("/nonexistent/ins-bridge/input.jsonl")).await.is_err());
    }

    #[test]
    fn test_error_display() {
        let source = serde_json::from_str::<DeviceRecord>("{").unwrap_err();
        let e = ReadError::Parse { line: 12, source };
        assert!(e.to_string().starts_with("invalid record on line 12:"));
    }
}
