// Record type definitions
// Device logs coming in, composed records and transforms going out

pub mod device;
pub mod published;

pub use device::DeviceRecord;
pub use published::{Composed, Header, OutputRecord, TransformStamped};
