pub mod constants;
pub mod timesync;
pub mod status;
pub mod frame;
pub mod geodesy;
pub mod projection;
pub mod messages;
pub mod composer;
pub mod output;
pub mod reader;
pub mod config;
