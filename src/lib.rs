pub mod config;
pub mod imu;
pub mod link;
pub mod messages;
pub mod runtime;
