//! Frame acquisition and hand detection.

pub mod detector;
pub mod feed;
pub mod frame;
pub mod landmarks;
