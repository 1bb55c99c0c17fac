//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod capture;
pub mod metadata;
pub mod speech;
pub mod storage;

pub use capture::{AudioCaptureConfig, CaptureError, RequestAudioCapture};
pub use metadata::*;
pub use speech::*;
pub use storage::*;
