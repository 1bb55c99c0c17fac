//! Worker Layer - Background Task Processing
//!
//! - TranscriptionWorker: 语音识别任务
//! - SessionGcWorker: 过期会话回收

mod session_gc;
mod transcription_worker;

pub use session_gc::{SessionGcConfig, SessionGcWorker};
pub use transcription_worker::{TranscriptionQueue, TranscriptionWorker, TranscriptionWorkerConfig};
