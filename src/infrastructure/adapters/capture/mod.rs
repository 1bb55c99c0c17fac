//! Capture Adapter - 语音样本采集

mod request_capture;
mod wav;

pub use request_capture::{prepare_sample, AudioCaptureConfig, CaptureError, RequestAudioCapture};
pub use wav::{clip_wav, parse_wav_header, FmtChunk, WavError, WavHeader};

#[cfg(test)]
pub(crate) use wav::pcm16_wav;
