//! Symphonia Metadata Probe - 基于 symphonia 的时长探测
//!
//! 优先使用容器声明的帧数，缺失时逐包累加时长

use std::io::Cursor;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioMetadataPort, MetadataError};
use crate::domain::music::AudioFormat;

/// Symphonia 时长探测器
#[derive(Debug, Clone, Default)]
pub struct SymphoniaMetadataProbe;

impl SymphoniaMetadataProbe {
    pub fn new() -> Self {
        Self
    }
}

impl AudioMetadataPort for SymphoniaMetadataProbe {
    fn probe_duration_secs(&self, data: &[u8], format: AudioFormat) -> Result<u32, MetadataError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(format.extension());

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => MetadataError::Unsupported(what.to_string()),
                other => MetadataError::ProbeFailed(other.to_string()),
            })?;

        let mut reader = probed.format;

        let track = reader.default_track().ok_or(MetadataError::NoTrack)?;
        let track_id = track.id;
        let n_frames = track.codec_params.n_frames;
        let sample_rate = track.codec_params.sample_rate;
        let time_base = track.codec_params.time_base;

        if let (Some(frames), Some(rate)) = (n_frames, sample_rate) {
            if rate > 0 {
                return Ok((frames / rate as u64) as u32);
            }
        }

        // 容器没有声明总帧数（如 VBR MP3 / ADTS），累加包时长
        let time_base = time_base.ok_or(MetadataError::UnknownDuration)?;
        let mut total_ts: u64 = 0;

        loop {
            match reader.next_packet() {
                Ok(packet) if packet.track_id() == track_id => total_ts += packet.dur,
                Ok(_) => {}
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(MetadataError::ProbeFailed(e.to_string())),
            }
        }

        if total_ts == 0 {
            return Err(MetadataError::UnknownDuration);
        }

        Ok(time_base.calc_time(total_ts).seconds as u32)
    }
}
